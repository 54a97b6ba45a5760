//! HTTP-level tests for the course catalog, authoring, enrollment, direct
//! progress, instructor dashboards, analytics and reviews.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, course_body, create_course_via_api, create_lessons, create_user_with_token,
    delete_auth, get, get_auth, post_auth, post_json_auth, post_raw_auth, put_auth,
    put_json_auth,
};
use eduhub_db::repositories::{EnrollmentRepo, LessonRepo, ProgressRepo};
use serde_json::json;
use sqlx::PgPool;

/// Create a course through the API and publish it.
async fn publish_new_course(
    pool: &PgPool,
    token: &str,
    title: &str,
    category: &str,
    level: &str,
) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/courses", course_body(title, category, level), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_auth(app, &format!("/api/courses/{id}/publish"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn catalog_filters_published_courses(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;

    publish_new_course(&pool, &instructor, "Figma Basics", "Design", "Beginner").await;
    publish_new_course(&pool, &instructor, "Colour Theory", "Design", "Beginner").await;
    publish_new_course(&pool, &instructor, "Design Systems", "Design", "Advanced").await;
    publish_new_course(&pool, &instructor, "Rust 101", "Programming", "Beginner").await;
    // Draft: never listed.
    let app = common::build_test_app(pool.clone());
    create_course_via_api(app, &instructor, "Typography Draft").await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/courses?category=Design&level=Beginner").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 2);
    assert_eq!(json["count"], 2);
    assert_eq!(json["pages"], 1);
    for course in json["data"].as_array().unwrap() {
        assert_eq!(course["category"], "Design");
        assert_eq!(course["level"], "Beginner");
        assert_eq!(course["is_published"], true);
        assert!(course["instructor_name"].is_string());
    }

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/courses?category=all&limit=3&page=2").await).await;
    assert_eq!(json["total"], 4);
    assert_eq!(json["pages"], 2);
    assert_eq!(json["page"], 2);
    assert_eq!(json["count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pages_past_the_end_are_empty(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    publish_new_course(&pool, &instructor, "Figma Basics", "Design", "Beginner").await;

    for page in ["50", "9223372036854775807"] {
        let app = common::build_test_app(pool.clone());
        let response = get(app, &format!("/api/courses?page={page}")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["pages"], 1);
        assert_eq!(json["count"], 0);
        assert_eq!(json["page"].to_string(), page);
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_requests_get_the_error_envelope(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;

    let app = common::build_test_app(pool.clone());
    let bad_query = get(app, "/api/courses?page=abc").await;

    let app = common::build_test_app(pool.clone());
    let bad_path = get(app, "/api/courses/not-a-number").await;

    let app = common::build_test_app(pool);
    let bad_body = post_raw_auth(app, "/api/courses", "{\"title\": ", &instructor).await;

    for response in [bad_query, bad_path, bad_body] {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "BAD_REQUEST");
        assert!(json["message"].is_string());
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn course_detail_counts_views_and_lists_lessons(pool: PgPool) {
    let (instructor, token) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let id = publish_new_course(&pool, &token, "Tokio Internals", "Programming", "Advanced").await;
    create_lessons(&pool, instructor.id, id, 2).await;

    let app = common::build_test_app(pool.clone());
    get(app, &format!("/api/courses/{id}")).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/courses/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["views"], 2);
    assert_eq!(json["data"]["total_lessons"], 2);
    assert_eq!(json["data"]["formatted_duration"], "2 hours 15 minutes");
    assert_eq!(json["data"]["lessons"][0]["sort_order"], 1);
    assert_eq!(json["data"]["instructor_name"], instructor.name);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/courses/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Authoring and ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn only_instructors_create_courses_as_drafts(pool: PgPool) {
    let (_, student) = create_user_with_token(&pool, "s@example.com", "student").await;
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/courses",
        course_body("Nope", "Programming", "Beginner"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/courses",
        course_body("Bad Category", "Cooking", "Beginner"),
        &instructor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/courses",
        course_body("Unsafe Rust", "Programming", "Advanced"),
        &instructor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["is_published"], false);
    assert!(json["data"]["slug"].as_str().unwrap().starts_with("unsafe-rust-"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_owner_or_admin_may_update(pool: PgPool) {
    let (_, owner) = create_user_with_token(&pool, "owner@example.com", "instructor").await;
    let (_, other) = create_user_with_token(&pool, "other@example.com", "instructor").await;
    let (_, admin) = create_user_with_token(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool.clone());
    let id = create_course_via_api(app, &owner, "Ownership").await;
    let uri = format!("/api/courses/{id}");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "title": "Hijacked" }), &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "price": 19.5 }), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["price"], 19.5);
    assert_eq!(json["data"]["title"], "Ownership");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "status": "archived" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "archived");

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "price": -1.0 }), &owner).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn publish_toggles_between_draft_and_published(pool: PgPool) {
    let (_, owner) = create_user_with_token(&pool, "owner@example.com", "instructor").await;
    let app = common::build_test_app(pool.clone());
    let id = create_course_via_api(app, &owner, "Toggle Me").await;
    let uri = format!("/api/courses/{id}/publish");

    let app = common::build_test_app(pool.clone());
    let json = body_json(put_auth(app, &uri, &owner).await).await;
    assert_eq!(json["data"]["status"], "published");
    assert_eq!(json["data"]["is_published"], true);
    assert!(json["data"]["published_at"].is_string());
    assert_eq!(json["message"], "Course published");

    let app = common::build_test_app(pool);
    let json = body_json(put_auth(app, &uri, &owner).await).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["is_published"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_course_cascades(pool: PgPool) {
    let (instructor, token) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let (student, student_token) = create_user_with_token(&pool, "s@example.com", "student").await;
    let id = publish_new_course(&pool, &token, "Short Lived", "Other", "Beginner").await;
    let lessons = create_lessons(&pool, instructor.id, id, 2).await;

    let app = common::build_test_app(pool.clone());
    post_auth(app, &format!("/api/courses/{id}/enroll"), &student_token).await;
    ProgressRepo::complete_lesson(&pool, student.id, &lessons[0])
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/courses/{id}"), &student_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/courses/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["lessons_deleted"], 2);
    assert_eq!(json["data"]["enrollments_removed"], 1);
    assert_eq!(json["data"]["progress_rows_deleted"], 1);

    assert!(EnrollmentRepo::find(&pool, student.id, id).await.unwrap().is_none());
    assert!(LessonRepo::list_by_course(&pool, id).await.unwrap().is_empty());

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/courses/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Enrollment and direct progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn enrollment_lifecycle(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let (_, student) = create_user_with_token(&pool, "s@example.com", "student").await;
    let id = publish_new_course(&pool, &instructor, "Enroll Me", "Business", "Beginner").await;
    let enroll = format!("/api/courses/{id}/enroll");
    let unenroll = format!("/api/courses/{id}/unenroll");

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &enroll, &student).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["progress"], 0);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &enroll, &student).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ALREADY_ENROLLED");
    assert_eq!(json["success"], false);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/courses/{id}")).await).await;
    assert_eq!(json["data"]["students_enrolled"], 1);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/courses/my-courses", &student).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["id"], id);
    assert_eq!(json["data"][0]["is_completed"], false);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &unenroll, &student).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &unenroll, &student).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "NOT_ENROLLED");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/courses/{id}")).await).await;
    assert_eq!(json["data"]["students_enrolled"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn instructors_cannot_enroll(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let id = publish_new_course(&pool, &instructor, "Self Study", "Other", "Beginner").await;

    let app = common::build_test_app(pool);
    let response = post_auth(app, &format!("/api/courses/{id}/enroll"), &instructor).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn direct_progress_checks_range_enrollment_and_lessons(pool: PgPool) {
    let (instructor, token) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let (_, student) = create_user_with_token(&pool, "s@example.com", "student").await;
    let lessonless = publish_new_course(&pool, &token, "Reading List", "Other", "Beginner").await;
    let with_lessons = publish_new_course(&pool, &token, "Two Lessons", "Other", "Beginner").await;
    create_lessons(&pool, instructor.id, with_lessons, 2).await;

    let progress = |id: i64| format!("/api/courses/{id}/progress");

    for value in [150, -1] {
        let app = common::build_test_app(pool.clone());
        let response =
            put_json_auth(app, &progress(lessonless), json!({ "progress": value }), &student).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_RANGE");
    }

    let app = common::build_test_app(pool.clone());
    let response =
        put_json_auth(app, &progress(lessonless), json!({ "progress": 100 }), &student).await;
    assert_eq!(body_json(response).await["code"], "NOT_ENROLLED");

    for id in [lessonless, with_lessons] {
        let app = common::build_test_app(pool.clone());
        post_auth(app, &format!("/api/courses/{id}/enroll"), &student).await;
    }

    let app = common::build_test_app(pool.clone());
    let response =
        put_json_auth(app, &progress(lessonless), json!({ "progress": 100 }), &student).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["course_completed"], true);
    assert_eq!(json["data"]["enrollment"]["progress"], 100);

    // No lessons completed yet, so only 0 agrees with the derived value.
    let app = common::build_test_app(pool.clone());
    let response =
        put_json_auth(app, &progress(with_lessons), json!({ "progress": 100 }), &student).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool);
    let response =
        put_json_auth(app, &progress(with_lessons), json!({ "progress": 0 }), &student).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Instructor dashboards and analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn analytics_and_instructor_stats(pool: PgPool) {
    let (instructor, token) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let (_, rival) = create_user_with_token(&pool, "r@example.com", "instructor").await;
    let id = publish_new_course(&pool, &token, "Measured", "Data Science", "Intermediate").await;
    let lessons = create_lessons(&pool, instructor.id, id, 4).await;

    // Three students at 0%, 50% and 100%.
    let mut students = Vec::new();
    for (i, done) in [0usize, 2, 4].into_iter().enumerate() {
        let (student, student_token) =
            create_user_with_token(&pool, &format!("s{i}@example.com"), "student").await;
        let app = common::build_test_app(pool.clone());
        post_auth(app, &format!("/api/courses/{id}/enroll"), &student_token).await;
        for lesson in &lessons[..done] {
            ProgressRepo::complete_lesson(&pool, student.id, lesson)
                .await
                .unwrap();
        }
        students.push(student);
    }

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/courses/{id}/analytics"), &rival).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/courses/{id}/analytics"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total_students"], 3);
    assert_eq!(data["completed_students"], 1);
    assert_eq!(data["completion_rate"], 33);
    assert_eq!(data["average_progress"], 50);
    assert_eq!(data["progress_distribution"]["0-25"], 1);
    assert_eq!(data["progress_distribution"]["50-75"], 1);
    assert_eq!(data["progress_distribution"]["75-100"], 1);
    assert_eq!(data["recent_enrollments"].as_array().unwrap().len(), 3);
    assert_eq!(data["recent_enrollments"][0]["user_id"], students[2].id);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/courses/instructor/my-courses", &token).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["enrollment_stats"]["enrolled"], 3);
    assert_eq!(json["data"][0]["enrollment_stats"]["completed"], 1);
    assert_eq!(json["data"][0]["enrollment_stats"]["completion_rate"], 33);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/courses/instructor/stats", &token).await).await;
    assert_eq!(json["data"]["total_courses"], 1);
    assert_eq!(json["data"]["published_courses"], 1);
    assert_eq!(json["data"]["total_students"], 3);
    assert_eq!(json["data"]["completed_students"], 1);
    assert_eq!(json["data"]["recent_enrollments"][0]["course_title"], "Measured");
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn reviews_require_enrollment_and_are_unique(pool: PgPool) {
    let (_, instructor) = create_user_with_token(&pool, "t@example.com", "instructor").await;
    let (_, student) = create_user_with_token(&pool, "s@example.com", "student").await;
    let id = publish_new_course(&pool, &instructor, "Reviewed", "Marketing", "Beginner").await;
    let uri = format!("/api/courses/{id}/reviews");
    let review = json!({ "rating": 4, "comment": "Clear and well paced" });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, review.clone(), &student).await;
    assert_eq!(body_json(response).await["code"], "NOT_ENROLLED");

    let app = common::build_test_app(pool.clone());
    post_auth(app, &format!("/api/courses/{id}/enroll"), &student).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, json!({ "rating": 6 }), &student).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, review.clone(), &student).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["user_name"], "s");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, review, &student).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &uri).await).await;
    assert_eq!(json["count"], 1);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/courses/{id}")).await).await;
    assert_eq!(json["data"]["rating_average"], 4.0);
    assert_eq!(json["data"]["rating_count"], 1);
}
