//! Integration tests for the course catalog, course updates and the
//! course delete cascade.

mod common;

use common::{create_course, create_lessons, create_published_course, create_user};
use eduhub_core::catalog::{like_pattern, page_count, CourseSort};
use eduhub_db::models::course::{CourseFilter, UpdateCourse};
use eduhub_db::models::review::CreateReview;
use eduhub_db::repositories::{
    CourseRepo, EnrollmentRepo, LessonRepo, ProgressRepo, ReviewRepo,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn catalog_filters_combine_and_exclude_drafts(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    create_published_course(&pool, instructor.id, "Figma Basics", "Design", "Beginner").await;
    create_published_course(&pool, instructor.id, "Color Theory", "Design", "Beginner").await;
    create_published_course(&pool, instructor.id, "Design Systems", "Design", "Advanced").await;
    create_published_course(&pool, instructor.id, "Rust 101", "Programming", "Beginner").await;
    // Draft: never listed.
    create_course(&pool, instructor.id, "Unfinished Design Course").await;

    let filter = CourseFilter {
        category: Some("Design".into()),
        level: Some("Beginner".into()),
        search: None,
    };
    let total = CourseRepo::count_published(&pool, &filter).await.unwrap();
    let page = CourseRepo::list_published(&pool, &filter, CourseSort::default(), 12, 0)
        .await
        .unwrap();

    assert_eq!(total, 2);
    assert_eq!(page.len(), 2);
    assert!(page.iter().all(|c| c.course.category == "Design"
        && c.course.level == "Beginner"
        && c.course.is_published));
    assert_eq!(page_count(total, 12), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn catalog_search_is_case_insensitive_and_paginates(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    for i in 1..=5 {
        create_published_course(
            &pool,
            instructor.id,
            &format!("Kubernetes Part {i}"),
            "DevOps",
            "Intermediate",
        )
        .await;
    }
    create_published_course(&pool, instructor.id, "Terraform", "DevOps", "Intermediate").await;

    let filter = CourseFilter {
        search: Some(like_pattern("KUBERNETES")),
        ..Default::default()
    };
    let total = CourseRepo::count_published(&pool, &filter).await.unwrap();
    assert_eq!(total, 5);

    let sort = CourseSort::parse(Some("title"));
    let first = CourseRepo::list_published(&pool, &filter, sort, 2, 0).await.unwrap();
    let last = CourseRepo::list_published(&pool, &filter, sort, 2, 4).await.unwrap();
    assert_eq!(first[0].course.title, "Kubernetes Part 1");
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].course.title, "Kubernetes Part 5");
    assert_eq!(page_count(total, 2), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_applies_only_provided_fields(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    let course = create_course(&pool, instructor.id, "Intro to Rust").await;

    let updated = CourseRepo::update(
        &pool,
        course.id,
        &UpdateCourse {
            price: Some(19.5),
            tags: Some(vec!["systems".into()]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.price, 19.5);
    assert_eq!(updated.tags, vec!["systems".to_string()]);
    assert_eq!(updated.title, course.title);
    assert_eq!(updated.status, "draft");
}

#[sqlx::test(migrations = "./migrations")]
async fn publish_stamps_and_unpublish_clears_timestamp(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    let course = create_course(&pool, instructor.id, "Intro to Rust").await;
    assert!(!course.is_published);
    assert!(course.published_at.is_none());

    let published = CourseRepo::set_status(&pool, course.id, "published")
        .await
        .unwrap()
        .unwrap();
    assert!(published.is_published);
    assert!(published.published_at.is_some());

    let draft = CourseRepo::set_status(&pool, course.id, "draft")
        .await
        .unwrap()
        .unwrap();
    assert!(!draft.is_published);
    assert!(draft.published_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn view_counter_increments(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    let course = create_course(&pool, instructor.id, "Intro to Rust").await;

    assert!(CourseRepo::increment_views(&pool, course.id).await.unwrap());
    assert!(CourseRepo::increment_views(&pool, course.id).await.unwrap());
    assert!(!CourseRepo::increment_views(&pool, course.id + 1000).await.unwrap());

    let course = CourseRepo::find_by_id(&pool, course.id).await.unwrap().unwrap();
    assert_eq!(course.views, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn reviews_update_rating_and_reject_duplicates(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    let sam = create_user(&pool, "sam@example.com", "student").await;
    let eve = create_user(&pool, "eve@example.com", "student").await;
    let course = create_course(&pool, instructor.id, "Intro to Rust").await;

    ReviewRepo::create(&pool, course.id, sam.id, &CreateReview { rating: 5, comment: None })
        .await
        .unwrap()
        .unwrap();
    let review = ReviewRepo::create(
        &pool,
        course.id,
        eve.id,
        &CreateReview {
            rating: 4,
            comment: Some("Solid".into()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(review.user_name, "eve");

    let dup = ReviewRepo::create(&pool, course.id, sam.id, &CreateReview { rating: 1, comment: None })
        .await
        .unwrap();
    assert!(dup.is_none());

    let course = CourseRepo::find_by_id(&pool, course.id).await.unwrap().unwrap();
    assert_eq!(course.rating_count, 2);
    assert_eq!(course.rating_average, 4.5);
    assert_eq!(ReviewRepo::list_for_course(&pool, course.id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_cascade_removes_every_dependent(pool: PgPool) {
    let instructor = create_user(&pool, "ada@example.com", "instructor").await;
    let student = create_user(&pool, "sam@example.com", "student").await;
    let course = create_course(&pool, instructor.id, "Intro to Rust").await;
    let keep = create_course(&pool, instructor.id, "Advanced Rust").await;
    let lessons = create_lessons(&pool, instructor.id, course.id, 2).await;

    EnrollmentRepo::enroll(&pool, student.id, course.id).await.unwrap();
    EnrollmentRepo::enroll(&pool, student.id, keep.id).await.unwrap();
    for lesson in &lessons {
        ProgressRepo::complete_lesson(&pool, student.id, lesson)
            .await
            .unwrap()
            .unwrap();
    }
    ReviewRepo::create(&pool, course.id, student.id, &CreateReview { rating: 5, comment: None })
        .await
        .unwrap();

    let deletion = CourseRepo::delete_cascade(&pool, course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deletion.progress_rows_deleted, 2);
    assert_eq!(deletion.enrollments_removed, 1);
    assert_eq!(deletion.completions_removed, 1);
    assert_eq!(deletion.lessons_deleted, 2);
    assert_eq!(deletion.reviews_deleted, 1);

    assert!(CourseRepo::find_by_id(&pool, course.id).await.unwrap().is_none());
    assert!(LessonRepo::list_by_course(&pool, course.id).await.unwrap().is_empty());
    let mine = EnrollmentRepo::list_for_user(&pool, student.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].course.id, keep.id);
    let owned = CourseRepo::list_by_instructor(&pool, instructor.id).await.unwrap();
    assert_eq!(owned.len(), 1);

    assert!(CourseRepo::delete_cascade(&pool, course.id).await.unwrap().is_none());
}
