//! Handlers for the `/courses` resource: catalog, authoring, enrollment and
//! the instructor dashboards.
//!
//! Authoring endpoints pass two gates: the route-level role extractor and the
//! per-course ownership check in [`find_owned_course`].

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eduhub_core::analytics::{
    average_progress, average_rating, completion_rate, most_recent, ProgressHistogram,
    RECENT_ENROLLMENTS_LIMIT,
};
use eduhub_core::catalog::{
    clamp_page, clamp_page_size, like_pattern, normalize_filter, page_count, page_offset,
    CourseSort,
};
use eduhub_core::course::{
    format_duration, toggle_publication, unique_slug, validate_category, validate_level,
    validate_pricing, validate_status,
};
use eduhub_core::error::CoreError;
use eduhub_core::progress::validate_progress;
use eduhub_core::roles::ensure_owner;
use eduhub_core::types::DbId;
use eduhub_db::models::course::{
    Course, CourseDeletion, CourseFilter, CourseWithInstructor, CreateCourse, UpdateCourse,
};
use eduhub_db::models::enrollment::{
    EnrolledCourse, EnrolledStudent, Enrollment, ProgressUpdate, RecentEnrollment, Unenrollment,
};
use eduhub_db::repositories::{CourseRepo, DirectProgressOutcome, EnrollmentRepo, LessonRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireInstructor, RequireStudent};
use crate::query::CatalogParams;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /courses/{id}/progress`.
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i64,
}

/// One lesson in the course detail outline.
#[derive(Debug, Serialize)]
pub struct LessonOutline {
    pub id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub duration_mins: i32,
    pub is_preview: bool,
}

/// `GET /courses/{id}` payload.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseWithInstructor,
    pub formatted_duration: String,
    pub lessons: Vec<LessonOutline>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EnrollmentStats {
    pub enrolled: i64,
    pub completed: i64,
    pub completion_rate: i64,
}

/// An owned course on the instructor's dashboard.
#[derive(Debug, Serialize)]
pub struct InstructorCourse {
    #[serde(flatten)]
    pub course: Course,
    pub enrollment_stats: EnrollmentStats,
}

/// `GET /courses/instructor/stats` payload.
#[derive(Debug, Serialize)]
pub struct InstructorStats {
    pub total_courses: usize,
    pub published_courses: usize,
    pub total_students: i64,
    pub completed_students: i64,
    pub average_rating: f64,
    pub recent_enrollments: Vec<RecentEnrollment>,
}

/// `GET /courses/{id}/analytics` payload.
#[derive(Debug, Serialize)]
pub struct CourseAnalytics {
    pub course_id: DbId,
    pub title: String,
    pub total_students: i64,
    pub completed_students: i64,
    pub completion_rate: i64,
    pub average_progress: i64,
    pub progress_distribution: ProgressHistogram,
    pub recent_enrollments: Vec<EnrolledStudent>,
    pub students: Vec<EnrolledStudent>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a course and check the caller may `action` it (owner or admin).
async fn find_owned_course(
    state: &AppState,
    id: DbId,
    user: &AuthUser,
    action: &str,
) -> AppResult<Course> {
    let course = find_course(state, id).await?;
    ensure_owner(user.user_id, &user.role, course.instructor_id, action)?;
    Ok(course)
}

async fn find_course(state: &AppState, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

fn course_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Course",
        id,
    })
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/courses
///
/// Published courses only, filtered by category, level and free-text search.
pub async fn list_courses(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CatalogParams>,
) -> AppResult<Json<ApiResponse<Vec<CourseWithInstructor>>>> {
    let page = clamp_page(params.page);
    let page_size = clamp_page_size(params.limit);

    let filter = CourseFilter {
        category: normalize_filter(params.category.as_deref()).map(str::to_string),
        level: normalize_filter(params.level.as_deref()).map(str::to_string),
        search: normalize_filter(params.search.as_deref()).map(like_pattern),
    };
    let sort = CourseSort::parse(params.sort.as_deref());

    let total = CourseRepo::count_published(&state.pool, &filter).await?;
    let courses = CourseRepo::list_published(
        &state.pool,
        &filter,
        sort,
        page_size,
        page_offset(page, page_size),
    )
    .await?;

    Ok(Json(ApiResponse::page(
        courses,
        total,
        page,
        page_count(total, page_size),
    )))
}

/// GET /api/courses/{id}
///
/// Counts a view, then returns the course with its instructor and lesson outline.
pub async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<CourseDetail>>> {
    if !CourseRepo::increment_views(&state.pool, id).await? {
        return Err(course_not_found(id));
    }

    let course = CourseRepo::find_with_instructor(&state.pool, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    let lessons = LessonRepo::list_by_course(&state.pool, id)
        .await?
        .into_iter()
        .map(|l| LessonOutline {
            id: l.id,
            title: l.title,
            sort_order: l.sort_order,
            duration_mins: l.duration_mins,
            is_preview: l.is_preview,
        })
        .collect();

    let formatted_duration = format_duration(
        course.course.duration_hours,
        course.course.duration_minutes,
    );

    Ok(Json(ApiResponse::ok(CourseDetail {
        course,
        formatted_duration,
        lessons,
    })))
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

/// POST /api/courses
///
/// New courses start as drafts owned by the caller.
pub async fn create_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppJson(input): AppJson<CreateCourse>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    input.validate()?;
    validate_category(&input.category)?;
    validate_level(&input.level)?;
    validate_pricing(input.price, input.discount_price)?;

    let slug = unique_slug(&input.title);
    let course = CourseRepo::create(&state.pool, user.user_id, &slug, &input).await?;

    tracing::info!(course_id = course.id, instructor_id = user.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(course))))
}

/// PUT /api/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCourse>,
) -> AppResult<Json<ApiResponse<Course>>> {
    input.validate()?;
    let existing = find_owned_course(&state, id, &user, "update").await?;

    if let Some(category) = input.category.as_deref() {
        validate_category(category)?;
    }
    if let Some(level) = input.level.as_deref() {
        validate_level(level)?;
    }
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    validate_pricing(
        input.price.unwrap_or(existing.price),
        input.discount_price.or(existing.discount_price),
    )?;

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tracing::info!(course_id = id, user_id = user.user_id, "Course updated");
    Ok(Json(ApiResponse::ok(course)))
}

/// DELETE /api/courses/{id}
///
/// Removes the course with its lessons, enrollments, completions, progress
/// rows and reviews in one transaction.
pub async fn delete_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<CourseDeletion>>> {
    find_owned_course(&state, id, &user, "delete").await?;

    let deletion = CourseRepo::delete_cascade(&state.pool, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tracing::info!(
        course_id = id,
        user_id = user.user_id,
        lessons = deletion.lessons_deleted,
        enrollments = deletion.enrollments_removed,
        "Course deleted",
    );
    Ok(Json(
        ApiResponse::ok(deletion).with_message("Course deleted successfully"),
    ))
}

/// PUT /api/courses/{id}/publish
///
/// Published courses go back to draft; anything else becomes published.
pub async fn toggle_publish(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let existing = find_owned_course(&state, id, &user, "publish").await?;
    let toggle = toggle_publication(&existing.status);

    let course = CourseRepo::set_status(&state.pool, id, toggle.status)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    let message = if toggle.is_published {
        "Course published"
    } else {
        "Course unpublished"
    };
    tracing::info!(course_id = id, status = toggle.status, "Course publication toggled");
    Ok(Json(ApiResponse::ok(course).with_message(message)))
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

/// POST /api/courses/{id}/enroll
pub async fn enroll(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Enrollment>>> {
    find_course(&state, id).await?;

    let enrollment = EnrollmentRepo::enroll(&state.pool, user.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::AlreadyEnrolled { course_id: id }))?;

    tracing::info!(course_id = id, user_id = user.user_id, "Student enrolled");
    Ok(Json(
        ApiResponse::ok(enrollment).with_message("Successfully enrolled in course"),
    ))
}

/// POST /api/courses/{id}/unenroll
pub async fn unenroll(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Unenrollment>>> {
    find_course(&state, id).await?;

    let removed = EnrollmentRepo::unenroll(&state.pool, user.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotEnrolled { course_id: id }))?;

    tracing::info!(
        course_id = id,
        user_id = user.user_id,
        progress_rows = removed.progress_rows_deleted,
        "Student unenrolled",
    );
    Ok(Json(
        ApiResponse::ok(removed).with_message("Successfully unenrolled from course"),
    ))
}

/// PUT /api/courses/{id}/progress
///
/// The value must agree with the caller's completed lessons; for a course
/// without lessons it is taken as given.
pub async fn update_progress(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ProgressRequest>,
) -> AppResult<Json<ApiResponse<ProgressUpdate>>> {
    let requested = validate_progress(input.progress)?;
    find_course(&state, id).await?;

    match EnrollmentRepo::set_progress(&state.pool, user.user_id, id, requested).await? {
        DirectProgressOutcome::Updated(update) => {
            tracing::info!(
                course_id = id,
                user_id = user.user_id,
                progress = update.enrollment.progress,
                "Course progress set",
            );
            Ok(Json(ApiResponse::ok(update).with_message("Progress updated")))
        }
        DirectProgressOutcome::NotEnrolled => {
            Err(AppError::Core(CoreError::NotEnrolled { course_id: id }))
        }
        DirectProgressOutcome::Rejected(err) => Err(AppError::Core(err)),
    }
}

/// GET /api/courses/my-courses
pub async fn my_courses(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
) -> AppResult<Json<ApiResponse<Vec<EnrolledCourse>>>> {
    let courses = EnrollmentRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::list(courses)))
}

// ---------------------------------------------------------------------------
// Instructor dashboards
// ---------------------------------------------------------------------------

/// GET /api/courses/instructor/my-courses
pub async fn instructor_courses(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
) -> AppResult<Json<ApiResponse<Vec<InstructorCourse>>>> {
    let courses = CourseRepo::list_by_instructor(&state.pool, user.user_id).await?;
    let counts: HashMap<DbId, (i64, i64)> =
        EnrollmentRepo::counts_for_instructor(&state.pool, user.user_id)
            .await?
            .into_iter()
            .map(|c| (c.course_id, (c.enrolled, c.completed)))
            .collect();

    let items = courses
        .into_iter()
        .map(|course| {
            let (enrolled, completed) = counts.get(&course.id).copied().unwrap_or_default();
            InstructorCourse {
                course,
                enrollment_stats: EnrollmentStats {
                    enrolled,
                    completed,
                    completion_rate: completion_rate(completed, enrolled),
                },
            }
        })
        .collect();

    Ok(Json(ApiResponse::list(items)))
}

/// GET /api/courses/instructor/stats
///
/// Only rated courses contribute to `average_rating`.
pub async fn instructor_stats(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
) -> AppResult<Json<ApiResponse<InstructorStats>>> {
    let courses = CourseRepo::list_by_instructor(&state.pool, user.user_id).await?;
    let counts = EnrollmentRepo::counts_for_instructor(&state.pool, user.user_id).await?;
    let recent_enrollments = EnrollmentRepo::recent_for_instructor(
        &state.pool,
        user.user_id,
        RECENT_ENROLLMENTS_LIMIT as i64,
    )
    .await?;

    let ratings: Vec<f64> = courses
        .iter()
        .filter(|c| c.rating_count > 0)
        .map(|c| c.rating_average)
        .collect();

    Ok(Json(ApiResponse::ok(InstructorStats {
        total_courses: courses.len(),
        published_courses: courses.iter().filter(|c| c.is_published).count(),
        total_students: counts.iter().map(|c| c.enrolled).sum(),
        completed_students: counts.iter().map(|c| c.completed).sum(),
        average_rating: average_rating(&ratings),
        recent_enrollments,
    })))
}

/// GET /api/courses/{id}/analytics
pub async fn course_analytics(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<CourseAnalytics>>> {
    let course = find_owned_course(&state, id, &user, "view analytics for").await?;
    let students = EnrollmentRepo::list_students(&state.pool, id).await?;

    let progress: Vec<i16> = students.iter().map(|s| s.progress).collect();
    let total_students = students.len() as i64;
    let completed_students = students.iter().filter(|s| s.is_completed).count() as i64;
    let recent_enrollments =
        most_recent(students.clone(), RECENT_ENROLLMENTS_LIMIT, |s| s.enrolled_at);

    Ok(Json(ApiResponse::ok(CourseAnalytics {
        course_id: course.id,
        title: course.title,
        total_students,
        completed_students,
        completion_rate: completion_rate(completed_students, total_students),
        average_progress: average_progress(&progress),
        progress_distribution: ProgressHistogram::from_progress(progress.iter().copied()),
        recent_enrollments,
        students,
    })))
}
