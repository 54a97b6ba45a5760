//! Handlers for the `/lessons` resource: authoring, completion, watch
//! progress, quizzes and bookmarks.
//!
//! Lesson mutation is bound to the owner of the lesson's course (or an admin).
//! Learner endpoints require an enrollment in that course.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eduhub_core::error::CoreError;
use eduhub_core::lesson::{
    score_quiz, validate_duration, validate_quiz, validate_resources, validate_sort_order,
    LessonResource, QuizQuestion,
};
use eduhub_core::progress::{validate_bookmark, validate_notes, validate_watch_time};
use eduhub_core::roles::ensure_owner;
use eduhub_core::types::DbId;
use eduhub_db::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use eduhub_db::models::progress::{
    Bookmark, CreateBookmark, LessonCompletion, LessonProgress, UpdateLessonProgress,
};
use eduhub_db::repositories::{CourseRepo, LessonRepo, ProgressRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireInstructor, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /lessons/{id}/quiz`. `answers[i]` is the chosen
/// option index for question `i`.
#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub score: i16,
    pub total_questions: usize,
    pub progress: LessonProgress,
}

/// `GET /lessons/{id}` payload.
#[derive(Debug, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub next_lesson_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_lesson(state: &AppState, id: DbId) -> AppResult<Lesson> {
    LessonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))
}

/// Check that the caller owns the course `course_id` (or is an admin).
async fn authorize_course_owner(
    state: &AppState,
    course_id: DbId,
    user: &AuthUser,
    action: &str,
) -> AppResult<()> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    ensure_owner(user.user_id, &user.role, course.instructor_id, action)?;
    Ok(())
}

fn not_enrolled(course_id: DbId) -> AppError {
    AppError::Core(CoreError::NotEnrolled { course_id })
}

fn validate_lesson_fields(
    sort_order: Option<i32>,
    duration_mins: Option<i32>,
    quiz: Option<&[QuizQuestion]>,
    resources: Option<&[LessonResource]>,
) -> Result<(), CoreError> {
    if let Some(order) = sort_order {
        validate_sort_order(order)?;
    }
    if let Some(duration) = duration_mins {
        validate_duration(duration)?;
    }
    if let Some(quiz) = quiz {
        validate_quiz(quiz)?;
    }
    if let Some(resources) = resources {
        validate_resources(resources)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

/// POST /api/lessons
///
/// Adding a lesson lowers every enrolled student's progress in that course.
pub async fn create_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppJson(input): AppJson<CreateLesson>,
) -> AppResult<(StatusCode, Json<ApiResponse<Lesson>>)> {
    input.validate()?;
    validate_lesson_fields(
        Some(input.sort_order),
        Some(input.duration_mins),
        Some(&input.quiz),
        Some(&input.resources),
    )?;
    authorize_course_owner(&state, input.course_id, &user, "add lessons to").await?;

    let lesson = LessonRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        lesson_id = lesson.id,
        course_id = lesson.course_id,
        user_id = user.user_id,
        "Lesson created",
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(lesson))))
}

/// GET /api/lessons/course/{course_id}
pub async fn list_course_lessons(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    AppPath(course_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Lesson>>>> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    let lessons = LessonRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(ApiResponse::list(lessons)))
}

/// GET /api/lessons/{id}
pub async fn get_lesson(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<LessonView>>> {
    let lesson = find_lesson(&state, id).await?;
    let next_lesson_id =
        LessonRepo::find_next_id(&state.pool, lesson.course_id, lesson.sort_order).await?;

    Ok(Json(ApiResponse::ok(LessonView {
        lesson,
        next_lesson_id,
    })))
}

/// PUT /api/lessons/{id}
pub async fn update_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateLesson>,
) -> AppResult<Json<ApiResponse<Lesson>>> {
    input.validate()?;
    validate_lesson_fields(
        input.sort_order,
        input.duration_mins,
        input.quiz.as_deref(),
        input.resources.as_deref(),
    )?;

    let existing = find_lesson(&state, id).await?;
    authorize_course_owner(&state, existing.course_id, &user, "update lessons of").await?;

    let lesson = LessonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;

    tracing::info!(lesson_id = id, user_id = user.user_id, "Lesson updated");
    Ok(Json(ApiResponse::ok(lesson)))
}

/// DELETE /api/lessons/{id}
pub async fn delete_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = find_lesson(&state, id).await?;
    authorize_course_owner(&state, existing.course_id, &user, "delete lessons of").await?;

    LessonRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;

    tracing::info!(
        lesson_id = id,
        course_id = existing.course_id,
        user_id = user.user_id,
        "Lesson deleted",
    );
    Ok(Json(ApiResponse::message("Lesson deleted successfully")))
}

// ---------------------------------------------------------------------------
// Learner progress
// ---------------------------------------------------------------------------

/// POST /api/lessons/{id}/complete
///
/// Returns the recomputed course percentage alongside the progress row.
pub async fn complete_lesson(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<LessonCompletion>>> {
    let lesson = find_lesson(&state, id).await?;

    let completion = ProgressRepo::complete_lesson(&state.pool, user.user_id, &lesson)
        .await?
        .ok_or_else(|| not_enrolled(lesson.course_id))?;

    tracing::info!(
        lesson_id = id,
        course_id = lesson.course_id,
        user_id = user.user_id,
        course_progress = completion.course_progress,
        "Lesson completed",
    );
    Ok(Json(
        ApiResponse::ok(completion).with_message("Lesson marked as completed"),
    ))
}

/// PUT /api/lessons/{id}/progress
pub async fn update_lesson_progress(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateLessonProgress>,
) -> AppResult<Json<ApiResponse<LessonProgress>>> {
    if let Some(secs) = input.watch_time_secs {
        validate_watch_time(secs)?;
    }
    if let Some(notes) = input.notes.as_deref() {
        validate_notes(notes)?;
    }

    let lesson = find_lesson(&state, id).await?;
    let progress = ProgressRepo::update_watch(&state.pool, user.user_id, &lesson, &input)
        .await?
        .ok_or_else(|| not_enrolled(lesson.course_id))?;
    Ok(Json(ApiResponse::ok(progress)))
}

/// POST /api/lessons/{id}/quiz
pub async fn submit_quiz(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<QuizSubmission>,
) -> AppResult<Json<ApiResponse<QuizResult>>> {
    let lesson = find_lesson(&state, id).await?;
    let score = score_quiz(&lesson.quiz, &input.answers)?;
    let progress = ProgressRepo::record_quiz_score(&state.pool, user.user_id, &lesson, score)
        .await?
        .ok_or_else(|| not_enrolled(lesson.course_id))?;

    tracing::info!(lesson_id = id, user_id = user.user_id, score, "Quiz submitted");
    Ok(Json(ApiResponse::ok(QuizResult {
        score,
        total_questions: lesson.quiz.len(),
        progress,
    })))
}

/// GET /api/lessons/course/{course_id}/progress
pub async fn course_progress(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(course_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<LessonProgress>>>> {
    let rows = ProgressRepo::list_for_course(&state.pool, user.user_id, course_id).await?;
    Ok(Json(ApiResponse::list(rows)))
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

/// GET /api/lessons/{id}/bookmarks
pub async fn list_bookmarks(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Bookmark>>>> {
    find_lesson(&state, id).await?;
    let bookmarks = ProgressRepo::list_bookmarks(&state.pool, user.user_id, id).await?;
    Ok(Json(ApiResponse::list(bookmarks)))
}

/// POST /api/lessons/{id}/bookmarks
pub async fn add_bookmark(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<CreateBookmark>,
) -> AppResult<(StatusCode, Json<ApiResponse<Bookmark>>)> {
    validate_bookmark(input.timestamp_secs, input.note.as_deref())?;

    let lesson = find_lesson(&state, id).await?;
    let bookmark = ProgressRepo::add_bookmark(&state.pool, user.user_id, &lesson, &input)
        .await?
        .ok_or_else(|| not_enrolled(lesson.course_id))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(bookmark))))
}

/// DELETE /api/lessons/{id}/bookmarks/{bookmark_id}
pub async fn delete_bookmark(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    AppPath((id, bookmark_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !ProgressRepo::delete_bookmark(&state.pool, user.user_id, id, bookmark_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Bookmark",
            id: bookmark_id,
        }));
    }
    Ok(Json(ApiResponse::message("Bookmark removed")))
}
