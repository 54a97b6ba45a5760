//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Operations that touch more than one table
//! open their own transaction.

pub mod course_repo;
pub mod enrollment_repo;
pub mod lesson_repo;
pub mod progress_repo;
pub mod review_repo;
pub mod session_repo;
pub mod user_repo;

pub use course_repo::CourseRepo;
pub use enrollment_repo::{DirectProgressOutcome, EnrollmentRepo};
pub use lesson_repo::LessonRepo;
pub use progress_repo::ProgressRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
