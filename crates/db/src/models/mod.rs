//! Row structs and DTOs, one module per table family.

pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod progress;
pub mod review;
pub mod session;
pub mod user;
