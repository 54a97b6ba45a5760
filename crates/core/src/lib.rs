//! Domain rules for the eduhub platform.
//!
//! Everything in this crate is pure: validation, arithmetic and
//! authorization decisions over values handed in by the persistence and
//! HTTP layers. No I/O happens here.

pub mod analytics;
pub mod catalog;
pub mod course;
pub mod error;
pub mod lesson;
pub mod progress;
pub mod review;
pub mod roles;
pub mod types;
