//! Domain models for LMS Core

pub mod grade;
pub mod room;

pub use grade::*;
pub use room::*;
