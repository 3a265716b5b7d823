//! Data access layer (Repository pattern)

pub mod grade;
pub mod room;

pub use grade::{GradeRepository, GradeRepositoryImpl};
pub use room::{RoomRepository, RoomRepositoryImpl};
