//! Business logic layer

pub mod grade;
pub mod room;

pub use grade::{GradeService, GradeSvc};
pub use room::{RoomService, RoomSvc};
