//! Application state traits for dependency injection
//!
//! Handlers are generic over these traits so the same code runs against the
//! production `AppState` and against mock-backed test states.

use crate::jwt::JwtManager;
use crate::service::{GradeSvc, RoomSvc};
use async_trait::async_trait;

/// State that serves the room inventory endpoints
pub trait HasRooms: Clone + Send + Sync + 'static {
    type RoomService: RoomSvc + 'static;

    fn room_service(&self) -> &Self::RoomService;

    /// Get the JWT manager for token verification
    fn jwt_manager(&self) -> &JwtManager;
}

/// State that serves the grading endpoints
pub trait HasGrades: Clone + Send + Sync + 'static {
    type GradeService: GradeSvc + 'static;

    fn grade_service(&self) -> &Self::GradeService;

    /// Get the JWT manager for token verification
    fn jwt_manager(&self) -> &JwtManager;
}

/// State that can report whether its backing store is reachable
#[async_trait]
pub trait HasReadiness: Clone + Send + Sync + 'static {
    async fn check_ready(&self) -> bool;
}
