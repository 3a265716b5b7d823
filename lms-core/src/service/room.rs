//! Room inventory business logic

use crate::domain::Room;
use crate::error::{AppError, Result};
use crate::jwt::Claims;
use crate::repository::RoomRepository;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Room operations exposed to the HTTP layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomSvc: Send + Sync {
    /// An empty `academic_year_id` selects the current inventory
    async fn fetch_rooms(&self, academic_year_id: &str) -> Result<Vec<Room>>;
    async fn add_rooms(&self, claims: &Claims, rooms: &[Room]) -> Result<Vec<Room>>;
    async fn update_rooms(&self, claims: &Claims, rooms: &[Room]) -> Result<Vec<Room>>;
    async fn delete_rooms(&self, claims: &Claims, ids: &[i32]) -> Result<()>;
    async fn fetch_room_history(&self, room_id: i32) -> Result<Vec<Room>>;
}

pub struct RoomService<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> RoomService<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    fn validate_all(rooms: &[Room]) -> Result<()> {
        for room in rooms {
            room.validate()?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: RoomRepository> RoomSvc for RoomService<R> {
    async fn fetch_rooms(&self, academic_year_id: &str) -> Result<Vec<Room>> {
        let academic_year_id = academic_year_id.trim();
        if academic_year_id.is_empty() {
            return self.room_repo.fetch_rooms().await;
        }

        let year: i32 = academic_year_id
            .parse()
            .map_err(|_| AppError::InvalidId(format!("academic year id {:?}", academic_year_id)))?;

        self.room_repo.fetch_rooms_by_academic_year(year).await
    }

    async fn add_rooms(&self, claims: &Claims, rooms: &[Room]) -> Result<Vec<Room>> {
        Self::validate_all(rooms)?;
        if rooms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.room_repo.add_rooms(rooms, claims.user_id).await?;
        info!(user_id = claims.user_id, count = stored.len(), "Rooms added");
        Ok(stored)
    }

    async fn update_rooms(&self, claims: &Claims, rooms: &[Room]) -> Result<Vec<Room>> {
        Self::validate_all(rooms)?;
        if rooms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.room_repo.update_rooms(rooms, claims.user_id).await?;
        info!(user_id = claims.user_id, count = stored.len(), "Rooms updated");
        Ok(stored)
    }

    async fn delete_rooms(&self, claims: &Claims, ids: &[i32]) -> Result<()> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("no room ids given".to_string()));
        }

        // Each room is deleted once
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        self.room_repo.delete_rooms(&unique, claims.user_id).await?;
        info!(user_id = claims.user_id, count = unique.len(), "Rooms deleted");
        Ok(())
    }

    async fn fetch_room_history(&self, room_id: i32) -> Result<Vec<Room>> {
        self.room_repo.fetch_room_history(room_id).await
    }
}
