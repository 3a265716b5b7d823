//! Room inventory repository
//!
//! Bulk mutations run in a single transaction and append one `room_history`
//! row per touched room. Rooms are soft-deleted through `deleted_at`.

use crate::domain::{Room, RoomAction};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Rooms that are currently in the inventory
    async fn fetch_rooms(&self) -> Result<Vec<Room>>;
    /// Rooms that existed at some point during the academic year
    async fn fetch_rooms_by_academic_year(&self, academic_year_id: i32) -> Result<Vec<Room>>;
    async fn add_rooms(&self, rooms: &[Room], changed_by: i32) -> Result<Vec<Room>>;
    async fn update_rooms(&self, rooms: &[Room], changed_by: i32) -> Result<Vec<Room>>;
    async fn delete_rooms(&self, ids: &[i32], changed_by: i32) -> Result<()>;
    async fn fetch_room_history(&self, room_id: i32) -> Result<Vec<Room>>;
}

pub struct RoomRepositoryImpl {
    pool: PgPool,
}

impl RoomRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn record_history(
    conn: &mut PgConnection,
    room: &Room,
    action: RoomAction,
    changed_by: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO room_history (room_id, number, type, building, floor, seats, computers,
                                  action, changed_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(room.id)
    .bind(&room.number)
    .bind(room.room_type)
    .bind(&room.building)
    .bind(room.floor)
    .bind(room.seats)
    .bind(room.computers)
    .bind(action.as_str())
    .bind(changed_by)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl RoomRepository for RoomRepositoryImpl {
    async fn fetch_rooms(&self) -> Result<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, number, type, building, floor, seats, computers
            FROM rooms
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    async fn fetch_rooms_by_academic_year(&self, academic_year_id: i32) -> Result<Vec<Room>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM academic_years WHERE id = $1)")
                .bind(academic_year_id)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "academic year {} not found",
                academic_year_id
            )));
        }

        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT r.id, r.number, r.type, r.building, r.floor, r.seats, r.computers
            FROM rooms r
            JOIN academic_years y ON y.id = $1
            WHERE r.created_at::date <= y.end_date
              AND (r.deleted_at IS NULL OR r.deleted_at::date >= y.start_date)
            ORDER BY r.id
            "#,
        )
        .bind(academic_year_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    async fn add_rooms(&self, rooms: &[Room], changed_by: i32) -> Result<Vec<Room>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(rooms.len());

        for room in rooms {
            let created = sqlx::query_as::<_, Room>(
                r#"
                INSERT INTO rooms (number, type, building, floor, seats, computers)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, number, type, building, floor, seats, computers
                "#,
            )
            .bind(&room.number)
            .bind(room.room_type)
            .bind(&room.building)
            .bind(room.floor)
            .bind(room.seats)
            .bind(room.computers)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "room"))?;

            record_history(&mut *tx, &created, RoomAction::Created, changed_by).await?;
            stored.push(created);
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn update_rooms(&self, rooms: &[Room], changed_by: i32) -> Result<Vec<Room>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(rooms.len());

        for room in rooms {
            let updated = sqlx::query_as::<_, Room>(
                r#"
                UPDATE rooms
                SET number = $2, type = $3, building = $4, floor = $5,
                    seats = $6, computers = $7, updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING id, number, type, building, floor, seats, computers
                "#,
            )
            .bind(room.id)
            .bind(&room.number)
            .bind(room.room_type)
            .bind(&room.building)
            .bind(room.floor)
            .bind(room.seats)
            .bind(room.computers)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "room"))?
            .ok_or_else(|| AppError::NotFound(format!("room {} not found", room.id)))?;

            record_history(&mut *tx, &updated, RoomAction::Updated, changed_by).await?;
            stored.push(updated);
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn delete_rooms(&self, ids: &[i32], changed_by: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for id in ids {
            let deleted = sqlx::query_as::<_, Room>(
                r#"
                UPDATE rooms
                SET deleted_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING id, number, type, building, floor, seats, computers
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("room {} not found", id)))?;

            record_history(&mut *tx, &deleted, RoomAction::Deleted, changed_by).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_room_history(&self, room_id: i32) -> Result<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT room_id AS id, number, type, building, floor, seats, computers
            FROM room_history
            WHERE room_id = $1
            ORDER BY history_id
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_mock_fetch_rooms_by_unknown_year() {
        let mut mock = MockRoomRepository::new();

        mock.expect_fetch_rooms_by_academic_year()
            .with(eq(2031))
            .returning(|id| Err(AppError::NotFound(format!("academic year {} not found", id))));

        let result = mock.fetch_rooms_by_academic_year(2031).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_add_rooms_assigns_ids() {
        let mut mock = MockRoomRepository::new();

        mock.expect_add_rooms()
            .withf(|rooms: &[Room], changed_by: &i32| rooms.len() == 2 && *changed_by == 42)
            .returning(|rooms, _| {
                Ok(rooms
                    .iter()
                    .enumerate()
                    .map(|(i, r)| Room {
                        id: i as i32 + 10,
                        ..r.clone()
                    })
                    .collect())
            });

        let input = vec![
            Room {
                number: "101".to_string(),
                ..Default::default()
            },
            Room {
                number: "102".to_string(),
                ..Default::default()
            },
        ];
        let stored = mock.add_rooms(&input, 42).await.unwrap();
        assert_eq!(stored[0].id, 10);
        assert_eq!(stored[1].id, 11);
        assert_eq!(stored[1].number, "102");
    }
}
