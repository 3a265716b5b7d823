//! Room inventory domain models

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{FromRow, Postgres};
use validator::Validate;

/// Kind of room in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    #[default]
    Classroom,
    Laboratory,
    ComputerLab,
    LectureHall,
    Gym,
    Office,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Classroom => "classroom",
            RoomType::Laboratory => "laboratory",
            RoomType::ComputerLab => "computer_lab",
            RoomType::LectureHall => "lecture_hall",
            RoomType::Gym => "gym",
            RoomType::Office => "office",
        }
    }
}

impl std::str::FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classroom" => Ok(RoomType::Classroom),
            "laboratory" => Ok(RoomType::Laboratory),
            "computer_lab" => Ok(RoomType::ComputerLab),
            "lecture_hall" => Ok(RoomType::LectureHall),
            "gym" => Ok(RoomType::Gym),
            "office" => Ok(RoomType::Office),
            _ => Err(format!("Unknown room type: {}", s)),
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<Postgres> for RoomType {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for RoomType {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for RoomType {
    fn encode_by_ref(
        &self,
        buf: &mut PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// A room in the college inventory
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRow, Validate)]
pub struct Room {
    pub id: i32,
    #[validate(length(min = 1, max = 32))]
    pub number: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub room_type: RoomType,
    #[validate(length(min = 1, max = 128))]
    pub building: String,
    pub floor: i32,
    #[validate(range(min = 0))]
    pub seats: i32,
    #[validate(range(min = 0))]
    pub computers: i32,
}

/// What happened to a room in a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    Created,
    Updated,
    Deleted,
}

impl RoomAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomAction::Created => "created",
            RoomAction::Updated => "updated",
            RoomAction::Deleted => "deleted",
        }
    }
}
