//! Room inventory API handlers

use crate::api::{decode_body, parse_id};
use crate::domain::Room;
use crate::error::Result;
use crate::service::RoomSvc;
use crate::state::HasRooms;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

/// List the current room inventory
pub async fn fetch_rooms<S: HasRooms>(State(state): State<S>) -> Result<impl IntoResponse> {
    let rooms = state.room_service().fetch_rooms("").await?;
    Ok(Json(rooms))
}

/// List the rooms of an academic year
pub async fn fetch_rooms_by_academic_year<S: HasRooms>(
    State(state): State<S>,
    Path(academic_year_id): Path<String>,
) -> Result<impl IntoResponse> {
    let rooms = state.room_service().fetch_rooms(&academic_year_id).await?;
    Ok(Json(rooms))
}

/// Add rooms
pub async fn add_rooms<S: HasRooms>(
    State(state): State<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let rooms: Vec<Room> = decode_body(&body)?;
    let claims = state.jwt_manager().claims_from_headers(&headers)?;

    let stored = state.room_service().add_rooms(&claims, &rooms).await?;
    Ok(Json(stored))
}

/// Update rooms
pub async fn update_rooms<S: HasRooms>(
    State(state): State<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let rooms: Vec<Room> = decode_body(&body)?;
    let claims = state.jwt_manager().claims_from_headers(&headers)?;

    let stored = state.room_service().update_rooms(&claims, &rooms).await?;
    Ok(Json(stored))
}

/// Delete rooms. The body is a JSON array of room ids.
pub async fn delete_rooms<S: HasRooms>(
    State(state): State<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let ids: Vec<i32> = decode_body(&body)?;
    let claims = state.jwt_manager().claims_from_headers(&headers)?;

    state.room_service().delete_rooms(&claims, &ids).await?;
    Ok(StatusCode::OK)
}

/// Change history of one room
pub async fn fetch_room_history<S: HasRooms>(
    State(state): State<S>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse> {
    let room_id = parse_id(&room_id)?;
    let history = state.room_service().fetch_room_history(room_id).await?;
    Ok(Json(history))
}
