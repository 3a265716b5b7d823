//! Grade API handlers

use crate::api::{decode_body, parse_id};
use crate::domain::Grade;
use crate::error::Result;
use crate::service::GradeSvc;
use crate::state::HasGrades;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

/// List all grades
pub async fn fetch_grades<S: HasGrades>(State(state): State<S>) -> Result<impl IntoResponse> {
    let grades = state.grade_service().fetch_grades().await?;
    Ok(Json(grades))
}

/// Get grade by ID
pub async fn get_grade<S: HasGrades>(
    State(state): State<S>,
    Path(grade_id): Path<String>,
) -> Result<impl IntoResponse> {
    let grade_id = parse_id(&grade_id)?;
    let grade = state.grade_service().get_grade(grade_id).await?;
    Ok(Json(grade))
}

pub async fn fetch_grades_by_student<S: HasGrades>(
    State(state): State<S>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse> {
    let student_id = parse_id(&student_id)?;
    let grades = state
        .grade_service()
        .fetch_grades_by_student(student_id)
        .await?;
    Ok(Json(grades))
}

pub async fn fetch_grades_by_subject<S: HasGrades>(
    State(state): State<S>,
    Path(subject_id): Path<String>,
) -> Result<impl IntoResponse> {
    let subject_id = parse_id(&subject_id)?;
    let grades = state
        .grade_service()
        .fetch_grades_by_subject(subject_id)
        .await?;
    Ok(Json(grades))
}

/// Every recorded version of a grade, oldest first
pub async fn fetch_grade_history<S: HasGrades>(
    State(state): State<S>,
    Path(grade_id): Path<String>,
) -> Result<impl IntoResponse> {
    let grade_id = parse_id(&grade_id)?;
    let history = state.grade_service().fetch_grade_history(grade_id).await?;
    Ok(Json(history))
}

/// Record a grade
pub async fn add_grade<S: HasGrades>(
    State(state): State<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let grade: Grade = decode_body(&body)?;
    let claims = state.jwt_manager().claims_from_headers(&headers)?;

    let stored = state.grade_service().add_grade(&claims, &grade).await?;
    Ok(Json(stored))
}

/// Delete a grade
pub async fn delete_grade<S: HasGrades>(
    State(state): State<S>,
    headers: HeaderMap,
    Path(grade_id): Path<String>,
) -> Result<impl IntoResponse> {
    let grade_id = parse_id(&grade_id)?;
    let claims = state.jwt_manager().claims_from_headers(&headers)?;

    state.grade_service().delete_grade(&claims, grade_id).await?;
    Ok(StatusCode::OK)
}
