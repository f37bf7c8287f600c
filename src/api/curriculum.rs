use super::ApiState;
use crate::auth::AuthUser;
use crate::curriculum::{Lesson, Sign};
use crate::error::ApiError;

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

/// `GET /curriculum/lessons`: every lesson with its signs in lesson order.
pub(super) async fn list_lessons(
    State(state): State<Arc<ApiState>>,
    _user: AuthUser,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let lessons = state.curriculum.list_lessons().await?;
    Ok(Json(lessons))
}

/// `GET /curriculum/signs/{id}`
pub(super) async fn get_sign(
    State(state): State<Arc<ApiState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Sign>, ApiError> {
    let sign = state
        .curriculum
        .get_sign(&id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(sign))
}
