use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use petmatch_types::api::UnreadCountResponse;
use petmatch_types::models::Notification;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = blocking(&state, move |db| db.get_notifications(user.id)).await?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = blocking(&state, move |db| db.unread_count(user.id)).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    // someone else's notification looks the same as a missing one
    if blocking(&state, move |db| db.mark_notification_read(id, user.id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Notification"))
    }
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.mark_all_notifications_read(user.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
