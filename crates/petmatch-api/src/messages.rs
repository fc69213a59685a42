use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use petmatch_db::SendOutcome;
use petmatch_types::api::SendMessageRequest;
use petmatch_types::models::Message;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::BadRequest("message cannot be empty".into()));
    }

    match blocking(&state, move |db| db.send_message(application_id, user.id, &content)).await? {
        SendOutcome::Sent(message) => Ok((StatusCode::CREATED, Json(message))),
        SendOutcome::ApplicationNotFound => Err(ApiError::NotFound("Application")),
        SendOutcome::NotParticipant => Err(ApiError::Forbidden(
            "only the applicant and the owner can post here".into(),
        )),
    }
}

/// The thread of one application, oldest first. Participants only.
pub async fn get_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let app = blocking(&state, move |db| db.get_application(application_id))
        .await?
        .ok_or(ApiError::NotFound("Application"))?;
    if app.applicant_id != user.id && app.owner_id != user.id {
        return Err(ApiError::Forbidden("not a participant of this thread".into()));
    }

    let messages = blocking(&state, move |db| db.get_messages(application_id)).await?;
    Ok(Json(messages))
}
