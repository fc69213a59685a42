use axum::{
    RequestPartsExt,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use petmatch_types::models::User;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::{AppState, blocking};

/// Verifies the bearer token and stores the caller's [`Identity`] in the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let identity = state.identity.verify(bearer.token())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or(ApiError::Unauthorized)
    }
}

/// The stored user behind the verified identity. Identities that never went
/// through `/users/sync` are rejected with 401.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity: Identity = parts.extract().await?;
        let user = blocking(state, move |db| db.get_user_by_external_id(&identity.external_id))
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}
