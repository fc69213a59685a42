pub mod applications;
pub mod error;
pub mod identity;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod pets;
pub mod state;
pub mod users;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use serde_json::{Value, json};

pub use error::ApiError;
pub use identity::{Identity, IdentityVerifier, JwtVerifier};
pub use state::{AppState, AppStateInner};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// All routes. CORS and request tracing are layered on by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/pets", get(pets::list_pets))
        .route("/pets/search", get(pets::search_pets))
        .route("/pets/{id}", get(pets::get_pet))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/sync", post(users::sync_user))
        .route(
            "/users/me",
            get(users::get_me).patch(users::update_me).delete(users::delete_me),
        )
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/pets", get(users::get_user_pets))
        .route("/pets", post(pets::create_pet))
        .route("/pets/recommended", get(pets::recommended_pets))
        .route("/pets/{id}", patch(pets::update_pet).delete(pets::delete_pet))
        .route("/pets/{id}/applications/mine", get(applications::my_application_for_pet))
        .route("/applications", post(applications::create_application))
        .route("/applications/sent", get(applications::sent_applications))
        .route("/applications/received", get(applications::received_applications))
        .route("/applications/{id}/status", patch(applications::update_status))
        .route(
            "/applications/{id}/messages",
            get(messages::get_messages).post(messages::send_message),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
