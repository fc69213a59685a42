use std::sync::Arc;

use petmatch_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::identity::IdentityVerifier;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppStateInner {
    pub fn new(db: Database, identity: Arc<dyn IdentityVerifier>) -> AppState {
        Arc::new(Self { db, identity })
    }
}

/// Runs a blocking database call off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
