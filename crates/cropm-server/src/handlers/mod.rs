//! HTTP handler modules for the studio API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! service lock, delegate to [`crate::service::StudioService`], and return
//! JSON responses. No business logic lives in handlers.

pub mod models;
pub mod packages;
pub mod transform;

use crate::error::ApiError;
use crate::service::StudioService;
use crate::state::AppState;

/// Runs a service call that shells out or touches the disk on the blocking
/// pool, holding the service lock for the duration of the call.
pub(crate) async fn run_blocking<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut StudioService) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let mut service = state.service.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || call(&mut service))
        .await
        .map_err(|e| ApiError::InternalError(format!("service task failed: {e}")))?
}
