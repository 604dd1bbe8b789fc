//! Router assembly for the studio HTTP API.
//!
//! [`build_router`] mounts every handler under `<base>/cropmstudio/` and adds
//! the token check, CORS and tracing layers.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_token;
use crate::config::api_prefix;
use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// The token middleware is a route layer, so unknown paths still answer 404.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/get-packages", get(handlers::packages::list_packages))
        .route("/get-models", get(handlers::packages::list_models))
        .route("/get-model-header", get(handlers::models::model_header))
        .route(
            "/get-model-unit-inputs-outputs",
            get(handlers::models::model_inputs_outputs),
        )
        .route(
            "/get-model-unit-parametersets",
            get(handlers::models::model_parametersets),
        )
        .route(
            "/get-model-unit-testsets",
            get(handlers::models::model_testsets),
        )
        .route("/create-model", post(handlers::models::create_model))
        .route("/display-model", post(handlers::models::display_model))
        .route("/create-package", post(handlers::packages::create_package))
        .route("/import-package", post(handlers::packages::import_package))
        .route(
            "/download-package",
            post(handlers::packages::download_package),
        )
        .route(
            "/Crop2ML-to-platform",
            post(handlers::transform::to_platform),
        )
        .route(
            "/platform-to-Crop2ML",
            post(handlers::transform::to_crop2ml),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .nest(&api_prefix(&state.base_url), api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
