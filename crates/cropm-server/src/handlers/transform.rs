//! Transpilation handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::schema::transform::{TransformDirection, TransformRequest, TransformResponse};
use crate::state::AppState;

use super::run_blocking;

/// Generates code for every selected language and platform.
///
/// `POST Crop2ML-to-platform`
pub async fn to_platform(
    State(state): State<AppState>,
    body: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Json<TransformResponse>, ApiError> {
    info!("received package transformation request");
    let Json(req) = body.map_err(ApiError::in_band)?;
    let response = run_blocking(&state, move |service| {
        service.transform(&req, TransformDirection::ToPlatform)
    })
    .await?;
    Ok(Json(response))
}

/// Converts a platform component back into Crop2ML descriptions.
///
/// `POST platform-to-Crop2ML`
pub async fn to_crop2ml(
    State(state): State<AppState>,
    body: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Json<TransformResponse>, ApiError> {
    info!("received component transformation request");
    let Json(req) = body.map_err(ApiError::in_band)?;
    let response = run_blocking(&state, move |service| {
        service.transform(&req, TransformDirection::ToCrop2ml)
    })
    .await?;
    Ok(Json(response))
}
