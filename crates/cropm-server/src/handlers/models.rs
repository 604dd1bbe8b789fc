//! Model handlers (inspect, create, display).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

use cropm_core::extract::{HeaderView, InputsOutputsView, ParameterSetsView, TestSetsView};

use crate::error::ApiError;
use crate::schema::common::{ApiResponse, ModelQuery, PathRequest};
use crate::schema::models::{CreateModelResponse, DisplayModelResponse};
use crate::state::AppState;

use super::run_blocking;

/// Returns the header form of a model.
///
/// `GET get-model-header?package=<path>&model=<file>`
pub async fn model_header(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ApiResponse<HeaderView>>, ApiError> {
    let view = run_blocking(&state, move |service| {
        service.model_header(query.package.as_deref(), query.model.as_deref())
    })
    .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// Returns the merged inputs/outputs table and function list of a model.
///
/// `GET get-model-unit-inputs-outputs?package=<path>&model=<file>`
pub async fn model_inputs_outputs(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ApiResponse<InputsOutputsView>>, ApiError> {
    let view = run_blocking(&state, move |service| {
        service.model_inputs_outputs(query.package.as_deref(), query.model.as_deref())
    })
    .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// `GET get-model-unit-parametersets?package=<path>&model=<file>`
pub async fn model_parametersets(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ApiResponse<ParameterSetsView>>, ApiError> {
    let view = run_blocking(&state, move |service| {
        service.model_parametersets(query.package.as_deref(), query.model.as_deref())
    })
    .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// `GET get-model-unit-testsets?package=<path>&model=<file>`
pub async fn model_testsets(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ApiResponse<TestSetsView>>, ApiError> {
    let view = run_blocking(&state, move |service| {
        service.model_testsets(query.package.as_deref(), query.model.as_deref())
    })
    .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// Creates a unit or composition model.
///
/// `POST create-model`
///
/// The body is taken as raw JSON so that a malformed submission is reported
/// in-band like every other model failure.
pub async fn create_model(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreateModelResponse>, ApiError> {
    info!("received model creation request");
    let Json(body) = body.map_err(ApiError::in_band)?;
    let response = run_blocking(&state, move |service| service.create_model(body)).await?;
    Ok(Json(response))
}

/// Renders the workflow of a package.
///
/// `POST display-model`
pub async fn display_model(
    State(state): State<AppState>,
    body: Result<Json<PathRequest>, JsonRejection>,
) -> Result<Json<DisplayModelResponse>, ApiError> {
    info!("received display model request");
    let Json(req) = body.map_err(ApiError::in_band)?;
    let response = run_blocking(&state, move |service| service.display_model(req.path())).await?;
    Ok(Json(response))
}
