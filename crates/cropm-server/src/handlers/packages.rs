//! Package handlers (list, create, import, download).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::schema::common::{ApiResponse, PathRequest};
use crate::schema::packages::{
    CreatePackageRequest, DownloadPackageResponse, ImportPackageRequest, ModelListResponse,
    PackageListResponse, PackageQuery,
};
use crate::state::AppState;

use super::run_blocking;

/// Lists package directories under the package root.
///
/// `GET get-packages`
pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<PackageListResponse>, ApiError> {
    let service = state.service.lock().await;
    let packages = service.list_packages()?;
    Ok(Json(PackageListResponse { packages }))
}

/// Lists the model files of a package.
///
/// `GET get-models?package=<path>`
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<PackageQuery>,
) -> Result<Json<ModelListResponse>, ApiError> {
    let service = state.service.lock().await;
    let models = service.list_models(query.package.as_deref())?;
    Ok(Json(ModelListResponse {
        success: true,
        models,
    }))
}

/// Creates a package from the project template.
///
/// `POST create-package`
pub async fn create_package(
    State(state): State<AppState>,
    body: Result<Json<CreatePackageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CreatePackageRequest>>, ApiError> {
    info!("received create package request");
    let Json(req) = body?;
    let req = run_blocking(&state, move |service| {
        service.create_package(&req)?;
        Ok(req)
    })
    .await?;
    Ok(Json(ApiResponse::ok(req)))
}

/// Imports a zipped package.
///
/// `POST import-package`
pub async fn import_package(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    info!("received import package request");
    let Json(body) = body?;
    let req: ImportPackageRequest = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    run_blocking(&state, move |service| service.import_package(&req)).await?;
    Ok(Json(ApiResponse::ok(body)))
}

/// Zips a package for download.
///
/// `POST download-package`
pub async fn download_package(
    State(state): State<AppState>,
    body: Result<Json<PathRequest>, JsonRejection>,
) -> Result<Json<DownloadPackageResponse>, ApiError> {
    info!("received download package request");
    let Json(req) = body.map_err(ApiError::in_band)?;
    let response = run_blocking(&state, move |service| service.download_package(req.path())).await?;
    Ok(Json(response))
}
