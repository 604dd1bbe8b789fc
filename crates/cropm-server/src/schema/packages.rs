//! Package listing, creation, import and download.

use serde::{Deserialize, Serialize};

/// Query of `GET get-models`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageQuery {
    pub package: Option<String>,
}

/// Response of `GET get-packages`.
#[derive(Debug, Clone, Serialize)]
pub struct PackageListResponse {
    /// Package directories, joined onto the configured root.
    pub packages: Vec<String>,
}

/// Response of `GET get-models`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelListResponse {
    pub success: bool,
    /// Model file names, e.g. `unit.Phenology.xml`.
    pub models: Vec<String>,
}

/// Request body for `POST create-package`.
///
/// The three required fields are optional here so that every missing one
/// can be reported at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageRequest {
    pub project_name: Option<String>,
    pub package_name: Option<String>,
    pub description: Option<String>,
    /// Absent or null means empty.
    pub authors: Option<String>,
    pub license: Option<String>,
}

/// Request body for `POST import-package`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPackageRequest {
    /// Base64 data URI of a zip archive.
    pub package: Option<String>,
}

/// Response of `POST download-package`.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadPackageResponse {
    pub success: bool,
    pub package_name: String,
    /// `data:application/zip;base64,...`
    pub download: String,
    pub filename: String,
    pub message: String,
}
