//! Shared request and response shapes.

use serde::{Deserialize, Serialize};

/// Standard `{success, data}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true` for successful responses.
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
        }
    }
}

/// Query string of the model inspection endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelQuery {
    /// Package directory.
    pub package: Option<String>,
    /// Model file name inside `<package>/crop2ml`, e.g. `unit.Phenology.xml`.
    pub model: Option<String>,
}

/// A body holding only a package path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathRequest {
    #[serde(rename = "Path", default)]
    pub path: Option<String>,
}

impl PathRequest {
    /// The path, or `""` when absent or null.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }
}
