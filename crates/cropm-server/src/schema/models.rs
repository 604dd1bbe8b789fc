//! Model creation and display.

use serde::Serialize;

use cropm_core::ModelKind;

/// Response of `POST create-model`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateModelResponse {
    pub success: bool,
    pub message: String,
    pub model_name: String,
    pub model_type: ModelKind,
}

/// Response of `POST display-model`.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayModelResponse {
    pub success: bool,
    pub package_name: String,
    /// `data:image/svg+xml;base64,...`
    pub image: String,
    /// `"binary"` or `"svg"`, depending on what the renderer returned.
    pub image_type: &'static str,
    pub message: String,
}
