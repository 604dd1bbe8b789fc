//! [`ModelToolkit`] backed by pycropml running in a Python subprocess.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use cropm_core::adapt::{CompositionModelDraft, UnitModelDraft};
use cropm_core::{ModelDescription, TranspileTarget};

use crate::bridge::{PythonBridge, PARSE_SCRIPT, TOPOLOGY_SCRIPT, TRANSPILE_SCRIPT, WRITE_SCRIPT};
use crate::error::ToolkitError;
use crate::traits::{ModelToolkit, RenderedImage};

/// Python module exposing `writeunitXML` and `writecompositionXML`.
pub const DEFAULT_WRITER_MODULE: &str = "cropmstudio.crop2ml_utils";

pub struct PycropmlToolkit {
    bridge: PythonBridge,
    writer_module: String,
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
enum BridgeImage {
    Bytes(String),
    Text(String),
}

impl PycropmlToolkit {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        PycropmlToolkit {
            bridge: PythonBridge::new(python),
            writer_module: DEFAULT_WRITER_MODULE.to_string(),
        }
    }

    pub fn with_writer_module(mut self, module: impl Into<String>) -> Self {
        self.writer_module = module.into();
        self
    }

    pub fn bridge(&self) -> &PythonBridge {
        &self.bridge
    }
}

impl ModelToolkit for PycropmlToolkit {
    fn parse_models(&self, package: &Path) -> Result<Vec<ModelDescription>, ToolkitError> {
        self.bridge.run(
            "parse",
            PARSE_SCRIPT,
            &json!({ "package": package.display().to_string() }),
        )
    }

    fn write_unit_model(&mut self, draft: &UnitModelDraft) -> Result<(), ToolkitError> {
        self.bridge.run::<_, ()>(
            "write unit model",
            WRITE_SCRIPT,
            &json!({ "writer_module": self.writer_module, "kind": "unit", "draft": draft }),
        )?;
        info!(model = %draft.datas.model_name, "unit model written");
        Ok(())
    }

    fn write_composition_model(
        &mut self,
        draft: &CompositionModelDraft,
    ) -> Result<(), ToolkitError> {
        self.bridge.run::<_, ()>(
            "write composition model",
            WRITE_SCRIPT,
            &json!({ "writer_module": self.writer_module, "kind": "composition", "draft": draft }),
        )?;
        info!(model = %draft.datas.model_name, "composition model written");
        Ok(())
    }

    fn transpile_package(
        &mut self,
        package: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError> {
        self.bridge.run(
            "transpile",
            TRANSPILE_SCRIPT,
            &json!({
                "mode": "package",
                "package": package.display().to_string(),
                "target": target.code(),
            }),
        )
    }

    fn transpile_component(
        &mut self,
        package: &Path,
        output: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError> {
        self.bridge.run(
            "transpile",
            TRANSPILE_SCRIPT,
            &json!({
                "mode": "component",
                "package": package.display().to_string(),
                "output": output.display().to_string(),
                "target": target.code(),
            }),
        )
    }

    fn render_topology(
        &self,
        package_name: &str,
        package: &Path,
    ) -> Result<RenderedImage, ToolkitError> {
        let image: BridgeImage = self.bridge.run(
            "topology",
            TOPOLOGY_SCRIPT,
            &json!({ "name": package_name, "package": package.display().to_string() }),
        )?;
        match image {
            BridgeImage::Text(svg) => Ok(RenderedImage::Text(svg)),
            BridgeImage::Bytes(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| ToolkitError::failed("topology", e.to_string()))?;
                Ok(RenderedImage::Bytes(bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_errors_surface_per_operation() {
        let toolkit = PycropmlToolkit::new("/nonexistent/python-for-cropm-tests");
        let err = toolkit
            .parse_models(Path::new("packages/wheat"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[test]
    fn image_payload_is_tagged() {
        let text: BridgeImage =
            serde_json::from_value(json!({ "kind": "text", "data": "<svg/>" })).unwrap();
        assert!(matches!(text, BridgeImage::Text(ref s) if s == "<svg/>"));
        let bytes: BridgeImage =
            serde_json::from_value(json!({ "kind": "bytes", "data": "AAE=" })).unwrap();
        assert!(matches!(bytes, BridgeImage::Bytes(_)));
    }
}
