//! The [`ModelToolkit`] and [`PackageTemplater`] contracts.
//!
//! Parsing, writing, transpiling and topology rendering all live in the
//! external modelling library; the studio only reshapes data around these
//! calls. The traits are synchronous: each request runs to completion on the
//! caller's thread.

use std::path::Path;

use serde::Serialize;

use cropm_core::adapt::{CompositionModelDraft, UnitModelDraft};
use cropm_core::{ModelDescription, TranspileTarget};

use crate::error::ToolkitError;

/// Output of the topology renderer.
///
/// Renderers return either raw bytes or SVG text; callers normalise both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedImage {
    Bytes(Vec<u8>),
    Text(String),
}

impl RenderedImage {
    /// `"binary"` or `"svg"`.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderedImage::Bytes(_) => "binary",
            RenderedImage::Text(_) => "svg",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RenderedImage::Bytes(bytes) => bytes,
            RenderedImage::Text(text) => text.as_bytes(),
        }
    }
}

/// Substitution variables passed to the package template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub project_name: String,
    pub repo_name: String,
    pub author_name: String,
    pub description: String,
    pub open_source_license: String,
}

impl TemplateContext {
    /// `key=value` pairs in template variable order.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("project_name", self.project_name.as_str()),
            ("repo_name", self.repo_name.as_str()),
            ("author_name", self.author_name.as_str()),
            ("description", self.description.as_str()),
            ("open_source_license", self.open_source_license.as_str()),
        ]
    }
}

/// Operations delegated to the external modelling library.
pub trait ModelToolkit: Send {
    /// Parses every model of the package at `package`.
    fn parse_models(&self, package: &Path) -> Result<Vec<ModelDescription>, ToolkitError>;

    /// Parses the package and returns the model called `name`.
    fn find_model(&self, package: &Path, name: &str) -> Result<ModelDescription, ToolkitError> {
        self.parse_models(package)?
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ToolkitError::ModelNotFound {
                name: name.to_string(),
                package: package.display().to_string(),
            })
    }

    /// Writes a new unit model file into `draft.datas.package_name`.
    fn write_unit_model(&mut self, draft: &UnitModelDraft) -> Result<(), ToolkitError>;

    /// Writes a new composition model file into `draft.datas.package_name`.
    fn write_composition_model(&mut self, draft: &CompositionModelDraft)
        -> Result<(), ToolkitError>;

    /// Generates code for `target` from the package's model descriptions.
    fn transpile_package(
        &mut self,
        package: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError>;

    /// Converts a platform component found in `package` back into Crop2ML
    /// descriptions written under `output`.
    fn transpile_component(
        &mut self,
        package: &Path,
        output: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError>;

    /// Renders the package's model workflow.
    fn render_topology(
        &self,
        package_name: &str,
        package: &Path,
    ) -> Result<RenderedImage, ToolkitError>;
}

/// Creates new packages from a project template.
pub trait PackageTemplater: Send {
    /// Instantiates the template under `output_dir`, producing
    /// `output_dir/<repo_name>`.
    fn create_package(
        &mut self,
        output_dir: &Path,
        context: &TemplateContext,
    ) -> Result<(), ToolkitError>;
}
