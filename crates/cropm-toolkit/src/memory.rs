//! In-memory implementation of [`ModelToolkit`] and [`PackageTemplater`].
//!
//! [`InMemoryToolkit`] keeps parsed models in a HashMap keyed by package
//! directory instead of round-tripping through XML. Writes still create the
//! model file on disk (with a minimal body) so that filesystem listings see
//! it. Transpiler failures and templating failures can be injected per test.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use cropm_core::adapt::{CompositionModelDraft, InputsOutputsTable, UnitModelDraft};
use cropm_core::form::{value_text, VariableColumn};
use cropm_core::model::{
    DescriptionBlock, ExpectedOutput, ModelFunction, ModelVariable, NamedValue,
    ParameterSetRecord, TestRecord, TestSetRecord, WriterHeader, MODEL_DIR,
};
use cropm_core::{ModelDescription, ModelFileName, ModelKind, TranspileTarget};

use crate::error::ToolkitError;
use crate::traits::{ModelToolkit, PackageTemplater, RenderedImage, TemplateContext};

const PLACEHOLDER_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;

#[derive(Debug, Clone)]
pub struct InMemoryToolkit {
    models: HashMap<PathBuf, Vec<ModelDescription>>,
    failing_targets: HashSet<TranspileTarget>,
    image: RenderedImage,
    fail_templates: bool,
}

impl Default for InMemoryToolkit {
    fn default() -> Self {
        InMemoryToolkit {
            models: HashMap::new(),
            failing_targets: HashSet::new(),
            image: RenderedImage::Text(PLACEHOLDER_SVG.to_string()),
            fail_templates: false,
        }
    }
}

impl InMemoryToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a model as if it had been parsed from `package`.
    pub fn with_model(mut self, package: impl Into<PathBuf>, model: ModelDescription) -> Self {
        self.store(package.into(), model);
        self
    }

    /// Makes every transpilation to `target` fail.
    pub fn failing_target(mut self, target: TranspileTarget) -> Self {
        self.failing_targets.insert(target);
        self
    }

    pub fn with_image(mut self, image: RenderedImage) -> Self {
        self.image = image;
        self
    }

    /// Makes every templating call fail.
    pub fn failing_templates(mut self) -> Self {
        self.fail_templates = true;
        self
    }

    fn store(&mut self, package: PathBuf, model: ModelDescription) {
        let models = self.models.entry(package).or_default();
        models.retain(|m| m.name != model.name);
        models.push(model);
    }

    /// Writes the model file and records the description under its package.
    fn persist(
        &mut self,
        kind: ModelKind,
        header: &WriterHeader,
        model: ModelDescription,
    ) -> Result<(), ToolkitError> {
        let model_dir = Path::new(&header.package_name);
        fs::create_dir_all(model_dir)?;
        let file = ModelFileName {
            kind,
            name: header.model_name.clone(),
        };
        fs::write(
            model_dir.join(file.file_name()),
            format!("<Model name=\"{}\"/>\n", header.model_name),
        )?;

        let package = model_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| model_dir.to_path_buf());
        self.store(package, model);
        Ok(())
    }

    fn transpile(&self, package: &Path, target: TranspileTarget) -> Result<(), ToolkitError> {
        if self.failing_targets.contains(&target) {
            return Err(ToolkitError::failed(
                "transpile",
                format!("no generator available for {target}"),
            ));
        }
        fs::create_dir_all(package.join("src").join(target.code()))?;
        Ok(())
    }
}

fn header_description(header: &WriterHeader) -> ModelDescription {
    ModelDescription {
        name: header.model_name.clone(),
        modelid: format!("{}.{}", header.model_id, header.model_name),
        version: header.version.clone(),
        timestep: header.timestep.clone(),
        description: DescriptionBlock {
            title: header.title.clone(),
            authors: header.authors.clone(),
            institution: header.institution.clone(),
            reference: header.reference.clone(),
            extended_description: header.description.clone(),
        },
        ..Default::default()
    }
}

fn cell(table: &InputsOutputsTable, column: VariableColumn, row: usize) -> String {
    table
        .column(column)
        .get(row)
        .map(value_text)
        .unwrap_or_default()
}

fn optional_cell(table: &InputsOutputsTable, column: VariableColumn, row: usize) -> Option<String> {
    Some(cell(table, column, row)).filter(|v| !v.is_empty())
}

fn variables(table: &InputsOutputsTable) -> (Vec<ModelVariable>, Vec<ModelVariable>) {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for row in 0..table.len() {
        let var = ModelVariable {
            name: cell(table, VariableColumn::Name, row),
            description: cell(table, VariableColumn::Description, row),
            inputtype: cell(table, VariableColumn::InputType, row),
            category: cell(table, VariableColumn::Category, row),
            datatype: cell(table, VariableColumn::DataType, row),
            unit: cell(table, VariableColumn::Unit, row),
            len: optional_cell(table, VariableColumn::Len, row),
            default: optional_cell(table, VariableColumn::Default, row),
            min: optional_cell(table, VariableColumn::Min, row),
            max: optional_cell(table, VariableColumn::Max, row),
            uri: optional_cell(table, VariableColumn::Uri, row),
        };
        let kind = cell(table, VariableColumn::Type, row);
        if kind.contains("output") {
            outputs.push(var.clone());
        }
        if kind.contains("input") || !kind.contains("output") {
            inputs.push(var);
        }
    }
    (inputs, outputs)
}

fn function(value: &Value) -> ModelFunction {
    let field = |key: &str| value.get(key).map(value_text).unwrap_or_default();
    ModelFunction {
        filename: field("file"),
        kind: field("type"),
    }
}

fn unit_description(draft: &UnitModelDraft) -> ModelDescription {
    let (inputs, outputs) = variables(&draft.df);
    let parametersets = draft
        .paramsetdict
        .iter()
        .map(|(name, entry)| ParameterSetRecord {
            name: name.clone(),
            description: entry.1.clone(),
            params: entry
                .0
                .iter()
                .map(|(k, v)| NamedValue {
                    name: k.clone(),
                    value: value_text(v),
                })
                .collect(),
        })
        .collect();
    let testsets = draft
        .testsetdict
        .iter()
        .map(|(name, entry)| TestSetRecord {
            name: name.clone(),
            description: entry.1.clone(),
            parameterset: entry.2.clone(),
            tests: entry
                .0
                .iter()
                .map(|(test_name, case)| TestRecord {
                    name: test_name.clone(),
                    inputs: case
                        .inputs
                        .iter()
                        .map(|(k, v)| NamedValue {
                            name: k.clone(),
                            value: value_text(v),
                        })
                        .collect(),
                    outputs: case
                        .outputs
                        .iter()
                        .map(|(k, (value, precision))| ExpectedOutput {
                            name: k.clone(),
                            value: value_text(value),
                            precision: Some(value_text(precision)).filter(|p| !p.is_empty()),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    ModelDescription {
        inputs,
        outputs,
        functions: draft.df.functions.iter().map(function).collect(),
        parametersets,
        testsets,
        ..header_description(&draft.datas)
    }
}

impl ModelToolkit for InMemoryToolkit {
    fn parse_models(&self, package: &Path) -> Result<Vec<ModelDescription>, ToolkitError> {
        Ok(self.models.get(package).cloned().unwrap_or_default())
    }

    fn write_unit_model(&mut self, draft: &UnitModelDraft) -> Result<(), ToolkitError> {
        let model = unit_description(draft);
        self.persist(ModelKind::Unit, &draft.datas, model)
    }

    fn write_composition_model(
        &mut self,
        draft: &CompositionModelDraft,
    ) -> Result<(), ToolkitError> {
        let model = header_description(&draft.datas);
        self.persist(ModelKind::Composition, &draft.datas, model)
    }

    fn transpile_package(
        &mut self,
        package: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError> {
        self.transpile(package, target)
    }

    fn transpile_component(
        &mut self,
        package: &Path,
        output: &Path,
        target: TranspileTarget,
    ) -> Result<(), ToolkitError> {
        if !package.is_dir() {
            return Err(ToolkitError::failed(
                "transpile",
                format!("no component found in {}", package.display()),
            ));
        }
        self.transpile(output, target)
    }

    fn render_topology(
        &self,
        _package_name: &str,
        package: &Path,
    ) -> Result<RenderedImage, ToolkitError> {
        if !package.join(MODEL_DIR).is_dir() {
            return Err(ToolkitError::failed(
                "topology",
                format!("{} is not a package", package.display()),
            ));
        }
        Ok(self.image.clone())
    }
}

impl PackageTemplater for InMemoryToolkit {
    fn create_package(
        &mut self,
        output_dir: &Path,
        context: &TemplateContext,
    ) -> Result<(), ToolkitError> {
        if self.fail_templates {
            return Err(ToolkitError::failed(
                "create package",
                "template repository unreachable",
            ));
        }
        let package = output_dir.join(&context.repo_name);
        fs::create_dir_all(package.join(MODEL_DIR))?;
        fs::write(
            package.join("README.md"),
            format!("# {}\n\n{}\n", context.project_name, context.description),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropm_core::adapt::adapt_unit_model_complete;
    use cropm_core::form::InputsOutputsForm;
    use serde_json::json;

    fn header(path: &Path) -> serde_json::Map<String, Value> {
        json!({
            "Path": path.join(MODEL_DIR).display().to_string(),
            "Model type": "unit",
            "Model name": "Phenology",
            "Model ID": "Wheat",
            "Version": "1.0",
            "Timestep": "1",
            "Title": "Phenology",
            "Authors": "A",
            "Institution": "I",
            "Reference": "R",
            "ExtendedDescription": "E"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn written_unit_model_is_parsed_back() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("wheat");
        let form: InputsOutputsForm = serde_json::from_value(json!({
            "Inputs": [
                { "Name": "tmax", "Type": "input" },
                { "Name": "lai", "Type": "input & output", "Min": 0 },
                { "Name": "biomass", "Type": "output" }
            ]
        }))
        .unwrap();
        let draft = adapt_unit_model_complete(&header(&pkg), &form, None, None).unwrap();

        let mut toolkit = InMemoryToolkit::new();
        toolkit.write_unit_model(&draft).unwrap();

        assert!(pkg.join(MODEL_DIR).join("unit.Phenology.xml").is_file());
        let model = toolkit.find_model(&pkg, "Phenology").unwrap();
        assert_eq!(model.modelid, "Wheat.Phenology");
        let inputs: Vec<&str> = model.inputs.iter().map(|v| v.name.as_str()).collect();
        let outputs: Vec<&str> = model.outputs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(inputs, vec!["tmax", "lai"]);
        assert_eq!(outputs, vec!["lai", "biomass"]);
        assert_eq!(model.inputs[1].min.as_deref(), Some("0"));
    }

    #[test]
    fn unknown_model_is_not_found() {
        let toolkit = InMemoryToolkit::new();
        let err = toolkit
            .find_model(Path::new("packages/none"), "Ghost")
            .unwrap_err();
        assert!(matches!(err, ToolkitError::ModelNotFound { .. }));
    }

    #[test]
    fn injected_target_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut toolkit = InMemoryToolkit::new().failing_target(TranspileTarget::R);
        assert!(toolkit
            .transpile_package(dir.path(), TranspileTarget::Java)
            .is_ok());
        assert!(dir.path().join("src").join("java").is_dir());
        assert!(toolkit
            .transpile_package(dir.path(), TranspileTarget::R)
            .is_err());
    }

    #[test]
    fn templater_creates_package_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let mut toolkit = InMemoryToolkit::new();
        let context = TemplateContext {
            project_name: "Wheat".into(),
            repo_name: "wheat".into(),
            ..Default::default()
        };
        toolkit.create_package(dir.path(), &context).unwrap();
        assert!(dir.path().join("wheat").join(MODEL_DIR).is_dir());

        let mut failing = InMemoryToolkit::new().failing_templates();
        assert!(failing.create_package(dir.path(), &context).is_err());
    }
}
