//! Parsed models back to form-shaped JSON.
//!
//! The mirror image of [`crate::adapt`]: these views feed the studio's edit
//! forms when an existing model is opened.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{ModelDescription, ModelKind, ModelVariable};

/// Type label for a variable listed as both input and output.
pub const INPUT_AND_OUTPUT: &str = "input & output";

/// The model header as shown in the header form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Model type")]
    pub model_type: ModelKind,
    /// Original name, used by the client to detect renames.
    #[serde(rename = "Old name")]
    pub old_name: String,
    #[serde(rename = "Model name")]
    pub model_name: String,
    #[serde(rename = "Model ID")]
    pub model_id: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Timestep")]
    pub timestep: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Institution")]
    pub institution: String,
    #[serde(rename = "Reference")]
    pub reference: String,
    #[serde(rename = "ExtendedDescription")]
    pub extended_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableView {
    #[serde(rename = "Type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub input_type: String,
    pub category: String,
    pub data_type: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionView {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputsOutputsView {
    #[serde(rename = "Inputs")]
    pub inputs: Vec<VariableView>,
    #[serde(rename = "Functions")]
    pub functions: Vec<FunctionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSetView {
    pub name: String,
    pub description: String,
    pub parameters: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSetsView {
    pub parametersets: Vec<ParameterSetView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedOutputView {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestView {
    pub name: String,
    pub inputs: IndexMap<String, String>,
    pub outputs: IndexMap<String, ExpectedOutputView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSetView {
    pub name: String,
    pub description: String,
    pub parameterset: String,
    pub tests: Vec<TestView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSetsView {
    pub testsets: Vec<TestSetView>,
}

/// Strips the trailing `.<name>` from a fully qualified model id.
fn short_model_id(modelid: &str) -> String {
    match modelid.rfind('.') {
        Some(idx) => modelid[..idx].to_string(),
        None => String::new(),
    }
}

pub fn header_view(package: &str, kind: ModelKind, model: &ModelDescription) -> HeaderView {
    HeaderView {
        path: package.to_string(),
        model_type: kind,
        old_name: model.name.clone(),
        model_name: model.name.clone(),
        model_id: short_model_id(&model.modelid),
        version: model.version.clone(),
        timestep: model.timestep.clone(),
        title: model.description.title.clone(),
        authors: model.description.authors.clone(),
        institution: model.description.institution.clone(),
        reference: model.description.reference.clone(),
        extended_description: model.description.extended_description.clone(),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn variable_view(kind: &str, var: &ModelVariable) -> VariableView {
    VariableView {
        kind: kind.to_string(),
        name: var.name.clone(),
        description: var.description.clone(),
        input_type: var.inputtype.clone(),
        category: var.category.clone(),
        data_type: var.datatype.clone(),
        unit: var.unit.clone(),
        len: non_empty(&var.len),
        default: non_empty(&var.default),
        min: non_empty(&var.min),
        max: non_empty(&var.max),
        uri: non_empty(&var.uri),
    }
}

/// Merges inputs and outputs into one listing.
///
/// Inputs come first in declaration order. An output whose name is already
/// listed only changes that entry's type to [`INPUT_AND_OUTPUT`].
pub fn inputs_outputs_view(model: &ModelDescription) -> InputsOutputsView {
    let mut variables: IndexMap<String, VariableView> = IndexMap::new();

    for input in &model.inputs {
        variables.insert(input.name.clone(), variable_view("input", input));
    }
    for output in &model.outputs {
        match variables.get_mut(&output.name) {
            Some(existing) => existing.kind = INPUT_AND_OUTPUT.to_string(),
            None => {
                variables.insert(output.name.clone(), variable_view("output", output));
            }
        }
    }

    let functions = model
        .functions
        .iter()
        .map(|f| FunctionView {
            file: f.filename.rsplit('/').next().unwrap_or_default().to_string(),
            kind: f.kind.clone(),
        })
        .collect();

    InputsOutputsView {
        inputs: variables.into_values().collect(),
        functions,
    }
}

pub fn parametersets_view(model: &ModelDescription) -> ParameterSetsView {
    let parametersets = model
        .parametersets
        .iter()
        .map(|set| ParameterSetView {
            name: set.name.clone(),
            description: set.description.clone(),
            parameters: set
                .params
                .iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect(),
        })
        .collect();
    ParameterSetsView { parametersets }
}

pub fn testsets_view(model: &ModelDescription) -> TestSetsView {
    let testsets = model
        .testsets
        .iter()
        .map(|set| TestSetView {
            name: set.name.clone(),
            description: set.description.clone(),
            parameterset: set.parameterset.clone(),
            tests: set
                .tests
                .iter()
                .map(|test| TestView {
                    name: test.name.clone(),
                    inputs: test
                        .inputs
                        .iter()
                        .map(|i| (i.name.clone(), i.value.clone()))
                        .collect(),
                    outputs: test
                        .outputs
                        .iter()
                        .map(|o| {
                            (
                                o.name.clone(),
                                ExpectedOutputView {
                                    value: o.value.clone(),
                                    precision: non_empty(&o.precision),
                                },
                            )
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    TestSetsView { testsets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DescriptionBlock, ExpectedOutput, ModelFunction, NamedValue, TestRecord, TestSetRecord,
    };
    use serde_json::json;

    fn var(name: &str) -> ModelVariable {
        ModelVariable {
            name: name.to_string(),
            description: format!("{name} description"),
            inputtype: "variable".into(),
            category: "state".into(),
            datatype: "DOUBLE".into(),
            unit: "g".into(),
            ..Default::default()
        }
    }

    #[test]
    fn shared_variable_is_listed_once() {
        let model = ModelDescription {
            inputs: vec![var("lai"), var("tmax")],
            outputs: vec![var("lai"), var("biomass")],
            ..Default::default()
        };
        let view = inputs_outputs_view(&model);
        let names: Vec<(&str, &str)> = view
            .inputs
            .iter()
            .map(|v| (v.name.as_str(), v.kind.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("lai", INPUT_AND_OUTPUT),
                ("tmax", "input"),
                ("biomass", "output")
            ]
        );
    }

    #[test]
    fn optional_fields_only_when_present() {
        let mut v = var("tmax");
        v.min = Some("-40".into());
        v.max = Some(String::new());
        let model = ModelDescription {
            inputs: vec![v],
            ..Default::default()
        };
        let json = serde_json::to_value(inputs_outputs_view(&model)).unwrap();
        let row = &json["Inputs"][0];
        assert_eq!(row["Min"], "-40");
        assert!(row.get("Max").is_none());
        assert!(row.get("Uri").is_none());
        assert_eq!(row["InputType"], "variable");
    }

    #[test]
    fn function_files_are_basenames() {
        let model = ModelDescription {
            functions: vec![ModelFunction {
                filename: "algo/pyx/phenology.pyx".into(),
                kind: "compute".into(),
            }],
            ..Default::default()
        };
        let view = inputs_outputs_view(&model);
        assert_eq!(view.functions[0].file, "phenology.pyx");
        assert_eq!(view.functions[0].kind, "compute");
    }

    #[test]
    fn header_drops_name_from_model_id() {
        let model = ModelDescription {
            name: "Phenology".into(),
            modelid: "SQ.Wheat.Phenology".into(),
            version: "1.0".into(),
            description: DescriptionBlock {
                title: "Pheno".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let view = header_view("packages/wheat", ModelKind::Unit, &model);
        assert_eq!(view.model_id, "SQ.Wheat");
        assert_eq!(view.old_name, "Phenology");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["Model type"], "unit");
        assert_eq!(json["Path"], "packages/wheat");
        assert_eq!(json["Title"], "Pheno");
    }

    #[test]
    fn testsets_keep_precision_only_when_set() {
        let model = ModelDescription {
            testsets: vec![TestSetRecord {
                name: "check".into(),
                description: "d".into(),
                parameterset: "default".into(),
                tests: vec![TestRecord {
                    name: "t1".into(),
                    inputs: vec![NamedValue {
                        name: "tmax".into(),
                        value: "25".into(),
                    }],
                    outputs: vec![
                        ExpectedOutput {
                            name: "lai".into(),
                            value: "1.2".into(),
                            precision: Some("2".into()),
                        },
                        ExpectedOutput {
                            name: "dvs".into(),
                            value: "0.5".into(),
                            precision: None,
                        },
                    ],
                }],
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(testsets_view(&model)).unwrap();
        assert_eq!(
            json["testsets"][0]["tests"][0]["outputs"],
            json!({ "lai": { "value": "1.2", "precision": "2" }, "dvs": { "value": "0.5" } })
        );
        assert_eq!(json["testsets"][0]["parameterset"], "default");
    }
}
