//! Model kinds, model file naming, and the typed schema of a parsed model.
//!
//! [`ModelDescription`] is what a toolkit backend returns after parsing a
//! package. Optional XML attributes are resolved once, at parse time, into
//! explicit `Option`s and defaulted strings; nothing downstream probes for
//! fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Subdirectory of a package holding the model XML files.
pub const MODEL_DIR: &str = "crop2ml";

/// The two kinds of Crop2ML model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Unit,
    Composition,
}

impl ModelKind {
    /// Lower-case name, also the file name prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Unit => "unit",
            ModelKind::Composition => "composition",
        }
    }

    /// Capitalized name for user-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            ModelKind::Unit => "Unit",
            ModelKind::Composition => "Composition",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = CoreError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unit" => Ok(ModelKind::Unit),
            "composition" => Ok(ModelKind::Composition),
            _ => Err(CoreError::UnknownModelType {
                name: s.to_lowercase(),
            }),
        }
    }
}

/// A model file name of the form `<kind>.<name>[...].xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFileName {
    pub kind: ModelKind,
    /// Second dot-separated segment of the file name.
    pub name: String,
}

impl ModelFileName {
    /// Parses a file name, returning `None` for anything that is not a model
    /// file (wrong extension or unknown kind prefix).
    pub fn parse(file_name: &str) -> Option<Self> {
        let segments: Vec<&str> = file_name.split('.').collect();
        if segments.len() < 2 || segments[segments.len() - 1] != "xml" {
            return None;
        }
        let kind = match segments[0] {
            "unit" => ModelKind::Unit,
            "composition" => ModelKind::Composition,
            _ => return None,
        };
        Some(ModelFileName {
            kind,
            name: segments[1].to_string(),
        })
    }

    /// The canonical file name for a model.
    pub fn file_name(&self) -> String {
        format!("{}.{}.xml", self.kind, self.name)
    }
}

/// Header fields in the naming the legacy XML writer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterHeader {
    /// Directory the model file is written into (`<package>/crop2ml`).
    pub package_name: String,
    pub model_type: String,
    pub model_name: String,
    #[serde(rename = "modelID")]
    pub model_id: String,
    pub version: String,
    pub timestep: String,
    pub title: String,
    pub authors: String,
    pub institution: String,
    pub reference: String,
    pub description: String,
}

/// A model as parsed from a package by the external library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDescription {
    pub name: String,
    /// Fully qualified id, `<Model ID>.<name>`.
    pub modelid: String,
    pub version: String,
    pub timestep: String,
    pub description: DescriptionBlock,
    pub inputs: Vec<ModelVariable>,
    pub outputs: Vec<ModelVariable>,
    pub functions: Vec<ModelFunction>,
    pub parametersets: Vec<ParameterSetRecord>,
    pub testsets: Vec<TestSetRecord>,
}

/// The `<Description>` block of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionBlock {
    pub title: String,
    pub authors: String,
    pub institution: String,
    pub reference: String,
    pub extended_description: String,
}

/// An input or output variable.
///
/// `category` holds the variable category, or the parameter category for
/// parameters. The optional fields are `None` when the XML leaves them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelVariable {
    pub name: String,
    pub description: String,
    pub inputtype: String,
    pub category: String,
    pub datatype: String,
    pub unit: String,
    pub len: Option<String>,
    pub default: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub uri: Option<String>,
}

/// An algorithm or auxiliary function attached to a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFunction {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A named parameter value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSetRecord {
    pub name: String,
    pub description: String,
    pub params: Vec<NamedValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSetRecord {
    pub name: String,
    pub description: String,
    pub parameterset: String,
    pub tests: Vec<TestRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRecord {
    pub name: String,
    pub inputs: Vec<NamedValue>,
    pub outputs: Vec<ExpectedOutput>,
}

/// An expected output value with an optional comparison precision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedOutput {
    pub name: String,
    pub value: String,
    pub precision: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_is_case_insensitive() {
        assert_eq!("Unit".parse::<ModelKind>().unwrap(), ModelKind::Unit);
        assert_eq!(
            "COMPOSITION".parse::<ModelKind>().unwrap(),
            ModelKind::Composition
        );
        let err = "Crop".parse::<ModelKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown model type: crop");
    }

    #[test]
    fn parses_model_file_names() {
        let unit = ModelFileName::parse("unit.Phenology.xml").unwrap();
        assert_eq!(unit.kind, ModelKind::Unit);
        assert_eq!(unit.name, "Phenology");
        assert_eq!(unit.file_name(), "unit.Phenology.xml");

        let comp = ModelFileName::parse("composition.Wheat.xml").unwrap();
        assert_eq!(comp.kind, ModelKind::Composition);

        assert!(ModelFileName::parse("unit.Phenology.txt").is_none());
        assert!(ModelFileName::parse("Phenology.xml").is_none());
        assert!(ModelFileName::parse("notes").is_none());
    }

    #[test]
    fn description_defaults_missing_fields() {
        let parsed: ModelDescription =
            serde_json::from_str(r#"{"name": "Leaf", "inputs": [{"name": "lai"}]}"#).unwrap();
        assert_eq!(parsed.name, "Leaf");
        assert_eq!(parsed.inputs[0].name, "lai");
        assert_eq!(parsed.inputs[0].unit, "");
        assert!(parsed.inputs[0].min.is_none());
        assert!(parsed.testsets.is_empty());
    }

    #[test]
    fn writer_header_uses_legacy_names() {
        let header = WriterHeader {
            package_name: "p/crop2ml".into(),
            model_type: "unit".into(),
            model_name: "Leaf".into(),
            model_id: "Wheat".into(),
            version: "1.0".into(),
            timestep: "1".into(),
            title: "t".into(),
            authors: "a".into(),
            institution: "i".into(),
            reference: "r".into(),
            description: "d".into(),
        };
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["packageName"], "p/crop2ml");
        assert_eq!(json["modelID"], "Wheat");
        assert_eq!(json["modelName"], "Leaf");
    }
}
