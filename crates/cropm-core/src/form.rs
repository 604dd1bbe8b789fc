//! Form-shaped JSON submitted by the studio client.
//!
//! Every optional field defaults (empty string, `false`, empty collection) so
//! that deserializing well-formed form JSON never fails on an absent field.
//! Only the model header has required fields, and those are checked by
//! [`crate::adapt::adapt_header_data`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The complete `create-model` request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelSubmission {
    #[serde(rename = "model-header")]
    pub header: Map<String, Value>,
    #[serde(rename = "unit/inputs-outputs")]
    pub inputs_outputs: InputsOutputsForm,
    #[serde(rename = "unit/parametersets")]
    pub parametersets: Option<ParameterSetsForm>,
    #[serde(rename = "unit/testsets")]
    pub testsets: Option<TestSetsForm>,
    #[serde(rename = "composition/models")]
    pub models: CompositionModelsForm,
    #[serde(rename = "composition/links")]
    pub links: CompositionLinksForm,
}

/// The twelve columns of the inputs/outputs table, in writer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableColumn {
    Name,
    Type,
    Description,
    InputType,
    Category,
    DataType,
    Len,
    Default,
    Min,
    Max,
    Unit,
    Uri,
}

impl VariableColumn {
    pub const ALL: [VariableColumn; 12] = [
        VariableColumn::Name,
        VariableColumn::Type,
        VariableColumn::Description,
        VariableColumn::InputType,
        VariableColumn::Category,
        VariableColumn::DataType,
        VariableColumn::Len,
        VariableColumn::Default,
        VariableColumn::Min,
        VariableColumn::Max,
        VariableColumn::Unit,
        VariableColumn::Uri,
    ];

    /// Column key as used in both the form rows and the writer columns.
    pub fn key(self) -> &'static str {
        match self {
            VariableColumn::Name => "Name",
            VariableColumn::Type => "Type",
            VariableColumn::Description => "Description",
            VariableColumn::InputType => "InputType",
            VariableColumn::Category => "Category",
            VariableColumn::DataType => "DataType",
            VariableColumn::Len => "Len",
            VariableColumn::Default => "Default",
            VariableColumn::Min => "Min",
            VariableColumn::Max => "Max",
            VariableColumn::Unit => "Unit",
            VariableColumn::Uri => "Uri",
        }
    }
}

/// One row of the inputs/outputs table.
///
/// Values are kept as raw JSON since the client may send numbers for
/// `Len`, `Default`, `Min` and `Max`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VariableRow {
    pub name: Option<Value>,
    #[serde(rename = "Type")]
    pub kind: Option<Value>,
    pub description: Option<Value>,
    pub input_type: Option<Value>,
    pub category: Option<Value>,
    pub data_type: Option<Value>,
    pub len: Option<Value>,
    pub default: Option<Value>,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub unit: Option<Value>,
    pub uri: Option<Value>,
}

impl VariableRow {
    pub fn get(&self, column: VariableColumn) -> Option<&Value> {
        match column {
            VariableColumn::Name => self.name.as_ref(),
            VariableColumn::Type => self.kind.as_ref(),
            VariableColumn::Description => self.description.as_ref(),
            VariableColumn::InputType => self.input_type.as_ref(),
            VariableColumn::Category => self.category.as_ref(),
            VariableColumn::DataType => self.data_type.as_ref(),
            VariableColumn::Len => self.len.as_ref(),
            VariableColumn::Default => self.default.as_ref(),
            VariableColumn::Min => self.min.as_ref(),
            VariableColumn::Max => self.max.as_ref(),
            VariableColumn::Unit => self.unit.as_ref(),
            VariableColumn::Uri => self.uri.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InputsOutputsForm {
    #[serde(rename = "Inputs")]
    pub inputs: Vec<VariableRow>,
    #[serde(rename = "Functions")]
    pub functions: Vec<Value>,
    pub init: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ParameterSetsForm {
    pub parametersets: Vec<ParameterSetForm>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ParameterSetForm {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TestSetsForm {
    pub testsets: Vec<TestSetForm>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TestSetForm {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub parameterset: String,
    pub tests: Vec<TestForm>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TestForm {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    pub inputs: Map<String, Value>,
    pub outputs: IndexMap<String, OutputForm>,
}

/// An expected output as entered in the form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputForm {
    pub value: Option<Value>,
    pub precision: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositionModelsForm {
    pub models: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositionLinksForm {
    pub links: Vec<Value>,
}

/// Renders a scalar JSON value as text; `null` becomes the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts strings, numbers, booleans and `null` for a text field.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submission_tolerates_missing_sections() {
        let submission: ModelSubmission =
            serde_json::from_value(json!({ "model-header": { "Model type": "unit" } })).unwrap();
        assert!(submission.inputs_outputs.inputs.is_empty());
        assert!(!submission.inputs_outputs.init);
        assert!(submission.parametersets.is_none());
        assert!(submission.models.models.is_empty());
    }

    #[test]
    fn variable_row_reads_columns_by_key() {
        let row: VariableRow = serde_json::from_value(json!({
            "Name": "tmax",
            "Type": "input",
            "InputType": "variable",
            "Min": 0
        }))
        .unwrap();
        assert_eq!(row.get(VariableColumn::Name), Some(&json!("tmax")));
        assert_eq!(row.get(VariableColumn::InputType), Some(&json!("variable")));
        assert_eq!(row.get(VariableColumn::Min), Some(&json!(0)));
        assert_eq!(row.get(VariableColumn::Uri), None);
    }

    #[test]
    fn text_fields_accept_null_and_numbers() {
        let set: ParameterSetForm =
            serde_json::from_value(json!({ "name": 3, "description": null })).unwrap();
        assert_eq!(set.name, "3");
        assert_eq!(set.description, "");
    }

    #[test]
    fn column_keys_follow_writer_order() {
        let keys: Vec<&str> = VariableColumn::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.first(), Some(&"Name"));
        assert_eq!(keys.last(), Some(&"Uri"));
        assert_eq!(keys.len(), 12);
    }
}
