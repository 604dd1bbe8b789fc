//! Form JSON to legacy XML-writer argument shapes.
//!
//! The writer takes a unit model as four arguments (header, column-oriented
//! variable table, parameter sets, test sets) and a composition model as
//! three (header, model references, links). The drafts here are those
//! argument tuples with names.
//!
//! All adapters are total over well-formed form JSON. The only failure is a
//! required header field that is absent altogether.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::form::{
    value_text, CompositionLinksForm, CompositionModelsForm, InputsOutputsForm,
    ParameterSetsForm, TestSetsForm, VariableColumn,
};
use crate::model::WriterHeader;

/// Form keys of the model header, all required.
pub const HEADER_FIELDS: [&str; 11] = [
    "Path",
    "Model type",
    "Model name",
    "Model ID",
    "Version",
    "Timestep",
    "Title",
    "Authors",
    "Institution",
    "Reference",
    "ExtendedDescription",
];

/// Column-oriented variable table plus the function list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputsOutputsTable {
    #[serde(rename = "Inputs")]
    pub columns: IndexMap<String, Vec<Value>>,
    #[serde(rename = "Functions")]
    pub functions: Vec<Value>,
    pub init: bool,
}

impl InputsOutputsTable {
    pub fn column(&self, column: VariableColumn) -> &[Value] {
        self.columns
            .get(column.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of variable rows.
    pub fn len(&self) -> usize {
        self.column(VariableColumn::Name).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `[parameters, description]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSetEntry(pub Map<String, Value>, pub String);

/// `[tests, description, parameterset]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSetEntry(pub IndexMap<String, TestCase>, pub String, pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub inputs: Map<String, Value>,
    /// `name -> [value, precision]`.
    pub outputs: IndexMap<String, (Value, Value)>,
}

/// Arguments for the unit model writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitModelDraft {
    pub datas: WriterHeader,
    pub df: InputsOutputsTable,
    pub paramsetdict: IndexMap<String, ParameterSetEntry>,
    pub testsetdict: IndexMap<String, TestSetEntry>,
}

/// Arguments for the composition model writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionModelDraft {
    pub datas: WriterHeader,
    pub listmodel: Vec<Value>,
    pub listlink: Vec<Value>,
}

/// Renames the form header into writer field names.
///
/// Every key in [`HEADER_FIELDS`] must be present; there is no defaulting.
pub fn adapt_header_data(header: &Map<String, Value>) -> Result<WriterHeader, CoreError> {
    let field = |key: &str| -> Result<String, CoreError> {
        header
            .get(key)
            .map(value_text)
            .ok_or_else(|| CoreError::MissingField {
                field: key.to_string(),
            })
    };

    Ok(WriterHeader {
        package_name: field("Path")?,
        model_type: field("Model type")?,
        model_name: field("Model name")?,
        model_id: field("Model ID")?,
        version: field("Version")?,
        timestep: field("Timestep")?,
        title: field("Title")?,
        authors: field("Authors")?,
        institution: field("Institution")?,
        reference: field("Reference")?,
        description: field("ExtendedDescription")?,
    })
}

/// Converts the row-oriented variable table into one column per field.
///
/// Columns appear in [`VariableColumn::ALL`] order and every column has one
/// entry per input row; absent fields become `""`.
pub fn adapt_inputs_outputs(form: &InputsOutputsForm) -> InputsOutputsTable {
    let mut columns: IndexMap<String, Vec<Value>> = VariableColumn::ALL
        .iter()
        .map(|c| (c.key().to_string(), Vec::with_capacity(form.inputs.len())))
        .collect();

    for row in &form.inputs {
        for column in VariableColumn::ALL {
            let value = row
                .get(column)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            if let Some(cells) = columns.get_mut(column.key()) {
                cells.push(value);
            }
        }
    }

    InputsOutputsTable {
        columns,
        functions: form.functions.clone(),
        init: form.init,
    }
}

/// `name -> [parameters, description]` for each parameter set.
pub fn adapt_parametersets(form: &ParameterSetsForm) -> IndexMap<String, ParameterSetEntry> {
    form.parametersets
        .iter()
        .map(|set| {
            (
                set.name.clone(),
                ParameterSetEntry(set.parameters.clone(), set.description.clone()),
            )
        })
        .collect()
}

/// `name -> [tests, description, parameterset]` for each test set, with
/// expected outputs flattened from `{value, precision}` to `[value, precision]`.
pub fn adapt_testsets(form: &TestSetsForm) -> IndexMap<String, TestSetEntry> {
    let empty = || Value::String(String::new());

    form.testsets
        .iter()
        .map(|set| {
            let tests = set
                .tests
                .iter()
                .map(|test| {
                    let outputs = test
                        .outputs
                        .iter()
                        .map(|(name, expected)| {
                            let value = expected.value.clone().unwrap_or_else(empty);
                            let precision = expected.precision.clone().unwrap_or_else(empty);
                            (name.clone(), (value, precision))
                        })
                        .collect();
                    (
                        test.name.clone(),
                        TestCase {
                            inputs: test.inputs.clone(),
                            outputs,
                        },
                    )
                })
                .collect();
            (
                set.name.clone(),
                TestSetEntry(tests, set.description.clone(), set.parameterset.clone()),
            )
        })
        .collect()
}

pub fn adapt_composition_models(form: &CompositionModelsForm) -> Vec<Value> {
    form.models.clone()
}

pub fn adapt_composition_links(form: &CompositionLinksForm) -> Vec<Value> {
    form.links.clone()
}

/// Bundles a unit model submission into writer arguments.
pub fn adapt_unit_model_complete(
    header: &Map<String, Value>,
    inputs_outputs: &InputsOutputsForm,
    parametersets: Option<&ParameterSetsForm>,
    testsets: Option<&TestSetsForm>,
) -> Result<UnitModelDraft, CoreError> {
    Ok(UnitModelDraft {
        datas: adapt_header_data(header)?,
        df: adapt_inputs_outputs(inputs_outputs),
        paramsetdict: parametersets.map(adapt_parametersets).unwrap_or_default(),
        testsetdict: testsets.map(adapt_testsets).unwrap_or_default(),
    })
}

/// Bundles a composition model submission into writer arguments.
pub fn adapt_composition_model_complete(
    header: &Map<String, Value>,
    models: &CompositionModelsForm,
    links: &CompositionLinksForm,
) -> Result<CompositionModelDraft, CoreError> {
    Ok(CompositionModelDraft {
        datas: adapt_header_data(header)?,
        listmodel: adapt_composition_models(models),
        listlink: adapt_composition_links(links),
    })
}
