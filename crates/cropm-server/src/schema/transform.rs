//! Package transpilation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which way a package is transpiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    /// Crop2ML descriptions to generated code.
    ToPlatform,
    /// A platform component back to Crop2ML descriptions.
    ToCrop2ml,
}

/// Request body for both transform endpoints.
///
/// Checkbox maps are kept as raw JSON: only a literal `true` selects a
/// target, anything else (`false`, `null`, a string) leaves it unselected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformRequest {
    #[serde(rename = "Path", default)]
    pub path: Option<String>,
    /// Checkbox state keyed by UI language name (`Java`, `CSharp`, ...).
    #[serde(rename = "Languages", default)]
    pub languages: Value,
    /// Checkbox state keyed by UI platform name (`Simplace`, `Bioma`, ...).
    #[serde(rename = "Platforms", default)]
    pub platforms: Value,
}

impl TransformRequest {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    pub fn selected_languages(&self) -> HashMap<String, bool> {
        checked(&self.languages)
    }

    pub fn selected_platforms(&self) -> HashMap<String, bool> {
        checked(&self.platforms)
    }
}

fn checked(flags: &Value) -> HashMap<String, bool> {
    flags
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, value)| (name.clone(), value.as_bool() == Some(true)))
                .collect()
        })
        .unwrap_or_default()
}

/// Per-target outcome of a transform request.
///
/// `success` is true only when no target failed; `errors` is omitted then.
#[derive(Debug, Clone, Serialize)]
pub struct TransformResponse {
    pub success: bool,
    /// Codes of the targets that were generated.
    pub successes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub message: String,
}

impl TransformResponse {
    pub fn from_outcome(successes: Vec<String>, errors: Vec<String>) -> Self {
        let done = successes.join(", ");
        if errors.is_empty() {
            let message = if successes.is_empty() {
                "No successful transformations".to_string()
            } else {
                format!("Successfully transpiled to: {done}")
            };
            TransformResponse {
                success: true,
                successes,
                errors: None,
                message,
            }
        } else {
            TransformResponse {
                success: false,
                message: format!(
                    "Completed with errors. Successes: {done}. Errors: {}",
                    errors.len()
                ),
                successes,
                errors: Some(errors),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_selects_a_target() {
        let req: TransformRequest = serde_json::from_value(serde_json::json!({
            "Path": null,
            "Languages": { "Java": null, "Python": true, "R": "yes", "Cpp": false },
            "Platforms": null
        }))
        .unwrap();
        assert_eq!(req.path(), "");
        let languages = req.selected_languages();
        assert_eq!(languages.get("Python"), Some(&true));
        assert_eq!(languages.get("Java"), Some(&false));
        assert_eq!(languages.get("R"), Some(&false));
        assert!(req.selected_platforms().is_empty());
    }

    #[test]
    fn all_targets_succeeded() {
        let response = TransformResponse::from_outcome(vec!["java".into(), "py".into()], vec![]);
        assert!(response.success);
        assert_eq!(response.message, "Successfully transpiled to: java, py");
        assert!(response.errors.is_none());
    }

    #[test]
    fn errors_are_counted() {
        let response = TransformResponse::from_outcome(
            vec!["java".into()],
            vec!["Error transpiling to r: boom".into()],
        );
        assert!(!response.success);
        assert_eq!(
            response.message,
            "Completed with errors. Successes: java. Errors: 1"
        );
        assert_eq!(response.errors.as_ref().map(Vec::len), Some(1));
    }
}
