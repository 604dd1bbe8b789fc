//! Transpilation targets: programming languages and simulation platforms.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Language,
    Platform,
}

/// A transpiler target. Declaration order is the order targets are run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum TranspileTarget {
    Java,
    CSharp,
    Fortran,
    Python,
    R,
    Cpp,
    Simplace,
    Bioma,
    Dssat,
    OpenAlea,
    Record,
    Stics,
    Apsim,
    Sirius,
}

impl TranspileTarget {
    pub const ALL: [TranspileTarget; 14] = [
        TranspileTarget::Java,
        TranspileTarget::CSharp,
        TranspileTarget::Fortran,
        TranspileTarget::Python,
        TranspileTarget::R,
        TranspileTarget::Cpp,
        TranspileTarget::Simplace,
        TranspileTarget::Bioma,
        TranspileTarget::Dssat,
        TranspileTarget::OpenAlea,
        TranspileTarget::Record,
        TranspileTarget::Stics,
        TranspileTarget::Apsim,
        TranspileTarget::Sirius,
    ];

    /// Code understood by the transpiler.
    pub fn code(self) -> &'static str {
        match self {
            TranspileTarget::Java => "java",
            TranspileTarget::CSharp => "cs",
            TranspileTarget::Fortran => "f90",
            TranspileTarget::Python => "py",
            TranspileTarget::R => "r",
            TranspileTarget::Cpp => "cpp",
            TranspileTarget::Simplace => "simplace",
            TranspileTarget::Bioma => "bioma",
            TranspileTarget::Dssat => "dssat",
            TranspileTarget::OpenAlea => "openalea",
            TranspileTarget::Record => "record",
            TranspileTarget::Stics => "stics",
            TranspileTarget::Apsim => "apsim",
            TranspileTarget::Sirius => "sirius",
        }
    }

    /// Key used by the studio's selection form.
    pub fn ui_name(self) -> &'static str {
        match self {
            TranspileTarget::Java => "Java",
            TranspileTarget::CSharp => "CSharp",
            TranspileTarget::Fortran => "Fortran",
            TranspileTarget::Python => "Python",
            TranspileTarget::R => "R",
            TranspileTarget::Cpp => "Cpp",
            TranspileTarget::Simplace => "Simplace",
            TranspileTarget::Bioma => "Bioma",
            TranspileTarget::Dssat => "Dssat",
            TranspileTarget::OpenAlea => "OpenAlea",
            TranspileTarget::Record => "Record",
            TranspileTarget::Stics => "Stics",
            TranspileTarget::Apsim => "Apsim",
            TranspileTarget::Sirius => "Sirius",
        }
    }

    pub fn kind(self) -> TargetKind {
        match self {
            TranspileTarget::Java
            | TranspileTarget::CSharp
            | TranspileTarget::Fortran
            | TranspileTarget::Python
            | TranspileTarget::R
            | TranspileTarget::Cpp => TargetKind::Language,
            _ => TargetKind::Platform,
        }
    }
}

impl fmt::Display for TranspileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<TranspileTarget> for &'static str {
    fn from(target: TranspileTarget) -> Self {
        target.code()
    }
}

impl FromStr for TranspileTarget {
    type Err = String;

    /// Accepts either the transpiler code or the form key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TranspileTarget::ALL
            .into_iter()
            .find(|t| t.code() == s || t.ui_name() == s)
            .ok_or_else(|| format!("unknown transpile target: {s}"))
    }
}

impl TryFrom<String> for TranspileTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Resolves the form's checkbox maps into an ordered target list.
///
/// Languages come first, then platforms, each in table order. Keys that are
/// unknown, or that name a target of the other kind, are ignored.
pub fn select_targets(
    languages: &HashMap<String, bool>,
    platforms: &HashMap<String, bool>,
) -> Vec<TranspileTarget> {
    TranspileTarget::ALL
        .into_iter()
        .filter(|target| {
            let selection = match target.kind() {
                TargetKind::Language => languages,
                TargetKind::Platform => platforms,
            };
            selection.get(target.ui_name()).copied().unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn selection_follows_table_order() {
        let languages = flags(&[("Python", true), ("Java", true), ("R", false)]);
        let platforms = flags(&[("Sirius", true), ("Bioma", true)]);
        let targets: Vec<&str> = select_targets(&languages, &platforms)
            .into_iter()
            .map(TranspileTarget::code)
            .collect();
        assert_eq!(targets, vec!["java", "py", "bioma", "sirius"]);
    }

    #[test]
    fn platforms_in_language_map_are_ignored() {
        let languages = flags(&[("Simplace", true)]);
        assert!(select_targets(&languages, &HashMap::new()).is_empty());
    }

    #[test]
    fn parses_codes_and_form_keys() {
        assert_eq!("cs".parse::<TranspileTarget>(), Ok(TranspileTarget::CSharp));
        assert_eq!("OpenAlea".parse::<TranspileTarget>(), Ok(TranspileTarget::OpenAlea));
        assert!("cobol".parse::<TranspileTarget>().is_err());
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_value(TranspileTarget::Fortran).unwrap();
        assert_eq!(json, "f90");
        let back: TranspileTarget = serde_json::from_value(json).unwrap();
        assert_eq!(back, TranspileTarget::Fortran);
    }
}
