//! Package discovery on disk.
//!
//! A package is a directory under the configured package root. It is a model
//! package once it holds a `crop2ml/` subdirectory of model XML files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;
use crate::model::{ModelFileName, MODEL_DIR};

/// Immediate subdirectories of `root`, sorted by name.
///
/// A missing root yields an empty list.
pub fn list_packages(root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut packages = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            packages.push(root.join(entry.file_name()));
        }
    }
    packages.sort();
    Ok(packages)
}

/// Whether `path` is a directory holding a `crop2ml/` subdirectory.
pub fn is_package(path: &Path) -> bool {
    path.join(MODEL_DIR).is_dir()
}

/// Model file names (`unit.*.xml`, `composition.*.xml`) under
/// `<package>/crop2ml`, sorted. Anything that is not a package yields an
/// empty list.
pub fn list_models(package: &Path) -> Result<Vec<String>, CoreError> {
    if !is_package(package) {
        return Ok(Vec::new());
    }
    let mut models = Vec::new();
    for entry in fs::read_dir(package.join(MODEL_DIR))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if ModelFileName::parse(&name).is_some() {
            models.push(name);
        }
    }
    models.sort();
    Ok(models)
}

/// Path of a model file inside a package.
pub fn model_path(package: &Path, file_name: &str) -> PathBuf {
    package.join(MODEL_DIR).join(file_name)
}

/// Rejects names that would escape the package root or nest directories.
pub fn validate_package_name(name: &str) -> Result<(), CoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CoreError::InvalidPackageName {
            name: name.to_string(),
        }),
    }
}

/// Last path component, used as the display name of a package.
pub fn package_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
