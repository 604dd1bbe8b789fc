//! [`PackageTemplater`] that shells out to the cookiecutter CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info};

use crate::bridge::last_line;
use crate::error::ToolkitError;
use crate::traits::{PackageTemplater, TemplateContext};

/// Template repository for Crop2ML packages.
pub const DEFAULT_TEMPLATE: &str =
    "https://github.com/AgriculturalModelExchangeInitiative/cookiecutter-crop2ml";

#[derive(Debug, Clone)]
pub struct CookiecutterTemplater {
    program: PathBuf,
    template: String,
}

impl CookiecutterTemplater {
    pub fn new(program: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        CookiecutterTemplater {
            program: program.into(),
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Arguments for a non-interactive run into `output_dir`.
    fn args(&self, output_dir: &Path, context: &TemplateContext) -> Vec<String> {
        let mut args = vec![
            self.template.clone(),
            "--no-input".to_string(),
            "--output-dir".to_string(),
            output_dir.display().to_string(),
        ];
        args.extend(
            context
                .pairs()
                .iter()
                .map(|(key, value)| format!("{key}={value}")),
        );
        args
    }
}

impl Default for CookiecutterTemplater {
    fn default() -> Self {
        CookiecutterTemplater::new("cookiecutter", DEFAULT_TEMPLATE)
    }
}

impl PackageTemplater for CookiecutterTemplater {
    fn create_package(
        &mut self,
        output_dir: &Path,
        context: &TemplateContext,
    ) -> Result<(), ToolkitError> {
        let output = Command::new(&self.program)
            .args(self.args(output_dir, context))
            .output()
            .map_err(|source| ToolkitError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(template = %self.template, traceback = %stderr, "templating failed");
            return Err(ToolkitError::failed(
                "create package",
                last_line(&stderr, output.status),
            ));
        }

        info!(package = %context.repo_name, "package created from template");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_pass_context_as_extra_context() {
        let templater = CookiecutterTemplater::default();
        let context = TemplateContext {
            project_name: "Wheat".into(),
            repo_name: "wheat".into(),
            author_name: "A. Author".into(),
            description: "Wheat models".into(),
            open_source_license: "MIT".into(),
        };
        let args = templater.args(Path::new("./packages"), &context);
        assert_eq!(args[0], DEFAULT_TEMPLATE);
        assert_eq!(&args[1..4], &["--no-input", "--output-dir", "./packages"]);
        assert!(args.contains(&"repo_name=wheat".to_string()));
        assert!(args.contains(&"author_name=A. Author".to_string()));
        assert_eq!(args.len(), 9);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut templater =
            CookiecutterTemplater::new("/nonexistent/cookiecutter-for-cropm-tests", DEFAULT_TEMPLATE);
        let dir = tempfile::tempdir().unwrap();
        let err = templater
            .create_package(dir.path(), &TemplateContext::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Spawn { .. }));
    }
}
