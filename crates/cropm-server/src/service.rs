//! StudioService: the single coordinator between HTTP handlers, the package
//! tree on disk, and the toolkit backends.
//!
//! All business logic flows through [`StudioService`]. Handlers are thin
//! wrappers that lock the service and delegate to these methods.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use cropm_core::adapt::{adapt_composition_model_complete, adapt_unit_model_complete};
use cropm_core::archive::{self, SVG_MEDIA_TYPE, ZIP_MEDIA_TYPE};
use cropm_core::extract::{
    self, HeaderView, InputsOutputsView, ParameterSetsView, TestSetsView,
};
use cropm_core::form::{value_text, ModelSubmission};
use cropm_core::model::MODEL_DIR;
use cropm_core::package;
use cropm_core::target::select_targets;
use cropm_core::{CoreError, ModelDescription, ModelFileName, ModelKind, TranspileTarget};
use cropm_toolkit::{ModelToolkit, PackageTemplater, TemplateContext};

use crate::error::ApiError;
use crate::schema::models::{CreateModelResponse, DisplayModelResponse};
use crate::schema::packages::{CreatePackageRequest, DownloadPackageResponse, ImportPackageRequest};
use crate::schema::transform::{TransformDirection, TransformRequest, TransformResponse};

const FETCH_ERROR: &str = "Error fetching the model";
const MISSING_PATH: &str = "You must provide a package path.";

/// The central service behind every studio endpoint.
///
/// Holds the package root and the two external backends. Requests are
/// serialized by the mutex in [`crate::state::AppState`].
pub struct StudioService {
    packages_root: PathBuf,
    toolkit: Box<dyn ModelToolkit>,
    templater: Box<dyn PackageTemplater>,
}

impl StudioService {
    pub fn new(
        packages_root: PathBuf,
        toolkit: Box<dyn ModelToolkit>,
        templater: Box<dyn PackageTemplater>,
    ) -> Self {
        StudioService {
            packages_root,
            toolkit,
            templater,
        }
    }

    pub fn packages_root(&self) -> &Path {
        &self.packages_root
    }

    // -----------------------------------------------------------------------
    // Packages
    // -----------------------------------------------------------------------

    /// Package directories under the root, as displayable paths.
    pub fn list_packages(&self) -> Result<Vec<String>, ApiError> {
        let packages = package::list_packages(&self.packages_root)?;
        Ok(packages
            .iter()
            .map(|p| p.display().to_string())
            .collect())
    }

    /// Model files of `package`. No package means no models.
    pub fn list_models(&self, package: Option<&str>) -> Result<Vec<String>, ApiError> {
        match package {
            Some(path) if !path.is_empty() => Ok(package::list_models(Path::new(path))?),
            _ => Ok(Vec::new()),
        }
    }

    /// Instantiates the package template under the root.
    pub fn create_package(&mut self, req: &CreatePackageRequest) -> Result<(), ApiError> {
        let missing: Vec<&str> = [
            ("projectName", &req.project_name),
            ("packageName", &req.package_name),
            ("description", &req.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect();
        if !missing.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "The following data is missing to create a package: {}",
                missing.join(", ")
            )));
        }

        let context = TemplateContext {
            project_name: req.project_name.clone().unwrap_or_default(),
            repo_name: req.package_name.clone().unwrap_or_default(),
            author_name: req.authors.clone().unwrap_or_default(),
            description: req.description.clone().unwrap_or_default(),
            open_source_license: req.license.clone().unwrap_or_default(),
        };

        package::validate_package_name(&context.repo_name)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        fs::create_dir_all(&self.packages_root).map_err(|e| {
            error!("cannot create package root {}: {e}", self.packages_root.display());
            ApiError::InternalError("Could not create the package.".to_string())
        })?;

        if self.packages_root.join(&context.repo_name).is_dir() {
            warn!("package {} already exists", context.repo_name);
            return Err(ApiError::BadRequest(
                "This package already exists.".to_string(),
            ));
        }

        self.templater
            .create_package(&self.packages_root, &context)
            .map_err(|e| {
                error!("templating {} failed: {e}", context.repo_name);
                ApiError::InternalError("Could not create the package.".to_string())
            })?;

        info!("created package {}", context.repo_name);
        Ok(())
    }

    /// Extracts a zip data URI into the package root.
    ///
    /// Returns the extracted file paths.
    pub fn import_package(&self, req: &ImportPackageRequest) -> Result<Vec<PathBuf>, ApiError> {
        let Some(uri) = req.package.as_deref() else {
            return Err(ApiError::BadRequest("The package is missing".to_string()));
        };

        let bytes = archive::decode_data_uri(uri).map_err(|e| {
            warn!("import payload rejected: {e}");
            ApiError::InternalError("ZIP data can't be extracted from blob".to_string())
        })?;

        fs::create_dir_all(&self.packages_root).map_err(|e| {
            error!("cannot create package root {}: {e}", self.packages_root.display());
            ApiError::InternalError("Unexpected error while extracting ZIP".to_string())
        })?;

        let files = archive::extract_archive(&bytes, &self.packages_root).map_err(|e| {
            error!("zip extraction failed: {e}");
            match e {
                CoreError::NotZip { .. } => ApiError::InternalError("Data are not ZIP".to_string()),
                _ => ApiError::InternalError("Unexpected error while extracting ZIP".to_string()),
            }
        })?;

        info!("imported {} files into {}", files.len(), self.packages_root.display());
        Ok(files)
    }

    /// Zips the package at `path` into a data URI.
    pub fn download_package(&self, path: &str) -> Result<DownloadPackageResponse, ApiError> {
        if path.is_empty() {
            return Err(ApiError::Unsuccessful(MISSING_PATH.to_string()));
        }
        let dir = Path::new(path);
        if !dir.is_dir() {
            return Err(ApiError::Unsuccessful(format!("Directory not found: {path}")));
        }

        let bytes = archive::zip_package(dir).map_err(|e| {
            error!("zipping {path} failed: {e}");
            ApiError::Unsuccessful(format!("Error creating ZIP file: {e}"))
        })?;

        let package_name = package::package_name(dir);
        Ok(DownloadPackageResponse {
            success: true,
            download: archive::encode_data_uri(ZIP_MEDIA_TYPE, &bytes),
            filename: format!("{package_name}.zip"),
            message: format!("Successfully created ZIP for package {package_name}"),
            package_name,
        })
    }

    // -----------------------------------------------------------------------
    // Models
    // -----------------------------------------------------------------------

    /// Resolves and parses the model named by a `package`/`model` query.
    fn load_model(
        &self,
        package: Option<&str>,
        model: Option<&str>,
    ) -> Result<(String, ModelKind, ModelDescription), ApiError> {
        let (Some(path), Some(file)) = (package, model) else {
            return Err(ApiError::Unsuccessful(FETCH_ERROR.to_string()));
        };
        if path.is_empty() || !package::model_path(Path::new(path), file).is_file() {
            return Err(ApiError::Unsuccessful(FETCH_ERROR.to_string()));
        }
        let Some(parsed) = ModelFileName::parse(file) else {
            return Err(ApiError::Unsuccessful(FETCH_ERROR.to_string()));
        };

        let description = self
            .toolkit
            .find_model(Path::new(path), &parsed.name)
            .map_err(|e| {
                error!("parsing {file} in {path} failed: {e}");
                ApiError::from(e)
            })?;
        Ok((path.to_string(), parsed.kind, description))
    }

    pub fn model_header(
        &self,
        package: Option<&str>,
        model: Option<&str>,
    ) -> Result<HeaderView, ApiError> {
        let (path, kind, description) = self.load_model(package, model)?;
        Ok(extract::header_view(&path, kind, &description))
    }

    pub fn model_inputs_outputs(
        &self,
        package: Option<&str>,
        model: Option<&str>,
    ) -> Result<InputsOutputsView, ApiError> {
        let (_, _, description) = self.load_model(package, model)?;
        Ok(extract::inputs_outputs_view(&description))
    }

    pub fn model_parametersets(
        &self,
        package: Option<&str>,
        model: Option<&str>,
    ) -> Result<ParameterSetsView, ApiError> {
        let (_, _, description) = self.load_model(package, model)?;
        Ok(extract::parametersets_view(&description))
    }

    pub fn model_testsets(
        &self,
        package: Option<&str>,
        model: Option<&str>,
    ) -> Result<TestSetsView, ApiError> {
        let (_, _, description) = self.load_model(package, model)?;
        Ok(extract::testsets_view(&description))
    }

    /// Adapts a `create-model` submission and writes it through the toolkit.
    ///
    /// The model type is checked before anything is adapted, so an absent or
    /// unknown type never reaches the writer.
    pub fn create_model(&mut self, body: Value) -> Result<CreateModelResponse, ApiError> {
        let header_type = body
            .get("model-header")
            .and_then(|h| h.get("Model type"))
            .map(value_text)
            .unwrap_or_default();
        if header_type.is_empty() {
            warn!("create-model request without a model type");
            return Err(ApiError::Unsuccessful(
                "Model type not specified in header".to_string(),
            ));
        }
        let kind = header_type.parse::<ModelKind>().inspect_err(|e| warn!("{e}"))?;

        let mut submission: ModelSubmission =
            serde_json::from_value(body).map_err(|e| ApiError::Unsuccessful(e.to_string()))?;
        let header = writer_header(&submission.header)?;
        submission.header = header;

        let model_name = submission
            .header
            .get("Model name")
            .map(value_text)
            .unwrap_or_default();

        match kind {
            ModelKind::Unit => {
                let draft = adapt_unit_model_complete(
                    &submission.header,
                    &submission.inputs_outputs,
                    submission.parametersets.as_ref(),
                    submission.testsets.as_ref(),
                )?;
                debug!(
                    columns = draft.df.columns.len(),
                    rows = draft.df.len(),
                    parametersets = draft.paramsetdict.len(),
                    testsets = draft.testsetdict.len(),
                    "adapted unit model"
                );
                self.toolkit.write_unit_model(&draft).map_err(|e| {
                    error!("writing unit model {model_name} failed: {e}");
                    ApiError::from(e)
                })?;
            }
            ModelKind::Composition => {
                let draft = adapt_composition_model_complete(
                    &submission.header,
                    &submission.models,
                    &submission.links,
                )?;
                debug!(
                    models = draft.listmodel.len(),
                    links = draft.listlink.len(),
                    "adapted composition model"
                );
                self.toolkit.write_composition_model(&draft).map_err(|e| {
                    error!("writing composition model {model_name} failed: {e}");
                    ApiError::from(e)
                })?;
            }
        }

        info!("{kind} model {model_name} created");
        Ok(CreateModelResponse {
            success: true,
            message: format!("{} model created successfully", kind.title()),
            model_name,
            model_type: kind,
        })
    }

    /// Renders the package workflow as an SVG data URI.
    pub fn display_model(&self, path: &str) -> Result<DisplayModelResponse, ApiError> {
        if path.is_empty() {
            return Err(ApiError::Unsuccessful(MISSING_PATH.to_string()));
        }
        let package_name = package::package_name(Path::new(path));

        let image = self
            .toolkit
            .render_topology(&package_name, Path::new(path))
            .map_err(|e| {
                error!("topology of {path} failed: {e}");
                ApiError::Unsuccessful(format!("Error generating workflow: {e}"))
            })?;

        Ok(DisplayModelResponse {
            success: true,
            image: archive::encode_data_uri(SVG_MEDIA_TYPE, image.as_bytes()),
            image_type: image.kind(),
            message: format!("Successfully generated workflow for package {package_name}"),
            package_name,
        })
    }

    // -----------------------------------------------------------------------
    // Transformation
    // -----------------------------------------------------------------------

    /// Transpiles the package once per selected target.
    ///
    /// Targets run in table order; a failing target is recorded and the
    /// remaining ones still run.
    pub fn transform(
        &mut self,
        req: &TransformRequest,
        direction: TransformDirection,
    ) -> Result<TransformResponse, ApiError> {
        let package = req.path();
        if package.is_empty() {
            return Err(ApiError::Unsuccessful(MISSING_PATH.to_string()));
        }
        let targets = select_targets(&req.selected_languages(), &req.selected_platforms());
        if targets.is_empty() {
            warn!("transform of {package} without targets");
            return Err(ApiError::Unsuccessful(
                "You must select at least one target language or platform.".to_string(),
            ));
        }

        let path = Path::new(package);
        let (successes, errors) = targets.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut successes, mut errors), target| {
                info!("transpiling package {package} to {target}");
                match self.transpile(path, target, direction) {
                    Ok(()) => successes.push(target.code().to_string()),
                    Err(e) => {
                        let msg = format!("Error transpiling to {target}: {e}");
                        error!("{msg}");
                        errors.push(msg);
                    }
                }
                (successes, errors)
            },
        );

        Ok(TransformResponse::from_outcome(successes, errors))
    }

    fn transpile(
        &mut self,
        path: &Path,
        target: TranspileTarget,
        direction: TransformDirection,
    ) -> Result<(), cropm_toolkit::ToolkitError> {
        match direction {
            TransformDirection::ToPlatform => self.toolkit.transpile_package(path, target),
            TransformDirection::ToCrop2ml => self.toolkit.transpile_component(path, path, target),
        }
    }
}

/// Points the header's `Path` at the package's model directory.
fn writer_header(header: &Map<String, Value>) -> Result<Map<String, Value>, CoreError> {
    let path = header
        .get("Path")
        .map(value_text)
        .ok_or_else(|| CoreError::MissingField {
            field: "Path".to_string(),
        })?;
    let mut header = header.clone();
    header.insert(
        "Path".to_string(),
        Value::String(Path::new(&path).join(MODEL_DIR).display().to_string()),
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropm_toolkit::InMemoryToolkit;
    use serde_json::json;

    fn service(root: &Path) -> StudioService {
        StudioService::new(
            root.to_path_buf(),
            Box::new(InMemoryToolkit::new()),
            Box::new(InMemoryToolkit::new()),
        )
    }

    #[test]
    fn writer_header_appends_model_dir() {
        let header = json!({ "Path": "packages/wheat" });
        let adapted = writer_header(header.as_object().unwrap()).unwrap();
        assert_eq!(adapted["Path"], json!("packages/wheat/crop2ml"));
    }

    #[test]
    fn writer_header_requires_path() {
        let err = writer_header(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing field: 'Path'");
    }

    #[test]
    fn unknown_model_type_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(dir.path());
        let err = service
            .create_model(json!({ "model-header": { "Model type": "Crop" } }))
            .unwrap_err();
        assert_eq!(err.message(), "Unknown model type: crop");
    }

    #[test]
    fn list_models_without_package_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        assert!(service.list_models(None).unwrap().is_empty());
        assert!(service.list_models(Some("")).unwrap().is_empty());
    }

    #[test]
    fn transform_needs_targets() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(dir.path());
        let req = TransformRequest {
            path: Some(dir.path().display().to_string()),
            ..Default::default()
        };
        let err = service
            .transform(&req, TransformDirection::ToPlatform)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "You must select at least one target language or platform."
        );
    }

    #[test]
    fn create_package_lists_every_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(dir.path());
        let req = CreatePackageRequest {
            package_name: Some("wheat".into()),
            ..Default::default()
        };
        let err = service.create_package(&req).unwrap_err();
        assert_eq!(
            err.message(),
            "The following data is missing to create a package: projectName, description"
        );
    }
}
