//! Application state with a shared `StudioService`.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. Handlers await the lock, so requests are served one at a
//! time against the package tree and the toolkit backend.

use std::path::PathBuf;
use std::sync::Arc;

use cropm_toolkit::{CookiecutterTemplater, ModelToolkit, PackageTemplater, PycropmlToolkit};

use crate::config::ServerConfig;
use crate::service::StudioService;

#[derive(Clone)]
pub struct AppState {
    /// The shared studio service.
    pub service: Arc<tokio::sync::Mutex<StudioService>>,
    /// Token every request must present, if any.
    pub token: Option<Arc<str>>,
    /// Base URL the API is mounted under.
    pub base_url: String,
}

impl AppState {
    /// Creates the production state: pycropml through Python and
    /// cookiecutter for package templates.
    pub fn new(config: &ServerConfig) -> Self {
        let toolkit = PycropmlToolkit::new(&config.python)
            .with_writer_module(config.writer_module.clone());
        let templater = CookiecutterTemplater::new(&config.cookiecutter, config.template.clone());

        let mut state = AppState::with_backends(
            config.packages_root.clone(),
            Box::new(toolkit),
            Box::new(templater),
        );
        state.token = config.token.as_deref().map(Arc::from);
        state.base_url = config.base_url.clone();
        state
    }

    /// Creates an unauthenticated state over arbitrary backends (for testing).
    pub fn with_backends(
        packages_root: PathBuf,
        toolkit: Box<dyn ModelToolkit>,
        templater: Box<dyn PackageTemplater>,
    ) -> Self {
        let service = StudioService::new(packages_root, toolkit, templater);
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            token: None,
            base_url: "/".to_string(),
        }
    }

    /// Requires `token` on every request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(Arc::from(token));
        self
    }
}
