//! Server configuration read from environment variables.
//!
//! - `CROPM_BIND`: listen address (default: "127.0.0.1:8888")
//! - `CROPM_BASE_URL`: base URL the API is mounted under (default: "/")
//! - `CROPM_PACKAGES_DIR`: package root (default: "./packages")
//! - `CROPM_TOKEN`: API token; unset disables authentication
//! - `CROPM_PYTHON`: Python interpreter with pycropml (default: "python3")
//! - `CROPM_WRITER_MODULE`: Python module providing the XML writers
//! - `CROPM_COOKIECUTTER`: cookiecutter executable (default: "cookiecutter")
//! - `CROPM_TEMPLATE`: package template repository

use std::path::PathBuf;

use cropm_toolkit::cookiecutter::DEFAULT_TEMPLATE;
use cropm_toolkit::pycropml::DEFAULT_WRITER_MODULE;

/// Path segment every API route lives under.
pub const API_NAMESPACE: &str = "cropmstudio";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub base_url: String,
    pub packages_root: PathBuf,
    pub token: Option<String>,
    pub python: PathBuf,
    pub writer_module: String,
    pub cookiecutter: PathBuf,
    pub template: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        ServerConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        ServerConfig {
            bind: var("CROPM_BIND", "127.0.0.1:8888"),
            base_url: var("CROPM_BASE_URL", "/"),
            packages_root: PathBuf::from(var("CROPM_PACKAGES_DIR", "./packages")),
            token: lookup("CROPM_TOKEN").filter(|t| !t.is_empty()),
            python: PathBuf::from(var("CROPM_PYTHON", "python3")),
            writer_module: var("CROPM_WRITER_MODULE", DEFAULT_WRITER_MODULE),
            cookiecutter: PathBuf::from(var("CROPM_COOKIECUTTER", "cookiecutter")),
            template: var("CROPM_TEMPLATE", DEFAULT_TEMPLATE),
        }
    }

    /// Mount point of the API, e.g. `/cropmstudio` or `/user/x/cropmstudio`.
    pub fn api_prefix(&self) -> String {
        api_prefix(&self.base_url)
    }
}

pub fn api_prefix(base_url: &str) -> String {
    let base = base_url.trim_matches('/');
    if base.is_empty() {
        format!("/{API_NAMESPACE}")
    } else {
        format!("/{base}/{API_NAMESPACE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_without_variables() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8888");
        assert_eq!(config.packages_root, PathBuf::from("./packages"));
        assert!(config.token.is_none());
        assert_eq!(config.template, DEFAULT_TEMPLATE);
        assert_eq!(config.api_prefix(), "/cropmstudio");
    }

    #[test]
    fn variables_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("CROPM_PACKAGES_DIR", "/srv/packages"),
            ("CROPM_TOKEN", "secret"),
            ("CROPM_BASE_URL", "/user/alice/"),
            ("CROPM_PYTHON", ""),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.packages_root, PathBuf::from("/srv/packages"));
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.python, PathBuf::from("python3"));
        assert_eq!(config.api_prefix(), "/user/alice/cropmstudio");
    }
}
