//! Seam between the studio and the external Crop2ML modelling tools.
//!
//! Provides the [`ModelToolkit`] and [`PackageTemplater`] traits that every
//! backend implements, plus three backends:
//!
//! - [`PycropmlToolkit`]: drives pycropml through a Python subprocess
//! - [`CookiecutterTemplater`]: creates packages with the cookiecutter CLI
//! - [`InMemoryToolkit`]: keeps models in memory, for tests and demos

pub mod bridge;
pub mod cookiecutter;
pub mod error;
pub mod memory;
pub mod pycropml;
pub mod traits;

pub use cookiecutter::CookiecutterTemplater;
pub use error::ToolkitError;
pub use memory::InMemoryToolkit;
pub use pycropml::PycropmlToolkit;
pub use traits::{ModelToolkit, PackageTemplater, RenderedImage, TemplateContext};
