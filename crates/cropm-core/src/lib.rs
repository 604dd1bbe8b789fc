//! Core domain types and pure transformations for Crop2ML model packages.
//!
//! This crate owns everything that does not need the external modelling
//! library:
//!
//! - [`form`]: the form-shaped JSON submitted by the studio client
//! - [`model`]: model kinds, file naming, and the typed schema of a parsed model
//! - [`adapt`]: form JSON to the legacy XML-writer argument shapes
//! - [`extract`]: parsed models back to form JSON
//! - [`target`]: transpilation target table
//! - [`package`]: package discovery on disk
//! - [`archive`]: zip snapshots and base64 data URIs

pub mod adapt;
pub mod archive;
pub mod error;
pub mod extract;
pub mod form;
pub mod model;
pub mod package;
pub mod target;

pub use error::CoreError;
pub use model::{ModelDescription, ModelFileName, ModelKind};
pub use target::{TargetKind, TranspileTarget};
