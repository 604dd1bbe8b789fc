//! HTTP/JSON API for the Crop2ML studio.
//!
//! Lets a notebook client create, inspect, import, export and transpile
//! Crop2ML model packages. This crate contains the server framework, API
//! schema types, error handling, authentication, and route definitions;
//! model parsing and code generation are delegated to a
//! [`cropm_toolkit::ModelToolkit`] backend.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
