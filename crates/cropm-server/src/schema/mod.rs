//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for one group of
//! studio endpoints. Field names follow the studio client's JSON exactly,
//! which is why many of them are renamed.

pub mod common;
pub mod models;
pub mod packages;
pub mod transform;
