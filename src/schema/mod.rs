//! # Schema Module
//!
//! Glue between swagger declarations and JSON Schema validation.
//!
//! - [`SchemaEnvironment`] keeps the named model registry and compiles schemas
//!   that reference models by bare name.
//! - [`CompiledSchema`] is the per-route validator used on the hot path; it
//!   coerces stringly typed values and fills defaults before validating.
//! - [`transform`] builds parameter and model schemas from declarations.
//! - [`find`] detects model references for documentation closure.
//! - [`swagger`] holds the schemas declarations are checked against at setup.

pub mod constants;
mod coerce;
mod environment;
pub mod find;
pub mod swagger;
pub mod transform;

pub use coerce::{coerce, ValidateOptions};
pub use environment::{CompiledSchema, SchemaEnvironment};
