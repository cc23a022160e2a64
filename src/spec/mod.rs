//! # Spec Module
//!
//! Serde types for the declaration documents (resource listing, api
//! declarations, operations, parameters, models) and loaders that read them
//! from JSON or YAML files into a [`Framework`](crate::framework::Framework).

mod load;
mod types;

pub use load::{find_document, load_declarations, read_declarations, read_document, Declarations};
pub use types::*;
