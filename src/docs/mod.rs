//! # Docs Module
//!
//! Rebuilds the documentation view of a framework: a resource listing of
//! every Api and one declaration per Api, carrying its operations verbatim
//! and every model they reach.
//!
//! [`DocsRouter`] serves both over HTTP under the framework's `docsPath`.

mod core;
mod router;

pub use core::{model_closure, Docs};
pub use router::DocsRouter;
