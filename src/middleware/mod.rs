//! # Middleware Module
//!
//! The stages a compiled route is made of. Every operation gets the same
//! fixed order:
//!
//! 1. `before` hook
//! 2. header parameters
//! 3. `produces` negotiation (406)
//! 4. path parameters
//! 5. query parameters
//! 6. `authenticate` hook
//! 7. `consumes` check (415, skipped for GET and HEAD)
//! 8. raw body read (413 over the limit)
//! 9. form parameters
//! 10. body parameter
//! 11. `authorize` hook
//! 12. `after` hook
//! 13. handlers
//!
//! Stages that have nothing to do for an operation are not compiled in.

mod body;
mod core;
mod hooks;
mod negotiate;
mod params;

pub use body::{BodyStage, FormStage, RawBodyStage};
pub use core::{handler, named, try_handler, Context, Outcome, Params, Stage};
pub use hooks::Hooks;
pub use negotiate::{is_supported, negotiate, parse_accept, ConsumesStage, MediaRange, ProducesStage};
pub use params::{validation_failed, ParamInfo, ParamStage};
