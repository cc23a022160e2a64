//! # CLI Module
//!
//! The `swagger-framework` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve a directory of declarations. Every operation answers with the echo
//! handler (the validated parameters it received) and the docs are mounted
//! at the framework's `docsPath`:
//!
//! ```bash
//! swagger-framework serve --declarations ./petstore --addr 127.0.0.1:8080
//! swagger-framework serve --declarations ./petstore --config service.yaml
//! ```
//!
//! ### `validate`
//!
//! Run setup and build the router; exits non-zero and prints every
//! validation issue when a declaration is wrong:
//!
//! ```bash
//! swagger-framework validate --declarations ./petstore
//! ```
//!
//! ### `docs`
//!
//! Print the rendered resource listing, or one api declaration:
//!
//! ```bash
//! swagger-framework docs --declarations ./petstore --resource /pet
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};
