//! # swagger-framework
//!
//! A request dispatcher driven by [Swagger 1.2](https://github.com/swagger-api/swagger-spec/blob/master/versions/1.2.md)
//! declarations.
//!
//! ## Overview
//!
//! You declare Apis, Resources, Operations and Models with the same shapes
//! the Swagger 1.2 documents use. From that declaration the crate builds:
//!
//! - a **router** that matches paths, validates and coerces every parameter
//!   location against a JSON Schema generated from the declaration,
//!   negotiates `Accept`/`Content-Type`, and runs user handlers
//! - a **docs router** that serves the resource listing and one api
//!   declaration per Api, including every model those operations reach
//!
//! ## Architecture
//!
//! - **[`spec`]** - Serde types for the declaration documents and file loaders
//! - **[`schema`]** - Schema environment: the Swagger 1.2 meta-schemas, model
//!   registry, parameter-to-schema transform and type coercion
//! - **[`framework`]** - The declaration graph and its two-phase setup
//! - **[`middleware`]** - Stages: per-location validation, negotiation, hooks
//! - **[`router`]** - Path trie and the fixed stage pipeline per operation
//! - **[`docs`]** - Resource listing and api declaration rendering
//! - **[`server`]** - Replies, encoders, decoders and a threaded HTTP adapter
//! - **[`validator`]** - Validation issue formatting
//!
//! ## Request pipeline
//!
//! ```text
//! before -> header -> produces (406) -> path -> query -> authenticate
//!        -> consumes (415) -> raw body (413) -> form -> body
//!        -> authorize -> after -> handlers
//! ```
//!
//! Stages run until one answers. A failed stage becomes an error reply with
//! its status (validation failures are 400 with the collected issues). If
//! every stage passes without answering, the request gets a 400.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use swagger_framework::framework::Framework;
//! use swagger_framework::middleware::handler;
//! use swagger_framework::server::{HttpServer, Reply};
//! use swagger_framework::spec::*;
//!
//! let mut framework = Framework::new(FrameworkOptions::new("http://localhost:8080"))?;
//! framework
//!     .api(ApiSpec::new("/pet"))?
//!     .resource(ResourceSpec::new("/pet/{petId}"))
//!     .operation(
//!         OperationSpec::new("GET", "getPetById")
//!             .parameter(ParameterSpec::new("petId", ParamType::Path, "integer")),
//!         handler(|ctx| Reply::json(200, ctx.params.path.clone().unwrap_or_default()).into()),
//!     )?;
//!
//! let service = framework.service()?;
//! let handle = HttpServer::new(service).start("127.0.0.1:8080")?;
//! handle.join().ok();
//! ```
//!
//! ## Logging
//!
//! All diagnostics go through `tracing`. Binaries call
//! [`logging::init_logging`] with a [`logging::LogConfig`] read from
//! `SF_LOG_LEVEL`, `SF_LOG_FORMAT` and `SF_LOG_TARGET_FILTER`.

pub mod cli;
pub mod docs;
pub mod echo;
pub mod error;
pub mod framework;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod spec;
pub mod validator;

pub use docs::{Docs, DocsRouter};
pub use error::{DeclarationError, HandlerError};
pub use framework::{Api, Framework, Operation, Resource};
pub use router::Router;
pub use server::{AppService, HttpServer, Reply};
pub use spec::{
    load_declarations, ApiSpec, FrameworkOptions, ModelSpec, OperationSpec, ParamType,
    ParameterSpec, ResourceSpec,
};
