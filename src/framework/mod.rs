//! # Framework Module
//!
//! The declaration graph: a [`Framework`] owns [`Api`]s, an Api owns
//! [`Resource`]s and models, a Resource owns one [`Operation`] per method.
//!
//! Every entity has a two-phase lifecycle. Construction only stores the
//! declaration. `setup` validates it against its schema, normalizes paths,
//! registers nicknames and models and recurses into children. Setting up an
//! entity twice is an error.
//!
//! ```rust,ignore
//! use swagger_framework::framework::Framework;
//! use swagger_framework::middleware::handler;
//! use swagger_framework::server::Reply;
//! use swagger_framework::spec::*;
//!
//! let mut framework = Framework::new(FrameworkOptions::new("http://localhost"))?;
//! let api = framework.api(ApiSpec::new("/pet"))?;
//! api.resource(ResourceSpec::new("/pet/{petId}")).operation(
//!     OperationSpec::new("GET", "getPetById")
//!         .parameter(ParameterSpec::new("petId", ParamType::Path, "integer")),
//!     handler(|ctx| Reply::json(200, ctx.params.path.clone().unwrap_or_default()).into()),
//! )?;
//! let router = framework.dispatcher()?;
//! ```

mod api;
mod core;
mod operation;
mod registry;
mod resource;

pub use api::Api;
pub use core::Framework;
pub use operation::{Operation, OperationInfo};
pub(crate) use operation::Attached;
pub use registry::NicknameRegistry;
pub use resource::{prefixed_path, Resource};
