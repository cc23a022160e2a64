//! # Router Module
//!
//! Compiles the set up declaration graph into a dispatcher and runs it.
//!
//! ## Architecture
//!
//! 1. **Compilation**: every resource path is translated (`{id}` to `:id`,
//!    `{format}` to `json`) and inserted into a segment radix tree. Each
//!    operation on it becomes a [`CompiledRoute`]: its hooks, parameter
//!    stages, negotiation stages and handlers in the fixed stage order.
//!
//! 2. **Dispatch**: the request path is matched against the tree. No match
//!    means `None` from [`Router::handle`] (404 from [`Router::dispatch`]).
//!    A match without a route for the method answers `OPTIONS` with an
//!    `Allow` header, serves `HEAD` through `GET` and otherwise replies 405.
//!    The stages of the route then run in order until one replies.
//!
//! ```rust,ignore
//! let router = framework.dispatcher()?;
//! let response = router.dispatch(
//!     http::Request::get("/pet/1").body(Vec::new())?,
//! );
//! assert_eq!(response.status(), 200);
//! ```

mod core;
mod radix;

pub use core::{CompiledRoute, Router, REQUEST_ID_HEADER};
pub use radix::{translate_path, ParamVec, RadixRouter, RouteTable};
