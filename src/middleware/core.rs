use crate::error::HandlerError;
use crate::framework::OperationInfo;
use crate::ids::RequestId;
use crate::router::ParamVec;
use crate::server::request::header_str;
use crate::server::Reply;
use crate::spec::ParamType;
use http::{Extensions, HeaderMap, Method};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Result of running one stage.
#[derive(Debug)]
pub enum Outcome {
    /// Hand the request to the next stage
    Continue,
    /// Stop and send this reply
    Respond(Reply),
    /// Stop with an error; answered by the generic error reply
    Fail(HandlerError),
}

impl Outcome {
    pub fn reply(status: u16, body: Value) -> Self {
        Outcome::Respond(Reply::json(status, body))
    }

    pub fn fail(error: impl Into<HandlerError>) -> Self {
        Outcome::Fail(error.into())
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Outcome::Respond(reply)
    }
}

impl From<HandlerError> for Outcome {
    fn from(error: HandlerError) -> Self {
        Outcome::Fail(error)
    }
}

/// One step of a compiled route.
///
/// Stages run strictly in order for a request; the first one that does not
/// return [`Outcome::Continue`] ends the request.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn call(&self, ctx: &mut Context) -> Outcome;
}

struct FnStage<F> {
    name: &'static str,
    f: F,
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut Context) -> Outcome + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        (self.f)(ctx)
    }
}

/// Wrap a closure as a handler stage.
pub fn handler<F>(f: F) -> Arc<dyn Stage>
where
    F: Fn(&mut Context) -> Outcome + Send + Sync + 'static,
{
    named("handler", f)
}

/// Wrap a closure as a stage with a name used in logs.
pub fn named<F>(name: &'static str, f: F) -> Arc<dyn Stage>
where
    F: Fn(&mut Context) -> Outcome + Send + Sync + 'static,
{
    Arc::new(FnStage { name, f })
}

/// Wrap a fallible closure; `Err` becomes [`Outcome::Fail`].
pub fn try_handler<F>(f: F) -> Arc<dyn Stage>
where
    F: Fn(&mut Context) -> Result<Reply, HandlerError> + Send + Sync + 'static,
{
    named("handler", move |ctx| match f(ctx) {
        Ok(reply) => Outcome::Respond(reply),
        Err(err) => Outcome::Fail(err),
    })
}

/// Values extracted and validated by the parameter stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub header: Option<Value>,
    pub path: Option<Value>,
    pub query: Option<Value>,
    pub form: Option<Value>,
    pub body: Option<Value>,
}

impl Params {
    pub fn get(&self, param_type: ParamType) -> Option<&Value> {
        match param_type {
            ParamType::Header => self.header.as_ref(),
            ParamType::Path => self.path.as_ref(),
            ParamType::Query => self.query.as_ref(),
            ParamType::Form => self.form.as_ref(),
            ParamType::Body => self.body.as_ref(),
        }
    }

    pub fn set(&mut self, param_type: ParamType, value: Value) {
        let slot = match param_type {
            ParamType::Header => &mut self.header,
            ParamType::Path => &mut self.path,
            ParamType::Query => &mut self.query,
            ParamType::Form => &mut self.form,
            ParamType::Body => &mut self.body,
        };
        *slot = Some(value);
    }

    /// A single validated value, e.g. `params.value(ParamType::Path, "petId")`.
    pub fn value(&self, param_type: ParamType, name: &str) -> Option<&Value> {
        self.get(param_type).and_then(|v| v.get(name))
    }
}

/// Per-request state shared by every stage of one route.
pub struct Context {
    pub request_id: RequestId,
    pub method: Method,
    /// Request target as received (path and query)
    pub target: String,
    pub headers: HeaderMap,
    /// Raw path captures from the trie match
    pub path_params: ParamVec,
    pub operation: Arc<OperationInfo>,
    /// Validated request values
    pub params: Params,
    /// Media type bound by content negotiation
    pub produces: Option<String>,
    /// Body bytes once the raw body stage has accepted them
    pub raw_body: Option<Vec<u8>>,
    /// Free-form request state for hooks (authenticated user, ...)
    pub extensions: Extensions,
    body: Option<Vec<u8>>,
}

impl Context {
    pub fn new(
        request_id: RequestId,
        method: Method,
        target: String,
        headers: HeaderMap,
        body: Vec<u8>,
        path_params: ParamVec,
        operation: Arc<OperationInfo>,
    ) -> Self {
        Context {
            request_id,
            method,
            target,
            headers,
            path_params,
            operation,
            params: Params::default(),
            produces: None,
            raw_body: None,
            extensions: Extensions::new(),
            body: Some(body),
        }
    }

    /// Path part of the request target.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map(|(p, _)| p)
            .unwrap_or(&self.target)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw capture for a path parameter (not yet validated).
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Length of the unread body, zero once it has been taken.
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Take the unread request body.
    pub fn take_body(&mut self) -> Vec<u8> {
        self.body.take().unwrap_or_default()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("target", &self.target)
            .field("operation", &self.operation.spec.nickname)
            .field("params", &self.params)
            .finish()
    }
}
