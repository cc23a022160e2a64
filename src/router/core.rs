use super::radix::{translate_path, ParamVec, RadixRouter};
use crate::error::{DeclarationError, HandlerError};
use crate::framework::{Attached, Framework, Operation, OperationInfo};
use crate::ids::RequestId;
use crate::middleware::{
    BodyStage, ConsumesStage, Context, FormStage, Outcome, ParamInfo, ParamStage, ProducesStage,
    RawBodyStage, Stage,
};
use crate::server::request::header_str;
use crate::server::response::internal_error_response;
use crate::server::{EncoderRegistry, Reply};
use crate::spec::ParamType;
use http::{HeaderValue, Method, Request, Response};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One operation compiled into its ordered stage list.
pub struct CompiledRoute {
    pub info: Arc<OperationInfo>,
    stages: Vec<Arc<dyn Stage>>,
}

impl CompiledRoute {
    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn compile(
        framework: &Framework,
        operation: &Operation,
        attached: &Attached,
    ) -> Result<CompiledRoute, DeclarationError> {
        let nickname = &attached.info.spec.nickname;
        let env = framework.env();
        let compile = |location: ParamType| -> Result<Option<Arc<dyn Stage>>, DeclarationError> {
            let Some(schema) = attached.schemas.get(&location) else {
                return Ok(None);
            };
            let compiled = env.compile(schema, &format!("{} {}", nickname, location))?;
            let params: Vec<ParamInfo> = operation
                .spec()
                .parameters_in(location)
                .map(ParamInfo::from)
                .collect();
            let stage: Arc<dyn Stage> = match location {
                ParamType::Form => Arc::new(FormStage::new(
                    compiled,
                    params,
                    framework.decoders().clone(),
                )),
                ParamType::Body => Arc::new(BodyStage::new(compiled, framework.decoders().clone())),
                _ => Arc::new(ParamStage::new(location, compiled, params)),
            };
            Ok(Some(stage))
        };

        let has_body = attached.info.method != Method::GET && attached.info.method != Method::HEAD;
        let hooks = &attached.hooks;
        let mut stages: Vec<Arc<dyn Stage>> = Vec::new();

        stages.extend(hooks.before.clone());
        stages.extend(compile(ParamType::Header)?);
        if !attached.produces.is_empty() {
            stages.push(Arc::new(ProducesStage::new(attached.produces.clone())));
        }
        stages.extend(compile(ParamType::Path)?);
        stages.extend(compile(ParamType::Query)?);
        stages.extend(hooks.authenticate.clone());
        if has_body {
            if !attached.consumes.is_empty() {
                stages.push(Arc::new(ConsumesStage::new(attached.consumes.clone())));
            }
            stages.push(Arc::new(RawBodyStage::new(framework.max_body_size())));
            stages.extend(compile(ParamType::Form)?);
            stages.extend(compile(ParamType::Body)?);
        }
        stages.extend(hooks.authorize.clone());
        stages.extend(hooks.after.clone());
        stages.extend(operation.handlers().iter().cloned());

        Ok(CompiledRoute {
            info: attached.info.clone(),
            stages,
        })
    }

    /// Run the stages in order until one answers.
    fn run(&self, ctx: &mut Context) -> Reply {
        for stage in &self.stages {
            let outcome = catch_unwind(AssertUnwindSafe(|| stage.call(ctx)));
            match outcome {
                Ok(Outcome::Continue) => continue,
                Ok(Outcome::Respond(reply)) => return reply,
                Ok(Outcome::Fail(err)) => {
                    let status = err.response_status();
                    if status >= 500 {
                        error!(
                            request_id = %ctx.request_id,
                            nickname = %self.info.spec.nickname,
                            stage = %stage.name(),
                            error = %err.message,
                            "Stage failed"
                        );
                    } else {
                        debug!(
                            request_id = %ctx.request_id,
                            stage = %stage.name(),
                            status,
                            error = %err.message,
                            "Stage failed"
                        );
                    }
                    return Reply::error(status, err);
                }
                Err(panic) => {
                    let detail = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(
                        request_id = %ctx.request_id,
                        nickname = %self.info.spec.nickname,
                        stage = %stage.name(),
                        panic = %detail,
                        "Stage panicked"
                    );
                    return Reply::error(500, HandlerError::new(detail));
                }
            }
        }
        warn!(
            request_id = %ctx.request_id,
            nickname = %self.info.spec.nickname,
            "No handler produced a response"
        );
        Reply::error(400, HandlerError::exposed(400, "No handler produced a response"))
    }
}

/// The compiled dispatcher.
///
/// Built once from a set up [`Framework`]; immutable afterwards and shared
/// across worker threads.
pub struct Router {
    trie: RadixRouter<CompiledRoute>,
    encoders: EncoderRegistry,
    body_limit: usize,
}

impl Router {
    /// Compile every operation of every Api into the path trie.
    pub fn build(framework: &Framework) -> Result<Router, DeclarationError> {
        let mut trie = RadixRouter::new();
        let mut summary = Vec::new();
        for api in framework.apis() {
            for resource in api.resources() {
                let path = translate_path(resource.path());
                for operation in resource.operations() {
                    let Some(attached) = operation.attached() else {
                        return Err(DeclarationError::Invalid {
                            entity: "operation",
                            message: format!("{} was never set up", operation.nickname()),
                            errors: Vec::new(),
                        });
                    };
                    let route = CompiledRoute::compile(framework, operation, attached)?;
                    let method = attached.info.method.clone();
                    if !trie.insert(&path, method.clone(), Arc::new(route)) {
                        return Err(DeclarationError::DuplicateOperation {
                            method: method.to_string(),
                            path: resource.path().to_string(),
                        });
                    }
                    if summary.len() < 10 {
                        summary.push(format!("{} {}", method, path));
                    }
                }
            }
        }
        info!(
            routes_count = trie.len(),
            routes_summary = ?summary,
            "Routing table built"
        );
        Ok(Router {
            trie,
            encoders: framework.encoders().clone(),
            body_limit: framework.max_body_size(),
        })
    }

    /// Compiled route for `method` on `path`, without running it.
    pub fn route(&self, method: &Method, path: &str) -> Option<(Arc<CompiledRoute>, ParamVec)> {
        self.trie.route(method, path)
    }

    pub fn routes_count(&self) -> usize {
        self.trie.len()
    }

    /// Largest request body the raw body stage accepts.
    pub fn max_body_size(&self) -> usize {
        self.body_limit
    }

    /// Handle a request, or `None` when no declared path matches.
    pub fn handle(&self, req: Request<Vec<u8>>) -> Option<Response<Vec<u8>>> {
        let (parts, body) = req.into_parts();
        let request_id = RequestId::from_header_or_new(header_str(&parts.headers, REQUEST_ID_HEADER));
        let path = parts.uri.path().to_string();

        let Some((table, path_params)) = self.trie.find(&path) else {
            debug!(
                request_id = %request_id,
                method = %parts.method,
                path = %path,
                "No route matched"
            );
            return None;
        };

        let route = table.get(&parts.method).or_else(|| {
            (parts.method == Method::HEAD)
                .then(|| table.get(&Method::GET))
                .flatten()
        });
        let Some(route) = route else {
            let allow = table
                .methods()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            let reply = if parts.method == Method::OPTIONS {
                Reply::empty(200).with_header("Allow", allow)
            } else {
                debug!(
                    request_id = %request_id,
                    method = %parts.method,
                    path = %path,
                    allow = %allow,
                    "Method not allowed"
                );
                Reply::status(405).with_header("Allow", allow)
            };
            return Some(self.finish(reply, &parts.method, None, request_id));
        };

        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or(path);
        let mut ctx = Context::new(
            request_id,
            parts.method.clone(),
            target,
            parts.headers,
            body,
            path_params,
            route.info.clone(),
        );
        debug!(
            request_id = %request_id,
            method = %parts.method,
            nickname = %route.info.spec.nickname,
            "Route matched"
        );
        let reply = route.run(&mut ctx);
        Some(self.finish(reply, &parts.method, ctx.produces.as_deref(), request_id))
    }

    /// Handle a request, answering 404 when nothing matches.
    pub fn dispatch(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let method = req.method().clone();
        let request_id = RequestId::from_header_or_new(header_str(req.headers(), REQUEST_ID_HEADER));
        match self.handle(req) {
            Some(response) => response,
            None => self.finish(Reply::status(404), &method, None, request_id),
        }
    }

    /// Answer `req` with `reply` without routing it.
    ///
    /// Used by adapters that reject a request before it is fully read.
    pub fn respond(&self, req: &Request<Vec<u8>>, reply: Reply) -> Response<Vec<u8>> {
        let request_id = RequestId::from_header_or_new(header_str(req.headers(), REQUEST_ID_HEADER));
        self.finish(reply, req.method(), None, request_id)
    }

    fn finish(
        &self,
        reply: Reply,
        method: &Method,
        mime: Option<&str>,
        request_id: RequestId,
    ) -> Response<Vec<u8>> {
        let mut response = match reply.encode(method, mime, &self.encoders) {
            Ok(response) => response,
            Err(err) => {
                error!(request_id = %request_id, error = %err, "Failed to encode reply");
                internal_error_response()
            }
        };
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.trie.len())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}
