use super::core::Docs;
use crate::ids::RequestId;
use crate::router::REQUEST_ID_HEADER;
use crate::schema::constants::MIME_JSON;
use crate::server::request::header_str;
use crate::server::response::internal_error_response;
use crate::server::{EncoderRegistry, Reply};
use http::{HeaderValue, Method, Request, Response};
use serde::Serialize;
use tracing::{debug, error};

/// HTTP surface for [`Docs`].
///
/// The index is served at the prefix (with or without a trailing slash),
/// each declaration at `prefix + resourcePath`. Only `GET` and `HEAD` are
/// accepted.
#[derive(Debug, Clone)]
pub struct DocsRouter {
    docs: Docs,
    prefix: String,
    encoders: EncoderRegistry,
}

enum Target {
    Index,
    Declaration(String),
}

impl DocsRouter {
    pub fn new(docs: Docs, prefix: &str) -> Self {
        DocsRouter {
            docs,
            prefix: prefix.trim_end_matches('/').to_string(),
            encoders: EncoderRegistry::default(),
        }
    }

    pub fn docs(&self) -> &Docs {
        &self.docs
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Is `path` served by this router?
    pub fn matches(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    fn resolve(&self, path: &str) -> Option<Target> {
        let rest = path.strip_prefix(&self.prefix)?;
        if rest.is_empty() || rest == "/" {
            return Some(Target::Index);
        }
        self.docs
            .resource_paths()
            .find(|p| *p == rest)
            .map(|p| Target::Declaration(p.to_string()))
    }

    /// Serve a docs request, or `None` when the path is not a docs path.
    pub fn handle(&self, req: Request<Vec<u8>>) -> Option<Response<Vec<u8>>> {
        let target = self.resolve(req.uri().path())?;
        let method = req.method().clone();
        let request_id = RequestId::from_header_or_new(header_str(req.headers(), REQUEST_ID_HEADER));

        if method != Method::GET && method != Method::HEAD {
            debug!(request_id = %request_id, method = %method, "Docs method not allowed");
            return Some(self.finish(
                Reply::status(405).with_header("Allow", "GET HEAD"),
                &method,
                request_id,
            ));
        }

        let reply = match target {
            Target::Index => to_reply(&self.docs.index()),
            Target::Declaration(resource_path) => match self.docs.declaration(&resource_path) {
                Some(declaration) => to_reply(&declaration),
                None => Reply::status(404),
            },
        };
        Some(self.finish(reply, &method, request_id))
    }

    /// Serve a docs request, answering 404 for unknown paths.
    pub fn dispatch(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let method = req.method().clone();
        let request_id = RequestId::from_header_or_new(header_str(req.headers(), REQUEST_ID_HEADER));
        match self.handle(req) {
            Some(response) => response,
            None => self.finish(Reply::status(404), &method, request_id),
        }
    }

    fn finish(&self, reply: Reply, method: &Method, request_id: RequestId) -> Response<Vec<u8>> {
        let mut response = match reply.encode(method, Some(MIME_JSON), &self.encoders) {
            Ok(response) => response,
            Err(err) => {
                error!(request_id = %request_id, error = %err, "Failed to encode docs");
                internal_error_response()
            }
        };
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

fn to_reply<T: Serialize>(document: &T) -> Reply {
    match serde_json::to_value(document) {
        Ok(value) => Reply::json(200, value),
        Err(err) => {
            error!(error = %err, "Failed to serialize docs");
            Reply::status(500)
        }
    }
}
