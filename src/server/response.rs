use super::encoder::EncoderRegistry;
use crate::error::HandlerError;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue, Method, StatusCode};
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::warn;

pub const MAX_INLINE_HEADERS: usize = 8;

/// Extra response headers set by stages and handlers.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Canonical reason phrase for a status code.
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// What a reply carries before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// Nothing supplied: the body becomes `{"message": <reason phrase>}`
    Default,
    /// No body at all
    Empty,
    /// A value encoded with the negotiated encoder
    Value(Value),
    /// An error; only exposed errors show their message
    Error(HandlerError),
    /// Pre-encoded bytes sent as-is
    Bytes { content_type: String, data: Vec<u8> },
}

/// A response produced by a stage or handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: ReplyBody,
}

impl Reply {
    pub fn new(status: u16, body: ReplyBody) -> Self {
        Reply {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Reply::new(status, ReplyBody::Value(body))
    }

    /// Status only; the body is the reason phrase.
    pub fn status(status: u16) -> Self {
        Reply::new(status, ReplyBody::Default)
    }

    /// `200 {"message": text}`.
    pub fn message(text: impl Into<String>) -> Self {
        Reply::json(200, json!({ "message": text.into() }))
    }

    pub fn empty(status: u16) -> Self {
        Reply::new(status, ReplyBody::Empty)
    }

    pub fn error(status: u16, error: HandlerError) -> Self {
        Reply::new(status, ReplyBody::Error(error))
    }

    pub fn bytes(status: u16, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Reply::new(
            status,
            ReplyBody::Bytes {
                content_type: content_type.into(),
                data,
            },
        )
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value.into());
        self
    }

    pub fn set_header(&mut self, name: &str, value: String) {
        if let Some((_, v)) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            *v = value;
        } else {
            self.headers.push((Arc::from(name), value));
        }
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encode into a wire response.
    ///
    /// `mime` is the media type bound by negotiation, if any. HEAD responses
    /// keep their headers (including `Content-Length`) but drop the body;
    /// 204 and 304 never carry content headers.
    pub fn encode(
        self,
        method: &Method,
        mime: Option<&str>,
        encoders: &EncoderRegistry,
    ) -> Result<http::Response<Vec<u8>>, HandlerError> {
        let Reply {
            status,
            headers,
            body,
        } = self;
        let payload: Option<(String, Vec<u8>)> = match body {
            ReplyBody::Empty => None,
            ReplyBody::Bytes { content_type, data } => Some((content_type, data)),
            ReplyBody::Default => Some(encode_value(
                &json!({ "message": status_reason(status) }),
                mime,
                encoders,
            )?),
            ReplyBody::Value(value) => Some(encode_value(&value, mime, encoders)?),
            ReplyBody::Error(err) => {
                let value = if err.expose {
                    let mut body = json!({ "message": err.message });
                    if let Some(errors) = &err.errors {
                        body["errors"] = json!(errors);
                    }
                    body
                } else {
                    json!({ "message": status_reason(status) })
                };
                Some(encode_value(&value, mime, encoders)?)
            }
        };

        let mut builder = http::Response::builder().status(status);
        let no_content = status == 204 || status == 304;

        let mut has_content_type = false;
        for (name, value) in &headers {
            if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                has_content_type = true;
            }
            if no_content
                && (name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
                    || name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str())
                    || name.eq_ignore_ascii_case(TRANSFER_ENCODING.as_str()))
            {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => builder = builder.header(n, v),
                _ => warn!(header = %name, "Dropping invalid response header"),
            }
        }

        let body = match payload {
            Some((content_type, data)) if !no_content => {
                if !has_content_type {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                builder = builder.header(CONTENT_LENGTH, data.len());
                data
            }
            _ => {
                if !no_content {
                    builder = builder.header(CONTENT_LENGTH, 0usize);
                }
                Vec::new()
            }
        };
        let body = if *method == Method::HEAD { Vec::new() } else { body };

        builder
            .body(body)
            .map_err(|e| HandlerError::new(format!("failed to build response: {}", e)))
    }
}

fn encode_value(
    value: &Value,
    mime: Option<&str>,
    encoders: &EncoderRegistry,
) -> Result<(String, Vec<u8>), HandlerError> {
    let encoder = encoders.select(mime);
    let data = encoder
        .encode(value)
        .map_err(|e| HandlerError::new(e.to_string()))?;
    Ok((encoder.content_type().to_string(), data))
}

/// Last-resort 500 used when encoding itself failed.
pub fn internal_error_response() -> http::Response<Vec<u8>> {
    let body = b"{\"message\":\"Internal Server Error\"}\n".to_vec();
    let mut response = http::Response::new(body);
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    let len = response.body().len();
    response.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(resp: &http::Response<Vec<u8>>) -> Value {
        serde_json::from_slice(resp.body()).unwrap()
    }

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(406), "Not Acceptable");
        assert_eq!(status_reason(599), "Unknown Status");
    }

    #[test]
    fn test_default_body_is_reason_phrase() {
        let resp = Reply::status(404)
            .encode(&Method::GET, None, &EncoderRegistry::default())
            .unwrap();
        assert_eq!(resp.status(), 404);
        assert_eq!(body_json(&resp), json!({"message": "Not Found"}));
        assert_eq!(
            resp.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_error_bodies_hide_unexposed_details() {
        let encoders = EncoderRegistry::default();
        let hidden = Reply::error(500, HandlerError::new("db password wrong"))
            .encode(&Method::GET, None, &encoders)
            .unwrap();
        assert_eq!(body_json(&hidden), json!({"message": "Internal Server Error"}));

        let shown = Reply::error(409, HandlerError::exposed(409, "Pet exists"))
            .encode(&Method::GET, None, &encoders)
            .unwrap();
        assert_eq!(body_json(&shown), json!({"message": "Pet exists"}));
    }

    #[test]
    fn test_head_keeps_length_without_body() {
        let resp = Reply::json(200, json!({"id": 1}))
            .encode(&Method::HEAD, None, &EncoderRegistry::default())
            .unwrap();
        assert!(resp.body().is_empty());
        let len: usize = resp.headers()[CONTENT_LENGTH].to_str().unwrap().parse().unwrap();
        assert!(len > 0);
    }

    #[test]
    fn test_no_content_strips_content_headers() {
        let resp = Reply::json(204, json!({"ignored": true}))
            .with_header("Content-Type", "text/plain")
            .encode(&Method::GET, None, &EncoderRegistry::default())
            .unwrap();
        assert!(resp.body().is_empty());
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert!(resp.headers().get(CONTENT_LENGTH).is_none());
    }

    #[test]
    fn test_negotiated_xml() {
        let resp = Reply::json(200, json!({"id": 1}))
            .encode(&Method::GET, Some("application/xml"), &EncoderRegistry::default())
            .unwrap();
        assert!(resp.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/xml"));
        assert!(String::from_utf8_lossy(resp.body()).contains("<id>1</id>"));
    }

    #[test]
    fn test_message_shorthand() {
        assert_eq!(Reply::message("hello"), Reply::json(200, json!({"message": "hello"})));
    }
}
