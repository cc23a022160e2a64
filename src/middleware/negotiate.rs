//! Content negotiation: `Accept` against `produces`, `Content-Type` against `consumes`.

use super::core::{Context, Outcome, Stage};
use crate::error::HandlerError;
use crate::server::Reply;
use tracing::debug;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub kind: String,
    pub subtype: String,
    pub q: f32,
}

impl MediaRange {
    pub fn parse(raw: &str) -> Option<MediaRange> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = essence.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        let mut q = 1.0;
        for param in parts {
            if let Some((k, v)) = param.split_once('=') {
                if k.trim().eq_ignore_ascii_case("q") {
                    q = v.trim().parse().unwrap_or(0.0);
                }
            }
        }
        Some(MediaRange {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            q,
        })
    }

    /// Match specificity against a concrete media type, `None` when it does not match.
    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", "*") => Some(0),
            (k, "*") if k == kind => Some(1),
            (k, s) if k == kind && s == subtype => Some(2),
            _ => None,
        }
    }
}

pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    header.split(',').filter_map(MediaRange::parse).collect()
}

fn split_essence(mime: &str) -> Option<(String, String)> {
    let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;
    Some((kind.to_string(), subtype.to_string()))
}

/// Pick the response media type.
///
/// Declared order is the tie-break: the first `produces` entry the client
/// accepts with a non-zero quality wins. A missing or empty `Accept` takes the
/// first declared type.
pub fn negotiate<'a>(accept: Option<&str>, produces: &'a [String]) -> Option<&'a str> {
    let ranges = match accept.map(str::trim) {
        None | Some("") => return produces.first().map(String::as_str),
        Some(header) => parse_accept(header),
    };
    produces
        .iter()
        .find(|candidate| {
            let Some((kind, subtype)) = split_essence(candidate) else {
                return false;
            };
            ranges
                .iter()
                .filter_map(|r| r.specificity(&kind, &subtype).map(|s| (s, r.q)))
                .max_by_key(|(s, _)| *s)
                .map(|(_, q)| q > 0.0)
                .unwrap_or(false)
        })
        .map(String::as_str)
}

/// Does `content_type` fall within one of the declared `consumes` types?
pub fn is_supported(content_type: &str, consumes: &[String]) -> bool {
    let Some((kind, subtype)) = split_essence(content_type) else {
        return false;
    };
    consumes.iter().any(|declared| {
        MediaRange::parse(declared)
            .and_then(|r| r.specificity(&kind, &subtype))
            .is_some()
    })
}

/// Binds the response media type or answers 406.
pub struct ProducesStage {
    produces: Vec<String>,
}

impl ProducesStage {
    pub fn new(produces: Vec<String>) -> Self {
        ProducesStage { produces }
    }
}

impl Stage for ProducesStage {
    fn name(&self) -> &str {
        "produces"
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        let accept = ctx.header("accept");
        match negotiate(accept, &self.produces) {
            Some(mime) => {
                ctx.produces = Some(mime.to_string());
                Outcome::Continue
            }
            None => {
                let message = format!(
                    "Not acceptable ({}), supports: {}",
                    accept.unwrap_or_default(),
                    self.produces.join(", ")
                );
                debug!(request_id = %ctx.request_id, %message, "Negotiation failed");
                Outcome::Respond(Reply::error(406, HandlerError::exposed(406, message)))
            }
        }
    }
}

/// Rejects request bodies whose `Content-Type` is not declared.
pub struct ConsumesStage {
    consumes: Vec<String>,
}

impl ConsumesStage {
    pub fn new(consumes: Vec<String>) -> Self {
        ConsumesStage { consumes }
    }
}

impl Stage for ConsumesStage {
    fn name(&self) -> &str {
        "consumes"
    }

    fn call(&self, ctx: &mut Context) -> Outcome {
        let supported = match ctx.content_type() {
            Some(content_type) => is_supported(content_type, &self.consumes),
            // nothing to decode
            None => ctx.body_len() == 0,
        };
        if supported {
            return Outcome::Continue;
        }
        let message = format!(
            "Unsupported Content-Type ({}), supports: {}",
            ctx.content_type().unwrap_or_default(),
            self.consumes.join(", ")
        );
        debug!(request_id = %ctx.request_id, %message, "Negotiation failed");
        Outcome::Respond(Reply::error(415, HandlerError::exposed(415, message)))
    }
}
