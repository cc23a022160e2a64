//! Response body encoders keyed by media type.

use crate::schema::constants::{MIME_JSON, MIME_XML};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError(pub String);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encode failed: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}

/// Serializes a response value for one media type.
pub trait Encoder: Send + Sync {
    /// Value of the `Content-Type` header for encoded bodies.
    fn content_type(&self) -> &str;
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError>;
}

/// Pretty-printed JSON with a trailing newline.
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn content_type(&self) -> &str {
        "application/json; charset=utf-8"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut out = serde_json::to_vec_pretty(value).map_err(|e| EncodeError(e.to_string()))?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Minimal XML rendering: objects become elements, array entries `<item>`s.
pub struct XmlEncoder {
    root: String,
}

impl XmlEncoder {
    pub fn new(root: impl Into<String>) -> Self {
        XmlEncoder { root: root.into() }
    }
}

impl Default for XmlEncoder {
    fn default() -> Self {
        XmlEncoder::new("response")
    }
}

impl Encoder for XmlEncoder {
    fn content_type(&self) -> &str {
        "application/xml; charset=utf-8"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        write_element(&mut out, &self.root, value);
        out.push('\n');
        Ok(out.into_bytes())
    }
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    let tag = element_name(name);
    match value {
        Value::Null => {
            out.push('<');
            out.push_str(&tag);
            out.push_str("/>");
        }
        Value::Array(items) => {
            open(out, &tag);
            for item in items {
                write_element(out, "item", item);
            }
            close(out, &tag);
        }
        Value::Object(map) => {
            open(out, &tag);
            for (key, child) in map {
                write_element(out, key, child);
            }
            close(out, &tag);
        }
        Value::String(s) => {
            open(out, &tag);
            out.push_str(&escape(s));
            close(out, &tag);
        }
        other => {
            open(out, &tag);
            out.push_str(&other.to_string());
            close(out, &tag);
        }
    }
}

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn element_name(name: &str) -> String {
    let mut tag: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if tag.is_empty() || !tag.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        tag.insert(0, '_');
    }
    tag
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Encoders available to content negotiation.
#[derive(Clone)]
pub struct EncoderRegistry {
    encoders: HashMap<String, Arc<dyn Encoder>>,
}

impl EncoderRegistry {
    /// A registry with no encoders; JSON is still used as the fallback.
    pub fn empty() -> Self {
        EncoderRegistry {
            encoders: HashMap::new(),
        }
    }

    pub fn insert(&mut self, mime: &str, encoder: Arc<dyn Encoder>) {
        self.encoders.insert(mime.to_ascii_lowercase(), encoder);
    }

    pub fn get(&self, mime: &str) -> Option<&Arc<dyn Encoder>> {
        self.encoders.get(&essence(mime))
    }

    pub fn supports(&self, mime: &str) -> bool {
        self.get(mime).is_some()
    }

    /// Encoder for `mime`, or JSON when none is registered.
    pub fn select(&self, mime: Option<&str>) -> Arc<dyn Encoder> {
        mime.and_then(|m| self.get(m))
            .or_else(|| self.get(MIME_JSON))
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::new(JsonEncoder))
    }
}

impl fmt::Debug for EncoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mimes: Vec<&String> = self.encoders.keys().collect();
        mimes.sort();
        f.debug_struct("EncoderRegistry").field("mimes", &mimes).finish()
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        let mut registry = EncoderRegistry::empty();
        registry.insert(MIME_JSON, Arc::new(JsonEncoder));
        registry.insert(MIME_XML, Arc::new(XmlEncoder::default()));
        registry
    }
}

/// Media type without parameters, lower-cased.
pub(crate) fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_encoder_pretty_with_newline() {
        let out = JsonEncoder.encode(&json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_xml_encoder() {
        let out = XmlEncoder::default()
            .encode(&json!({"pet": {"id": 1, "name": "<dog>", "tags": ["a"], "owner": null}}))
            .unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<response><pet><id>1</id><name>&lt;dog&gt;</name><owner/><tags><item>a</item></tags></pet></response>"));
    }

    #[test]
    fn test_element_names_are_sanitized() {
        assert_eq!(element_name("x-ignore"), "x-ignore");
        assert_eq!(element_name("1st"), "_1st");
        assert_eq!(element_name("a b"), "a_b");
    }

    #[test]
    fn test_registry_lookup_by_essence() {
        let registry = EncoderRegistry::default();
        assert!(registry.supports("application/xml; charset=utf-8"));
        assert!(registry.supports("Application/JSON"));
        assert!(!registry.supports("text/csv"));
        assert_eq!(
            registry.select(Some("text/csv")).content_type(),
            "application/json; charset=utf-8"
        );
    }
}
