//! Request body decoders keyed by media type.

use super::encoder::essence;
use super::request::group_pairs;
use crate::schema::constants::{MIME_FORM, MIME_JSON};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A body that could not be parsed; the parser message is shown to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DecodeError {}

pub trait Decoder: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError>;
}

pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        serde_json::from_slice(body).map_err(|e| DecodeError(e.to_string()))
    }
}

/// `application/x-www-form-urlencoded`; repeated keys collect into arrays.
pub struct FormDecoder;

impl Decoder for FormDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, DecodeError> {
        Ok(Value::Object(group_pairs(url::form_urlencoded::parse(body))))
    }
}

#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn Decoder>>,
}

impl DecoderRegistry {
    pub fn empty() -> Self {
        DecoderRegistry {
            decoders: HashMap::new(),
        }
    }

    pub fn insert(&mut self, mime: &str, decoder: Arc<dyn Decoder>) {
        self.decoders.insert(mime.to_ascii_lowercase(), decoder);
    }

    /// Decoder registered for the essence of `content_type`.
    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn Decoder>> {
        self.decoders.get(&essence(content_type))
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mimes: Vec<&String> = self.decoders.keys().collect();
        mimes.sort();
        f.debug_struct("DecoderRegistry").field("mimes", &mimes).finish()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut registry = DecoderRegistry::empty();
        registry.insert(MIME_JSON, Arc::new(JsonDecoder));
        registry.insert(MIME_FORM, Arc::new(FormDecoder));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_decoder_reports_parser_message() {
        let err = JsonDecoder.decode(b"{\"a\":").unwrap_err();
        assert!(err.0.contains("EOF"));
        assert_eq!(JsonDecoder.decode(b"[1]").unwrap(), json!([1]));
    }

    #[test]
    fn test_form_decoder_groups_repeated_keys() {
        let value = FormDecoder.decode(b"name=doggie&status=sold&tag=a&tag=b+c").unwrap();
        assert_eq!(
            value,
            json!({"name": "doggie", "status": "sold", "tag": ["a", "b c"]})
        );
    }

    #[test]
    fn test_registry_matches_content_type_with_charset() {
        let registry = DecoderRegistry::default();
        assert!(registry.get("application/json; charset=utf-8").is_some());
        assert!(registry.get("text/plain").is_none());
    }
}
