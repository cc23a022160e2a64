/// Type names that never refer to a model.
pub const NOT_MODEL_TYPES: [&str; 8] = [
    "array", "boolean", "integer", "string", "null", "number", "object", "void",
];

/// Types a non-body parameter may declare.
pub const PRIMITIVE_TYPES: [&str; 4] = ["boolean", "integer", "number", "string"];

/// String formats a parameter schema keeps; every other format is documentation only.
pub const VALIDATED_STRING_FORMATS: [&str; 2] = ["date", "date-time"];

/// Headers whose value is never split on `,` even for `allowMultiple` parameters.
pub const SINGLE_HEADERS: [&str; 12] = [
    "content-type",
    "content-length",
    "user-agent",
    "referer",
    "host",
    "authorization",
    "proxy-authorization",
    "if-modified-since",
    "if-unmodified-since",
    "from",
    "location",
    "max-forwards",
];

pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "application/xml";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Default cap on request body size.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

pub fn is_model_type(type_name: &str) -> bool {
    !NOT_MODEL_TYPES.contains(&type_name)
}

pub fn is_single_header(name: &str) -> bool {
    SINGLE_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}
