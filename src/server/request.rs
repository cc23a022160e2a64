use crate::schema::constants::is_single_header;
use http::HeaderMap;
use serde_json::{Map, Value};

/// Collect key/value pairs into a JSON object.
///
/// A key seen once maps to a string; a repeated key maps to an array of its
/// values in the order they appeared.
pub fn group_pairs<I, K, V>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut out = Map::new();
    for (k, v) in pairs {
        let key: String = k.into();
        let value = Value::String(v.into());
        match out.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    out
}

/// Parse the query string of a request target (`/pet?status=sold`).
///
/// Names and values are URL-decoded.
pub fn parse_query_params(target: &str) -> Map<String, Value> {
    match target.split_once('?') {
        Some((_, query)) => group_pairs(url::form_urlencoded::parse(query.as_bytes())),
        None => Map::new(),
    }
}

/// All values of a header, lossily decoded.
pub fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name.to_ascii_lowercase().as_str())
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect()
}

/// Header value as the extraction stage sees it.
///
/// Multi-valued parameters split each occurrence on `,` unless the header is
/// one that must stay whole; single-valued parameters join repeats with `, `.
pub fn header_param(headers: &HeaderMap, name: &str, multiple: bool) -> Option<Value> {
    let values = header_values(headers, name);
    if values.is_empty() {
        return None;
    }
    if multiple {
        let parts: Vec<Value> = if is_single_header(name) {
            values.into_iter().map(Value::String).collect()
        } else {
            values
                .iter()
                .flat_map(|v| v.split(','))
                .map(|s| Value::String(s.trim().to_string()))
                .collect()
        };
        return Some(Value::Array(parts));
    }
    Some(Value::String(values.join(", ")))
}

/// Single header value as a string, if present and valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name.to_ascii_lowercase().as_str())
        .and_then(|v| v.to_str().ok())
}
