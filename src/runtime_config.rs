//! # Runtime Configuration Module
//!
//! Settings that affect how a framework is served rather than what it
//! declares.
//!
//! ## Environment Variables
//!
//! ### `SF_BODY_LIMIT`
//!
//! Largest accepted request body in bytes. Accepts decimal (`1048576`) or
//! hexadecimal (`0x100000`). Default: 1 MiB. Larger bodies get a 413.
//!
//! ### `SF_WORKERS`
//!
//! Number of HTTP worker threads. Default: 4.
//!
//! ## Service file
//!
//! `swagger-framework serve --config service.yaml` reads a [`ServiceConfig`]:
//!
//! ```yaml
//! framework:
//!   basePath: http://localhost:8080
//!   apiVersion: "1.0.0"
//!   docsPath: /api-docs
//! http:
//!   addr: 0.0.0.0:8080
//!   workers: 8
//!   body_limit: 0x200000
//! ```
//!
//! Values from the file override the environment.

use crate::schema::constants::DEFAULT_BODY_LIMIT;
use crate::spec::FrameworkOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::Path;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Request body limit in bytes (default: 1 MiB)
    pub body_limit: usize,
    /// HTTP worker threads (default: 4)
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            body_limit: DEFAULT_BODY_LIMIT,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Parse a size given in decimal or `0x` hexadecimal.
pub fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let body_limit = lookup("SF_BODY_LIMIT")
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_BODY_LIMIT);
        let workers = lookup("SF_WORKERS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_WORKERS);
        RuntimeConfig {
            body_limit,
            workers,
        }
    }
}

fn size_value<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(usize),
        Text(String),
    }
    match Option::<Size>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Size::Number(n)) => Ok(Some(n)),
        Some(Size::Text(s)) => parse_size(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid size: {}", s))),
    }
}

/// `http:` section of the service file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default, deserialize_with = "size_value")]
    pub body_limit: Option<usize>,
}

/// YAML service file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub framework: Option<FrameworkOptions>,
    #[serde(default)]
    pub http: HttpConfig,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid service config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// `runtime` with the file's `http:` values applied on top.
    pub fn runtime(&self, runtime: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            body_limit: self.http.body_limit.unwrap_or(runtime.body_limit),
            workers: self.http.workers.filter(|w| *w > 0).unwrap_or(runtime.workers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn runtime(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(runtime(&[]), RuntimeConfig::default());
        assert_eq!(runtime(&[]).body_limit, 1024 * 1024);
    }

    #[test]
    fn test_hex_and_decimal_sizes() {
        assert_eq!(runtime(&[("SF_BODY_LIMIT", "0x400")]).body_limit, 1024);
        assert_eq!(runtime(&[("SF_BODY_LIMIT", "2048")]).body_limit, 2048);
        assert_eq!(runtime(&[("SF_BODY_LIMIT", "lots")]).body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(runtime(&[("SF_WORKERS", "0")]).workers, DEFAULT_WORKERS);
        assert_eq!(runtime(&[("SF_WORKERS", "16")]).workers, 16);
    }

    #[test]
    fn test_service_config_yaml() {
        let config = ServiceConfig::parse(
            "framework:\n  basePath: http://localhost\n  apiVersion: \"1.0\"\nhttp:\n  addr: 0.0.0.0:9000\n  body_limit: 0x10\n",
        )
        .unwrap();
        let framework = config.framework.clone().unwrap();
        assert_eq!(framework.base_path, "http://localhost");
        assert_eq!(framework.api_version.as_deref(), Some("1.0"));
        assert_eq!(config.http.addr.as_deref(), Some("0.0.0.0:9000"));
        let merged = config.runtime(RuntimeConfig::default());
        assert_eq!(merged.body_limit, 16);
        assert_eq!(merged.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_empty_service_config() {
        let config = ServiceConfig::parse("{}").unwrap();
        assert!(config.framework.is_none());
        assert_eq!(config.http, HttpConfig::default());
    }
}
