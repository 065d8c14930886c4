use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::types::{BasicAuth, Method};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Static description of an HTTP endpoint.
///
/// Deserialize this from whatever format the host loads its device
/// configuration from, then hand it to
/// [`HttpProvider::from_config`](crate::HttpProvider::from_config).
///
/// ```ignore
/// let config = EndpointConfig::from_json(r#"{
///     "uri": "http://192.168.1.20/cm?cmd=Power%20{{.state}}",
///     "method": "get",
///     "timeout_ms": 2000
/// }"#)?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// URL template
    pub uri: String,

    /// HTTP verb, case-insensitive
    #[serde(default, deserialize_with = "method_from_str")]
    pub method: Method,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Body template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,

    /// Bound on a full request/response round trip
    #[serde(rename = "timeout_ms", default = "default_timeout", with = "millis")]
    pub timeout: Duration,

    /// Reserved for a caching decorator; zero disables caching
    #[serde(rename = "cache_ms", default, with = "millis")]
    pub cache: Duration,

    /// Reserved for callers converting the string value; never applied here
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl EndpointConfig {
    /// A GET endpoint with default tuning.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: Method::GET,
            headers: HashMap::new(),
            body: None,
            insecure: false,
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            cache: Duration::ZERO,
            scale: default_scale(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_scale() -> f64 {
    1.0
}

fn method_from_str<'de, D>(deserializer: D) -> std::result::Result<Method, D::Error>
where
    D: Deserializer<'de>,
{
    let method = String::deserialize(deserializer)?;
    method.parse().map_err(serde::de::Error::custom)
}

/// Durations as integer milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = EndpointConfig::from_json(r#"{"uri": "http://dev/status"}"#).unwrap();
        assert_eq!(config, EndpointConfig::new("http://dev/status"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.cache.is_zero());
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn full_config() {
        let config = EndpointConfig::from_json(
            r#"{
                "uri": "https://dev/api/{{.mode}}",
                "method": "post",
                "headers": {"content-type": "application/json"},
                "body": "{\"mode\": \"{{.mode}}\"}",
                "insecure": true,
                "auth": {"user": "admin", "password": "secret"},
                "timeout_ms": 1500,
                "cache_ms": 5000,
                "scale": 0.001
            }"#,
        )
        .unwrap();

        assert_eq!(config.method, Method::POST);
        assert_eq!(config.headers["content-type"], "application/json");
        assert_eq!(config.body.as_deref(), Some(r#"{"mode": "{{.mode}}"}"#));
        assert!(config.insecure);
        assert_eq!(config.auth.unwrap().user, "admin");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.cache, Duration::from_secs(5));
        assert_eq!(config.scale, 0.001);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = EndpointConfig::from_json(r#"{"uri": "http://dev", "method": "FETCH"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn serializes_durations_as_millis() {
        let mut config = EndpointConfig::new("http://dev");
        config.timeout = Duration::from_millis(750);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["timeout_ms"], 750);
        assert_eq!(value["cache_ms"], 0);
        assert_eq!(value["method"], "GET");
    }
}
