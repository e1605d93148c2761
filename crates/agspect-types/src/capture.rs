use crate::models::ParseTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata envelope for one intercepted HTTP exchange.
///
/// Produced by the capture layer; this crate only reads it. Body fields hold
/// decoded UTF-8 text (an SSE response body is the concatenated frame text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedExchange {
    /// Capture ordinal assigned by the producer.
    #[serde(default)]
    pub id: u64,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub api_provider: Option<String>,

    pub host: String,
    pub path: String,
    pub method: String,

    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub is_streaming: bool,

    #[serde(default)]
    pub request_headers: HashMap<String, String>,
    #[serde(default)]
    pub response_headers: HashMap<String, String>,

    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub response_body: Option<String>,
}

impl CapturedExchange {
    /// Select the body text a parse target refers to.
    pub fn body_for(&self, target: ParseTarget) -> Option<&str> {
        match target {
            ParseTarget::Request => self.request_body.as_deref(),
            ParseTarget::Response => self.response_body.as_deref(),
        }
    }

    /// Case-insensitive request header lookup.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.request_headers, name)
    }

    /// Case-insensitive response header lookup.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.response_headers, name)
    }
}

fn header_lookup<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    let lower = name.to_ascii_lowercase();
    headers
        .iter()
        .find(|(key, _)| key.to_ascii_lowercase() == lower)
        .map(|(_, value)| value.as_str())
}
