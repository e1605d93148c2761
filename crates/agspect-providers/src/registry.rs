use crate::error::{Error, Result};
use crate::{anthropic, google, openai};
use serde_json::Value;

/// Providers with summary support, in display order.
pub fn provider_names() -> &'static [&'static str] {
    &["anthropic", "openai", "google"]
}

/// Summarize a request body for a named provider.
pub fn summarize_request(provider: &str, body: &Value) -> Result<Value> {
    match provider {
        "anthropic" => Ok(serde_json::to_value(anthropic::summarize_request(body))?),
        "openai" => Ok(serde_json::to_value(openai::summarize_request(body))?),
        "google" => Ok(serde_json::to_value(google::summarize_request(body))?),
        other => Err(Error::Provider(format!("Unknown provider: {}", other))),
    }
}

/// Summarize a response body for a named provider.
pub fn summarize_response(provider: &str, body: &Value) -> Result<Value> {
    match provider {
        "anthropic" => Ok(serde_json::to_value(anthropic::summarize_response(body))?),
        "openai" => Ok(serde_json::to_value(openai::summarize_response(body))?),
        "google" => Ok(serde_json::to_value(google::summarize_response(body))?),
        other => Err(Error::Provider(format!("Unknown provider: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_provider_name() {
        let body = serde_json::json!({ "model": "m", "messages": [] });

        for provider in provider_names() {
            assert!(summarize_request(provider, &body).is_ok());
            assert!(summarize_response(provider, &body).is_ok());
        }
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let body = serde_json::json!({});
        let err = summarize_request("mistral", &body).unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }
}
