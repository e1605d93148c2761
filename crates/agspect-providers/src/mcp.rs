use serde::Serialize;
use serde_json::Value;

/// JSON-RPC message shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpMessageKind {
    Request,
    Notification,
    Response,
    Unknown,
}

impl McpMessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpMessageKind::Request => "request",
            McpMessageKind::Notification => "notification",
            McpMessageKind::Response => "response",
            McpMessageKind::Unknown => "unknown",
        }
    }
}

/// Semantic grouping of MCP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpCategory {
    Lifecycle,
    Tools,
    Resources,
    Prompts,
    Completion,
    Logging,
    Sampling,
    Notifications,
    Custom,
}

const METHOD_CATEGORIES: [(&str, McpCategory); 19] = [
    ("initialize", McpCategory::Lifecycle),
    ("initialized", McpCategory::Lifecycle),
    ("shutdown", McpCategory::Lifecycle),
    ("notifications/initialized", McpCategory::Lifecycle),
    ("notifications/cancelled", McpCategory::Lifecycle),
    ("tools/list", McpCategory::Tools),
    ("tools/call", McpCategory::Tools),
    ("resources/list", McpCategory::Resources),
    ("resources/read", McpCategory::Resources),
    ("resources/subscribe", McpCategory::Resources),
    ("resources/unsubscribe", McpCategory::Resources),
    ("prompts/list", McpCategory::Prompts),
    ("prompts/get", McpCategory::Prompts),
    ("completion/complete", McpCategory::Completion),
    ("logging/setLevel", McpCategory::Logging),
    ("notifications/resources/updated", McpCategory::Resources),
    ("notifications/resources/list_changed", McpCategory::Resources),
    ("notifications/tools/list_changed", McpCategory::Tools),
    ("notifications/prompts/list_changed", McpCategory::Prompts),
];

/// Map a method to its category; unknown methods fall back on their prefix
/// and finally on Custom.
pub fn classify_method(method: &str) -> McpCategory {
    if let Some((_, category)) = METHOD_CATEGORIES.iter().find(|(name, _)| *name == method) {
        return *category;
    }

    let prefix = method.split('/').next().unwrap_or(method);
    match prefix {
        "tools" => McpCategory::Tools,
        "resources" => McpCategory::Resources,
        "prompts" => McpCategory::Prompts,
        "notifications" => McpCategory::Notifications,
        "completion" => McpCategory::Completion,
        "logging" => McpCategory::Logging,
        "sampling" => McpCategory::Sampling,
        _ => McpCategory::Custom,
    }
}

/// Typed digest of one MCP message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McpSummary {
    pub jsonrpc: String,
    pub kind: McpMessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<McpCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Summarize one JSON-RPC message. Total: any shape produces a digest, with
/// Unknown kind for bodies that are neither call nor response.
pub fn summarize_message(body: &Value) -> McpSummary {
    let id = body.get("id").filter(|value| !value.is_null()).cloned();
    let method = body
        .get("method")
        .and_then(Value::as_str)
        .map(str::to_string);
    let result = body.get("result");
    let error = body.get("error");

    let kind = if method.is_some() {
        if id.is_none() {
            McpMessageKind::Notification
        } else {
            McpMessageKind::Request
        }
    } else if result.is_some() || error.is_some() {
        McpMessageKind::Response
    } else {
        McpMessageKind::Unknown
    };

    let mut summary = McpSummary {
        jsonrpc: body
            .get("jsonrpc")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        kind,
        id,
        category: method.as_deref().map(classify_method),
        method,
        params: None,
        is_error: None,
        error_code: None,
        error_message: None,
        result: None,
    };

    if matches!(kind, McpMessageKind::Request | McpMessageKind::Notification) {
        let params = body.get("params").cloned().unwrap_or(Value::Null);
        summary.params = Some(summarize_params(
            summary.method.as_deref().unwrap_or(""),
            &params,
        ));
    }

    if kind == McpMessageKind::Response {
        if let Some(error) = error {
            summary.is_error = Some(true);
            summary.error_code = error.get("code").and_then(Value::as_i64).or(Some(0));
            summary.error_message = Some(match error {
                Value::Object(_) => error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                other => other.to_string(),
            });
        } else {
            summary.is_error = Some(false);
            summary.result = Some(summarize_result(result.unwrap_or(&Value::Null)));
        }
    }

    summary
}

fn summarize_params(method: &str, params: &Value) -> Value {
    let Some(map) = params.as_object() else {
        return serde_json::json!({});
    };

    match method {
        "tools/call" => serde_json::json!({
            "tool_name": map.get("name").and_then(Value::as_str).unwrap_or(""),
            "has_arguments": map.get("arguments").is_some_and(|args| !args.is_null()),
            "argument_keys": map
                .get("arguments")
                .and_then(Value::as_object)
                .map(|args| args.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default(),
        }),
        "resources/read" => serde_json::json!({
            "uri": map.get("uri").and_then(Value::as_str).unwrap_or(""),
        }),
        "prompts/get" => serde_json::json!({
            "prompt_name": map.get("name").and_then(Value::as_str).unwrap_or(""),
            "has_arguments": map.get("arguments").is_some_and(|args| !args.is_null()),
        }),
        "initialize" => {
            let client_info = map.get("clientInfo").and_then(Value::as_object);
            serde_json::json!({
                "protocol_version": map.get("protocolVersion").and_then(Value::as_str).unwrap_or(""),
                "client_name": client_info
                    .and_then(|info| info.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or(""),
                "client_version": client_info
                    .and_then(|info| info.get("version"))
                    .and_then(Value::as_str)
                    .unwrap_or(""),
                "capabilities": map
                    .get("capabilities")
                    .and_then(Value::as_object)
                    .map(|caps| caps.keys().cloned().collect::<Vec<_>>())
                    .unwrap_or_default(),
            })
        }
        "completion/complete" => serde_json::json!({
            "ref_type": map
                .get("ref")
                .and_then(|reference| reference.get("type"))
                .and_then(Value::as_str)
                .unwrap_or(""),
            "argument_name": map
                .get("argument")
                .and_then(|argument| argument.get("name"))
                .and_then(Value::as_str)
                .unwrap_or(""),
        }),
        _ => {
            if map.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::json!({ "keys": map.keys().cloned().collect::<Vec<_>>() })
            }
        }
    }
}

fn summarize_result(result: &Value) -> Value {
    match result {
        Value::Null => serde_json::json!({ "type": "null" }),
        Value::Object(map) => {
            let mut summary = serde_json::Map::new();
            summary.insert(
                "keys".to_string(),
                Value::from(map.keys().cloned().collect::<Vec<_>>()),
            );

            if let Some(tools) = map.get("tools").and_then(Value::as_array) {
                summary.insert("tool_count".to_string(), Value::from(tools.len()));
                let names: Vec<String> = tools
                    .iter()
                    .filter(|tool| tool.is_object())
                    .map(|tool| {
                        tool.get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect();
                summary.insert("tool_names".to_string(), Value::from(names));
            }
            if let Some(resources) = map.get("resources").and_then(Value::as_array) {
                summary.insert("resource_count".to_string(), Value::from(resources.len()));
            }
            if let Some(prompts) = map.get("prompts").and_then(Value::as_array) {
                summary.insert("prompt_count".to_string(), Value::from(prompts.len()));
            }
            if let Some(content) = map.get("content").and_then(Value::as_array) {
                summary.insert("content_count".to_string(), Value::from(content.len()));
            }
            if let Some(info) = map.get("serverInfo").and_then(Value::as_object) {
                summary.insert(
                    "server_name".to_string(),
                    info.get("name").cloned().unwrap_or(Value::from("")),
                );
                summary.insert(
                    "server_version".to_string(),
                    info.get("version").cloned().unwrap_or(Value::from("")),
                );
            }

            Value::Object(summary)
        }
        Value::Array(items) => serde_json::json!({ "type": "list", "length": items.len() }),
        Value::Bool(_) => serde_json::json!({ "type": "bool" }),
        Value::Number(_) => serde_json::json!({ "type": "number" }),
        Value::String(_) => serde_json::json!({ "type": "string" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_and_prefixed_methods() {
        assert_eq!(classify_method("tools/call"), McpCategory::Tools);
        assert_eq!(classify_method("initialize"), McpCategory::Lifecycle);
        assert_eq!(classify_method("tools/archive"), McpCategory::Tools);
        assert_eq!(
            classify_method("notifications/progress"),
            McpCategory::Notifications
        );
        assert_eq!(classify_method("sampling/createMessage"), McpCategory::Sampling);
        assert_eq!(classify_method("weird"), McpCategory::Custom);
    }

    #[test]
    fn test_tools_call_request() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "query", "arguments": { "sql": "select 1" } }
        });

        let summary = summarize_message(&body);

        assert_eq!(summary.kind, McpMessageKind::Request);
        assert_eq!(summary.category, Some(McpCategory::Tools));
        let params = summary.params.unwrap();
        assert_eq!(params["tool_name"], "query");
        assert_eq!(params["has_arguments"], true);
        assert_eq!(params["argument_keys"], serde_json::json!(["sql"]));
    }

    #[test]
    fn test_notification_has_no_id() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });

        let summary = summarize_message(&body);

        assert_eq!(summary.kind, McpMessageKind::Notification);
        assert_eq!(summary.category, Some(McpCategory::Lifecycle));
        assert!(summary.id.is_none());
    }

    #[test]
    fn test_success_response_result_summary() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "tools": [{ "name": "query" }, { "name": "insert" }],
                "serverInfo": { "name": "sqlite", "version": "1.2.0" }
            }
        });

        let summary = summarize_message(&body);

        assert_eq!(summary.kind, McpMessageKind::Response);
        assert_eq!(summary.is_error, Some(false));
        let result = summary.result.unwrap();
        assert_eq!(result["tool_count"], 2);
        assert_eq!(result["tool_names"], serde_json::json!(["query", "insert"]));
        assert_eq!(result["server_name"], "sqlite");
    }

    #[test]
    fn test_error_response() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": { "code": -32601, "message": "Method not found" }
        });

        let summary = summarize_message(&body);

        assert_eq!(summary.is_error, Some(true));
        assert_eq!(summary.error_code, Some(-32601));
        assert_eq!(summary.error_message.as_deref(), Some("Method not found"));
    }

    #[test]
    fn test_unknown_shape() {
        let summary = summarize_message(&serde_json::json!({ "jsonrpc": "2.0" }));
        assert_eq!(summary.kind, McpMessageKind::Unknown);
    }
}
