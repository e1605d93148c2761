use serde::Serialize;
use serde_json::Value;

/// Per-message shape summary shared by the chat-style vendors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSummary {
    pub role: String,
    /// "text" for plain string content, "blocks" for block arrays,
    /// "tool_call_only"/"empty" for messages with no content at all.
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_types: Vec<String>,
    /// Character count of the textual content.
    pub length: usize,
}

/// Tool invocation pulled out of a response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallSummary {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

pub(crate) fn str_field(map: &Value, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn u64_field(map: &Value, key: &str) -> u64 {
    map.get(key).and_then(Value::as_u64).unwrap_or_default()
}
