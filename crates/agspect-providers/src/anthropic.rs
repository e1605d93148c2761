use crate::summary::{MessageSummary, ToolCallSummary, str_field, u64_field};
use serde::Serialize;
use serde_json::Value;

/// What an Anthropic Messages API request asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicRequestSummary {
    pub model: String,
    pub max_tokens: u64,
    pub temperature: Option<f64>,
    pub stream: bool,
    pub system_length: usize,
    pub message_count: usize,
    pub messages: Vec<MessageSummary>,
    pub tool_names: Vec<String>,
    pub stop_sequences: Vec<String>,
    /// chars/4 guess, not a tokenizer count.
    pub input_tokens_estimate: usize,
}

/// What a static (non-streaming) Anthropic response contained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicResponseSummary {
    pub id: String,
    pub model: String,
    pub role: String,
    pub stop_reason: String,
    pub text: String,
    pub text_length: usize,
    pub tool_calls: Vec<ToolCallSummary>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
}

/// Summarize a request body. Total: missing or oddly-shaped fields yield
/// defaults instead of failing.
pub fn summarize_request(body: &Value) -> AnthropicRequestSummary {
    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let system_text = system_text(body.get("system"));

    let tool_names: Vec<String> = body
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| tools.iter().map(|tool| str_field(tool, "name")).collect())
        .unwrap_or_default();

    let stop_sequences: Vec<String> = body
        .get("stop_sequences")
        .and_then(Value::as_array)
        .map(|stops| {
            stops
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    AnthropicRequestSummary {
        model: str_field(body, "model"),
        max_tokens: u64_field(body, "max_tokens"),
        temperature: body.get("temperature").and_then(Value::as_f64),
        stream: body.get("stream").and_then(Value::as_bool).unwrap_or(false),
        system_length: system_text.chars().count(),
        message_count: messages.len(),
        messages: summarize_messages(messages),
        tool_names,
        stop_sequences,
        input_tokens_estimate: estimate_tokens(messages, &system_text),
    }
}

/// Summarize a static response body.
pub fn summarize_response(body: &Value) -> AnthropicResponseSummary {
    let mut text_parts: Vec<&str> = Vec::new();
    let mut tool_calls: Vec<ToolCallSummary> = Vec::new();

    if let Some(blocks) = body.get("content").and_then(Value::as_array) {
        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        text_parts.push(text);
                    }
                }
                Some("tool_use") => tool_calls.push(ToolCallSummary {
                    id: str_field(block, "id"),
                    name: str_field(block, "name"),
                    arguments: block.get("input").cloned().unwrap_or(Value::Null),
                }),
                _ => {}
            }
        }
    }

    let usage = body.get("usage").cloned().unwrap_or(Value::Null);

    AnthropicResponseSummary {
        id: str_field(body, "id"),
        model: str_field(body, "model"),
        role: str_field(body, "role"),
        stop_reason: str_field(body, "stop_reason"),
        text: text_parts.join("\n"),
        text_length: text_parts.iter().map(|part| part.chars().count()).sum(),
        tool_calls,
        input_tokens: u64_field(&usage, "input_tokens"),
        output_tokens: u64_field(&usage, "output_tokens"),
        cache_read_tokens: u64_field(&usage, "cache_read_input_tokens"),
        cache_creation_tokens: u64_field(&usage, "cache_creation_input_tokens"),
    }
}

/// System prompts arrive as a bare string or a list of text parts.
fn system_text(system: Option<&Value>) -> String {
    match system {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => {
            let texts: Vec<String> = parts
                .iter()
                .map(|part| match part {
                    Value::Object(_) => str_field(part, "text"),
                    other => other.to_string(),
                })
                .collect();
            texts.join(" ")
        }
        _ => String::new(),
    }
}

fn summarize_messages(messages: &[Value]) -> Vec<MessageSummary> {
    let mut summaries = Vec::new();

    for message in messages {
        let Some(map) = message.as_object() else {
            continue;
        };
        let role = map
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match map.get("content") {
            Some(Value::String(text)) => summaries.push(MessageSummary {
                role,
                kind: "text".to_string(),
                block_types: Vec::new(),
                length: text.chars().count(),
            }),
            Some(Value::Array(blocks)) => {
                let mut block_types = Vec::new();
                let mut length = 0;
                for block in blocks {
                    let Some(block_map) = block.as_object() else {
                        continue;
                    };
                    let kind = block_map
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("text");
                    block_types.push(kind.to_string());

                    if kind == "text" {
                        length += block_map
                            .get("text")
                            .and_then(Value::as_str)
                            .map_or(0, |text| text.chars().count());
                    } else if kind == "tool_result" {
                        length += tool_result_text_length(block);
                    }
                }
                summaries.push(MessageSummary {
                    role,
                    kind: "blocks".to_string(),
                    block_types,
                    length,
                });
            }
            _ => {}
        }
    }

    summaries
}

fn tool_result_text_length(block: &Value) -> usize {
    let Some(parts) = block.get("content").and_then(Value::as_array) else {
        return 0;
    };
    parts
        .iter()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(|text| text.chars().count())
        .sum()
}

fn estimate_tokens(messages: &[Value], system_text: &str) -> usize {
    let mut chars = system_text.chars().count();

    for message in messages {
        match message.get("content") {
            Some(Value::String(text)) => chars += text.chars().count(),
            Some(Value::Array(blocks)) => {
                for block in blocks {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        chars += text.chars().count();
                    }
                    if block.get("type").and_then(Value::as_str) == Some("tool_result") {
                        chars += tool_result_text_length(block);
                    }
                }
            }
            _ => {}
        }
    }

    chars / 4
}
