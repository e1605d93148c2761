use crate::summary::{MessageSummary, str_field, u64_field};
use serde::Serialize;
use serde_json::Value;

/// What an OpenAI chat-completions request asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenaiRequestSummary {
    pub model: String,
    /// `max_tokens` with `max_completion_tokens` as the newer fallback.
    pub max_tokens: u64,
    pub temperature: Option<f64>,
    pub stream: bool,
    /// Combined length of system/developer message text.
    pub system_length: usize,
    pub message_count: usize,
    pub messages: Vec<MessageSummary>,
    pub tool_names: Vec<String>,
    pub tool_choice: Option<Value>,
    pub response_format: Option<Value>,
    pub input_tokens_estimate: usize,
}

/// Tool call from a chat-completions response; arguments stay the raw
/// JSON-encoded string the wire carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenaiToolCallSummary {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// What a static chat-completions response contained (first choice).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenaiResponseSummary {
    pub id: String,
    pub model: String,
    pub finish_reason: String,
    pub text: String,
    pub text_length: usize,
    pub tool_calls: Vec<OpenaiToolCallSummary>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cached_tokens: u64,
    pub choice_count: usize,
    pub system_fingerprint: String,
}

pub fn summarize_request(body: &Value) -> OpenaiRequestSummary {
    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let tool_names: Vec<String> = body
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .map(|tool| {
                    tool.get("function")
                        .map(|function| str_field(function, "name"))
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    let system_length: usize = messages
        .iter()
        .filter(|message| {
            matches!(
                message.get("role").and_then(Value::as_str),
                Some("system") | Some("developer")
            )
        })
        .map(message_text_length)
        .sum();

    let max_tokens = match body.get("max_tokens").and_then(Value::as_u64) {
        Some(value) => value,
        None => u64_field(body, "max_completion_tokens"),
    };

    OpenaiRequestSummary {
        model: str_field(body, "model"),
        max_tokens,
        temperature: body.get("temperature").and_then(Value::as_f64),
        stream: body.get("stream").and_then(Value::as_bool).unwrap_or(false),
        system_length,
        message_count: messages.len(),
        messages: summarize_messages(messages),
        tool_names,
        tool_choice: body.get("tool_choice").cloned(),
        response_format: body.get("response_format").cloned(),
        input_tokens_estimate: messages.iter().map(message_text_length).sum::<usize>() / 4,
    }
}

pub fn summarize_response(body: &Value) -> OpenaiResponseSummary {
    let choices = body
        .get("choices")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let first = choices.first().cloned().unwrap_or(Value::Null);
    let message = first.get("message").cloned().unwrap_or(Value::Null);

    let text = str_field(&message, "content");

    let tool_calls: Vec<OpenaiToolCallSummary> = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .filter(|call| call.is_object())
                .map(|call| {
                    let function = call.get("function").cloned().unwrap_or(Value::Null);
                    OpenaiToolCallSummary {
                        id: str_field(call, "id"),
                        name: str_field(&function, "name"),
                        arguments: str_field(&function, "arguments"),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = body.get("usage").cloned().unwrap_or(Value::Null);
    let cached_tokens = usage
        .get("prompt_tokens_details")
        .map(|details| u64_field(details, "cached_tokens"))
        .unwrap_or_default();

    OpenaiResponseSummary {
        id: str_field(body, "id"),
        model: str_field(body, "model"),
        finish_reason: str_field(&first, "finish_reason"),
        text_length: text.chars().count(),
        text,
        tool_calls,
        prompt_tokens: u64_field(&usage, "prompt_tokens"),
        completion_tokens: u64_field(&usage, "completion_tokens"),
        total_tokens: u64_field(&usage, "total_tokens"),
        cached_tokens,
        choice_count: choices.len(),
        system_fingerprint: str_field(body, "system_fingerprint"),
    }
}

/// Text length across a string content or the text parts of a block array.
fn message_text_length(message: &Value) -> usize {
    match message.get("content") {
        Some(Value::String(text)) => text.chars().count(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .map(|text| text.chars().count())
            .sum(),
        _ => 0,
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
            None | Some(Value::Null) => {
                let kind = if map.get("tool_calls").is_some_and(|calls| !calls.is_null()) {
                    "tool_call_only"
                } else {
                    "empty"
                };
                summaries.push(MessageSummary {
                    role,
                    kind: kind.to_string(),
                    block_types: Vec::new(),
                    length: 0,
                });
            }
            Some(Value::String(text)) => summaries.push(MessageSummary {
                role,
                kind: "text".to_string(),
                block_types: Vec::new(),
                length: text.chars().count(),
            }),
            Some(Value::Array(parts)) => {
                let mut block_types = Vec::new();
                let mut length = 0;
                for part in parts {
                    let Some(part_map) = part.as_object() else {
                        continue;
                    };
                    let kind = part_map
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("text");
                    block_types.push(kind.to_string());
                    if kind == "text" {
                        length += part_map
                            .get("text")
                            .and_then(Value::as_str)
                            .map_or(0, |text| text.chars().count());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_summary_with_developer_system() {
        let body = serde_json::json!({
            "model": "gpt-4o",
            "max_completion_tokens": 2048,
            "messages": [
                { "role": "developer", "content": "Be terse." },
                { "role": "user", "content": "hello there" },
                { "role": "assistant", "tool_calls": [{ "id": "call_1" }] }
            ],
            "tools": [
                { "type": "function", "function": { "name": "get_weather" } }
            ]
        });

        let summary = summarize_request(&body);

        assert_eq!(summary.model, "gpt-4o");
        assert_eq!(summary.max_tokens, 2048);
        assert_eq!(summary.system_length, 9);
        assert_eq!(summary.message_count, 3);
        assert_eq!(summary.tool_names, vec!["get_weather"]);
        assert_eq!(summary.messages[2].kind, "tool_call_only");
        // "Be terse." + "hello there" = 20 chars
        assert_eq!(summary.input_tokens_estimate, 5);
    }

    #[test]
    fn test_response_summary_first_choice() {
        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "system_fingerprint": "fp_1",
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": { "name": "get_weather", "arguments": "{\"city\":\"SF\"}" }
                    }]
                }
            }],
            "usage": {
                "prompt_tokens": 20, "completion_tokens": 6, "total_tokens": 26,
                "prompt_tokens_details": { "cached_tokens": 12 }
            }
        });

        let summary = summarize_response(&body);

        assert_eq!(summary.finish_reason, "tool_calls");
        assert_eq!(summary.text, "");
        assert_eq!(summary.tool_calls.len(), 1);
        assert_eq!(summary.tool_calls[0].arguments, "{\"city\":\"SF\"}");
        assert_eq!(summary.cached_tokens, 12);
        assert_eq!(summary.choice_count, 1);
    }

    #[test]
    fn test_response_summary_without_choices() {
        let summary = summarize_response(&serde_json::json!({ "id": "x" }));
        assert_eq!(summary.choice_count, 0);
        assert_eq!(summary.finish_reason, "");
    }
}
