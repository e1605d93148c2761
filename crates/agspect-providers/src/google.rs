use crate::summary::{str_field, u64_field};
use serde::Serialize;
use serde_json::Value;

/// Per-content shape summary for Gemini-style bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSummary {
    pub role: String,
    pub part_types: Vec<String>,
    pub text_length: usize,
}

/// What a generateContent request asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleRequestSummary {
    pub model: String,
    pub contents_count: usize,
    pub contents: Vec<ContentSummary>,
    pub system_length: usize,
    pub max_output_tokens: u64,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u64>,
    pub stop_sequences: Vec<String>,
    pub tool_names: Vec<String>,
    pub input_tokens_estimate: usize,
}

/// Function call from a generateContent response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallSummary {
    pub name: String,
    pub args: Value,
}

/// What a static generateContent response contained (first candidate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleResponseSummary {
    pub text: String,
    pub text_length: usize,
    pub function_calls: Vec<FunctionCallSummary>,
    pub finish_reason: String,
    pub prompt_token_count: u64,
    pub candidates_token_count: u64,
    pub total_token_count: u64,
    pub candidate_count: usize,
}

pub fn summarize_request(body: &Value) -> GoogleRequestSummary {
    let contents = body
        .get("contents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let generation = body.get("generationConfig").cloned().unwrap_or(Value::Null);

    let system_text = body
        .get("systemInstruction")
        .and_then(|instruction| instruction.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let tool_names = tool_declaration_names(body.get("tools"));

    let stop_sequences: Vec<String> = generation
        .get("stopSequences")
        .and_then(Value::as_array)
        .map(|stops| {
            stops
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    GoogleRequestSummary {
        model: str_field(body, "model"),
        contents_count: contents.len(),
        contents: summarize_contents(contents),
        system_length: system_text.chars().count(),
        max_output_tokens: u64_field(&generation, "maxOutputTokens"),
        temperature: generation.get("temperature").and_then(Value::as_f64),
        top_p: generation.get("topP").and_then(Value::as_f64),
        top_k: generation.get("topK").and_then(Value::as_u64),
        stop_sequences,
        tool_names,
        input_tokens_estimate: estimate_tokens(contents, &system_text),
    }
}

pub fn summarize_response(body: &Value) -> GoogleResponseSummary {
    let candidates = body
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let first = candidates.first().cloned().unwrap_or(Value::Null);
    let parts = first
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut text_parts: Vec<&str> = Vec::new();
    let mut function_calls: Vec<FunctionCallSummary> = Vec::new();
    for part in &parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            text_parts.push(text);
        }
        if let Some(call) = part.get("functionCall") {
            function_calls.push(FunctionCallSummary {
                name: str_field(call, "name"),
                args: call.get("args").cloned().unwrap_or(Value::Null),
            });
        }
    }

    let usage = body.get("usageMetadata").cloned().unwrap_or(Value::Null);

    GoogleResponseSummary {
        text: text_parts.join("\n"),
        text_length: text_parts.iter().map(|text| text.chars().count()).sum(),
        function_calls,
        finish_reason: str_field(&first, "finishReason"),
        prompt_token_count: u64_field(&usage, "promptTokenCount"),
        candidates_token_count: u64_field(&usage, "candidatesTokenCount"),
        total_token_count: u64_field(&usage, "totalTokenCount"),
        candidate_count: candidates.len(),
    }
}

/// Tool declarations live one level down in `functionDeclarations` groups.
fn tool_declaration_names(tools: Option<&Value>) -> Vec<String> {
    let Some(groups) = tools.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut names = Vec::new();
    for group in groups {
        if let Some(declarations) = group.get("functionDeclarations").and_then(Value::as_array) {
            for declaration in declarations {
                if let Some(name) = declaration.get("name").and_then(Value::as_str) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

fn summarize_contents(contents: &[Value]) -> Vec<ContentSummary> {
    let mut summaries = Vec::new();

    for content in contents {
        let Some(map) = content.as_object() else {
            continue;
        };
        let role = map
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut part_types = Vec::new();
        let mut text_length = 0;
        if let Some(parts) = map.get("parts").and_then(Value::as_array) {
            for part in parts {
                let Some(part_map) = part.as_object() else {
                    continue;
                };
                if let Some(text) = part_map.get("text").and_then(Value::as_str) {
                    part_types.push("text".to_string());
                    text_length += text.chars().count();
                } else if part_map.contains_key("functionCall") {
                    part_types.push("functionCall".to_string());
                } else if part_map.contains_key("functionResponse") {
                    part_types.push("functionResponse".to_string());
                } else if part_map.contains_key("inlineData") {
                    part_types.push("inlineData".to_string());
                }
            }
        }

        summaries.push(ContentSummary {
            role,
            part_types,
            text_length,
        });
    }

    summaries
}

fn estimate_tokens(contents: &[Value], system_text: &str) -> usize {
    let mut chars = system_text.chars().count();
    for content in contents {
        if let Some(parts) = content.get("parts").and_then(Value::as_array) {
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    chars += text.chars().count();
                }
            }
        }
    }
    chars / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_summary() {
        let body = serde_json::json!({
            "model": "gemini-2.0-flash",
            "systemInstruction": { "parts": [{ "text": "Be helpful." }] },
            "generationConfig": { "maxOutputTokens": 1024, "temperature": 0.5, "topK": 40 },
            "tools": [
                { "functionDeclarations": [
                    { "name": "search", "description": "..." },
                    { "name": "fetch" }
                ]}
            ],
            "contents": [
                { "role": "user", "parts": [{ "text": "find docs" }] },
                { "role": "model", "parts": [{ "functionCall": { "name": "search", "args": {} } }] }
            ]
        });

        let summary = summarize_request(&body);

        assert_eq!(summary.model, "gemini-2.0-flash");
        assert_eq!(summary.contents_count, 2);
        assert_eq!(summary.system_length, 11);
        assert_eq!(summary.max_output_tokens, 1024);
        assert_eq!(summary.top_k, Some(40));
        assert_eq!(summary.tool_names, vec!["search", "fetch"]);
        assert_eq!(summary.contents[0].part_types, vec!["text"]);
        assert_eq!(summary.contents[1].part_types, vec!["functionCall"]);
        // "Be helpful." + "find docs" = 20 chars
        assert_eq!(summary.input_tokens_estimate, 5);
    }

    #[test]
    fn test_response_summary_first_candidate() {
        let body = serde_json::json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Found " },
                        { "text": "them." },
                        { "functionCall": { "name": "search", "args": { "q": "docs" } } }
                    ]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 8, "candidatesTokenCount": 4, "totalTokenCount": 12
            }
        });

        let summary = summarize_response(&body);

        assert_eq!(summary.text, "Found \nthem.");
        assert_eq!(summary.function_calls.len(), 1);
        assert_eq!(summary.function_calls[0].name, "search");
        assert_eq!(summary.finish_reason, "STOP");
        assert_eq!(summary.total_token_count, 12);
        assert_eq!(summary.candidate_count, 1);
    }

    #[test]
    fn test_empty_response() {
        let summary = summarize_response(&serde_json::json!({}));
        assert_eq!(summary.candidate_count, 0);
        assert_eq!(summary.text, "");
    }
}
