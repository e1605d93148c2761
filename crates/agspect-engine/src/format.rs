use serde_json::Value;

/// Shape classification of a static body, driving the orchestrator branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// A JSON object already containing a full array of conversation turns.
    Dialogue,
    /// Anything else: streams, fragments, non-JSON text.
    Freeform,
}

/// Classify a body. Text that is not a single valid JSON document is
/// `Freeform` and gets routed as a stream.
pub fn detect_format(text: &str) -> BodyFormat {
    match serde_json::from_str::<Value>(text) {
        Ok(document) if is_dialogue_document(&document) => BodyFormat::Dialogue,
        _ => BodyFormat::Freeform,
    }
}

/// A dialogue document is a JSON object with an array-valued `messages` or
/// `input` field.
pub fn is_dialogue_document(document: &Value) -> bool {
    let Some(root) = document.as_object() else {
        return false;
    };

    root.get("messages").is_some_and(Value::is_array)
        || root.get("input").is_some_and(Value::is_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_array_is_dialogue() {
        assert_eq!(detect_format(r#"{"messages": []}"#), BodyFormat::Dialogue);
    }

    #[test]
    fn test_input_array_is_dialogue() {
        assert_eq!(
            detect_format(r#"{"model": "m", "input": [{"role": "user"}]}"#),
            BodyFormat::Dialogue
        );
    }

    #[test]
    fn test_valid_json_without_turn_array_is_freeform() {
        assert_eq!(detect_format(r#"{"messages": "nope"}"#), BodyFormat::Freeform);
        assert_eq!(detect_format(r#"{"input": 3}"#), BodyFormat::Freeform);
        assert_eq!(detect_format(r#"[1, 2, 3]"#), BodyFormat::Freeform);
        assert_eq!(detect_format(r#""just a string""#), BodyFormat::Freeform);
    }

    #[test]
    fn test_invalid_json_is_freeform() {
        assert_eq!(detect_format("event: ping\ndata: {}\n"), BodyFormat::Freeform);
        assert_eq!(detect_format(""), BodyFormat::Freeform);
    }
}
