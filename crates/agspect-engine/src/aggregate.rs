use agspect_types::Frame;
use serde_json::Value;

/// Pull the plain response text out of a frame sequence without caring which
/// vendor emitted it.
///
/// Precedence: an explicit "done" payload carrying the complete text always
/// wins over accumulated deltas, which in turn win over a newline join of
/// unparsed raw frames.
pub fn aggregate_stream_text(frames: &[Frame]) -> String {
    let mut delta_segments: Vec<String> = Vec::new();
    let mut completed_text = String::new();
    let mut raw_segments: Vec<String> = Vec::new();

    for frame in frames {
        let payload = match &frame.parsed_payload {
            Some(payload) => payload,
            None => {
                if !frame.raw_payload.trim().is_empty() {
                    raw_segments.push(frame.raw_payload.clone());
                }
                continue;
            }
        };

        // A payload that parsed to a bare JSON string is still raw text
        if let Value::String(text) = payload {
            if !text.trim().is_empty() {
                raw_segments.push(text.clone());
            }
            continue;
        }

        if let Some(kind) = payload.get("type").and_then(Value::as_str) {
            match kind {
                "response.output_text.delta" => {
                    if let Some(delta) = payload.get("delta").and_then(Value::as_str) {
                        delta_segments.push(delta.to_string());
                    }
                }
                "response.output_text.done" => {
                    if let Some(text) = payload.get("text").and_then(Value::as_str) {
                        completed_text = text.to_string();
                    }
                }
                "content_block_delta" => {
                    if let Some(text) = payload
                        .get("delta")
                        .and_then(|delta| delta.get("text"))
                        .and_then(Value::as_str)
                    {
                        delta_segments.push(text.to_string());
                    }
                }
                "content_block_start" => {
                    if let Some(text) = payload
                        .get("content_block")
                        .and_then(|block| block.get("text"))
                        .and_then(Value::as_str)
                    {
                        delta_segments.push(text.to_string());
                    }
                }
                _ => {}
            }
        }

        // A full response object embedded anywhere carries the final text
        if let Some(response) = payload.get("response") {
            let segments = collect_response_output_text(response);
            if !segments.is_empty() {
                completed_text = segments.concat();
            }
        }
    }

    if !completed_text.is_empty() {
        return completed_text;
    }

    if !delta_segments.is_empty() {
        return delta_segments.concat();
    }

    raw_segments.join("\n")
}

/// Text segments from `response.output[].content[].text`.
fn collect_response_output_text(response: &Value) -> Vec<String> {
    let Some(output) = response.get("output").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    for item in output {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                segments.push(text.to_string());
            }
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed_frame(sequence: u64, payload: Value) -> Frame {
        Frame {
            sequence,
            event_label: "message".to_string(),
            raw_payload: payload.to_string(),
            parsed_payload: Some(payload),
        }
    }

    fn raw_frame(sequence: u64, text: &str) -> Frame {
        Frame {
            sequence,
            event_label: "raw_line".to_string(),
            raw_payload: text.to_string(),
            parsed_payload: None,
        }
    }

    #[test]
    fn test_deltas_accumulate_in_order() {
        let frames = vec![
            parsed_frame(
                0,
                serde_json::json!({ "type": "response.output_text.delta", "delta": "Hel" }),
            ),
            parsed_frame(
                1,
                serde_json::json!({ "type": "response.output_text.delta", "delta": "lo" }),
            ),
        ];
        assert_eq!(aggregate_stream_text(&frames), "Hello");
    }

    #[test]
    fn test_done_event_wins_over_deltas() {
        let frames = vec![
            parsed_frame(
                0,
                serde_json::json!({ "type": "response.output_text.delta", "delta": "partial" }),
            ),
            parsed_frame(
                1,
                serde_json::json!({ "type": "response.output_text.done", "text": "complete" }),
            ),
        ];
        assert_eq!(aggregate_stream_text(&frames), "complete");
    }

    #[test]
    fn test_anthropic_deltas_and_seeded_block_text() {
        let frames = vec![
            parsed_frame(
                0,
                serde_json::json!({
                    "type": "content_block_start",
                    "index": 0,
                    "content_block": { "type": "text", "text": "seed " }
                }),
            ),
            parsed_frame(
                1,
                serde_json::json!({
                    "type": "content_block_delta",
                    "index": 0,
                    "delta": { "type": "text_delta", "text": "rest" }
                }),
            ),
        ];
        assert_eq!(aggregate_stream_text(&frames), "seed rest");
    }

    #[test]
    fn test_embedded_response_output_is_final_text() {
        let frames = vec![
            parsed_frame(
                0,
                serde_json::json!({ "type": "response.output_text.delta", "delta": "d" }),
            ),
            parsed_frame(
                1,
                serde_json::json!({
                    "type": "response.completed",
                    "response": {
                        "output": [
                            { "content": [{ "type": "output_text", "text": "full " }] },
                            { "content": [{ "type": "output_text", "text": "text" }] }
                        ]
                    }
                }),
            ),
        ];
        assert_eq!(aggregate_stream_text(&frames), "full text");
    }

    #[test]
    fn test_raw_frames_are_last_resort() {
        let frames = vec![
            raw_frame(0, "line one"),
            raw_frame(1, "   "),
            raw_frame(2, "line two"),
        ];
        assert_eq!(aggregate_stream_text(&frames), "line one\nline two");
    }

    #[test]
    fn test_json_string_payload_counts_as_raw() {
        let frames = vec![parsed_frame(0, Value::String("quoted".to_string()))];
        assert_eq!(aggregate_stream_text(&frames), "quoted");
    }

    #[test]
    fn test_empty_frames_aggregate_to_empty() {
        assert_eq!(aggregate_stream_text(&[]), "");
    }
}
