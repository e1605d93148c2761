use agspect_types::Frame;
use serde_json::Value;

/// Decode a raw body into an ordered frame sequence.
///
/// SSE framing takes precedence: if the input carries any `event:`/`data:`
/// marker, only SSE blocks are decoded. JSON-lines is purely a fallback for
/// inputs with no SSE markers at all. Total and non-failing.
pub fn decode_frames(raw: &str) -> Vec<Frame> {
    let frames = decode_sse(raw);
    if !frames.is_empty() {
        return frames;
    }

    decode_json_lines(raw)
}

fn make_frame(sequence: u64, event_label: String, data: String) -> Frame {
    let parsed_payload = serde_json::from_str::<Value>(&data).ok();
    Frame {
        sequence,
        event_label,
        raw_payload: data,
        parsed_payload,
    }
}

fn decode_sse(raw: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut started = false;
    let mut pending_event = String::new();
    let mut pending_data: Vec<String> = Vec::new();

    fn flush(frames: &mut Vec<Frame>, event: &mut String, data: &mut Vec<String>) {
        if event.is_empty() && data.is_empty() {
            return;
        }

        let label = if event.is_empty() {
            "message".to_string()
        } else {
            std::mem::take(event)
        };

        let joined = std::mem::take(data).join("\n");
        let sequence = frames.len() as u64;
        frames.push(make_frame(sequence, label, joined));
    }

    for original_line in raw.lines() {
        let line = original_line.trim_end();

        // Leading non-SSE lines before the first marker are preamble noise
        if !started && (line.starts_with("event:") || line.starts_with("data:")) {
            started = true;
        }
        if !started {
            continue;
        }

        if line.trim().is_empty() {
            flush(&mut frames, &mut pending_event, &mut pending_data);
            continue;
        }

        if let Some(value) = line.strip_prefix("event:") {
            pending_event = value.trim().to_string();
            continue;
        }

        if let Some(value) = line.strip_prefix("data:") {
            pending_data.push(value.trim().to_string());
            continue;
        }

        // Other field lines (id:, retry:, comments) carry nothing we keep
    }

    flush(&mut frames, &mut pending_event, &mut pending_data);
    frames
}

fn decode_json_lines(raw: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for original_line in raw.lines() {
        let line = original_line.trim();
        if line.is_empty() {
            continue;
        }

        let sequence = frames.len() as u64;
        match serde_json::from_str::<Value>(line) {
            Ok(parsed) => {
                frames.push(Frame {
                    sequence,
                    event_label: json_line_label(&parsed),
                    raw_payload: line.to_string(),
                    parsed_payload: Some(parsed),
                });
            }
            Err(_) => {
                frames.push(Frame {
                    sequence,
                    event_label: "raw_line".to_string(),
                    raw_payload: line.to_string(),
                    parsed_payload: None,
                });
            }
        }
    }

    frames
}

fn json_line_label(parsed: &Value) -> String {
    if let Some(kind) = parsed.get("type").and_then(Value::as_str) {
        return kind.to_string();
    }

    if let Some(object) = parsed
        .get("response")
        .and_then(|response| response.get("object"))
        .and_then(Value::as_str)
    {
        return object.to_string();
    }

    "json_line".to_string()
}

/// Incremental SSE decoder for live bodies still being received.
///
/// Buffers text across `feed` calls and emits a frame per blank-line
/// boundary; `flush` drains whatever remains at end of stream. Frame
/// sequence numbers continue across feeds.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    next_sequence: u64,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of stream text; returns the frames completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<Frame> {
        self.buffer.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(boundary) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..boundary + 2).collect();
            if let Some(frame) = self.decode_block(&block) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Drain the remaining buffer as a final frame, if it holds one.
    pub fn flush(&mut self) -> Vec<Frame> {
        let block = std::mem::take(&mut self.buffer);
        if block.trim().is_empty() {
            return Vec::new();
        }

        self.decode_block(&block).into_iter().collect()
    }

    /// Discard buffered text. The sequence counter keeps running so frames
    /// from one connection stay uniquely ordered.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn decode_block(&mut self, block: &str) -> Option<Frame> {
        let mut event = String::new();
        let mut data_lines: Vec<String> = Vec::new();
        let mut saw_field = false;

        for raw_line in block.split('\n') {
            let line = raw_line.trim_end_matches('\r');

            // Blank lines and comment lines carry nothing
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field.trim(), value.trim_start_matches(' ')),
                None => (line, ""),
            };

            match field {
                "data" => {
                    data_lines.push(value.to_string());
                    saw_field = true;
                }
                "event" => {
                    event = value.to_string();
                    saw_field = true;
                }
                // Consumed but not carried on the frame
                "id" | "retry" => {
                    saw_field = true;
                }
                _ => {}
            }
        }

        if !saw_field {
            return None;
        }

        let label = if event.is_empty() {
            "message".to_string()
        } else {
            event
        };
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Some(make_frame(sequence, label, data_lines.join("\n")))
    }
}
