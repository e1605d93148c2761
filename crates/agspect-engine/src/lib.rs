// Engine module - pure transformations from captured bytes to structured
// dialogue records. No I/O, no clocks, no shared state between parses.

pub mod aggregate;
pub mod extract;
pub mod format;
pub mod frames;
pub mod reconstruct;

pub use aggregate::aggregate_stream_text;
pub use extract::extract_dialogue;
pub use format::{BodyFormat, detect_format};
pub use frames::{SseDecoder, decode_frames};
pub use reconstruct::{TurnState, reconstruct_turn};

use agspect_types::{ParseOutcome, ParseTarget};

// Façade API - Stable public interface for CLI/presentation layers

/// Parse one captured body.
///
/// Dialogue-shaped documents (a JSON object with an array `messages` or
/// `input`) yield the four static projections; everything else, including
/// text that is not JSON at all, goes through frame decoding and stream
/// reconstruction. Total over its input: malformed bodies degrade to the
/// stream path instead of failing.
pub fn parse_body(raw: &str, target: ParseTarget) -> ParseOutcome {
    match serde_json::from_str(raw) {
        Ok(document) if format::is_dialogue_document(&document) => {
            let projections = extract::extract_dialogue(&document);
            ParseOutcome::Dialogue {
                target,
                document,
                projections,
            }
        }
        _ => stream_outcome(raw, target),
    }
}

fn stream_outcome(raw: &str, target: ParseTarget) -> ParseOutcome {
    let frames = frames::decode_frames(raw);
    let turn = reconstruct::reconstruct_turn(&frames);
    let aggregated_text = aggregate::aggregate_stream_text(&frames);
    ParseOutcome::Stream {
        target,
        frames,
        turn,
        aggregated_text,
    }
}
