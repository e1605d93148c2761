use agspect_types::{ContentBlock, Frame, ReconstructedTurn, TokenUsage};
use serde::Deserialize;
use serde_json::Value;

/// Block indexes past this are treated as malformed and ignored, so a bogus
/// index cannot force a giant allocation.
const MAX_BLOCK_SLOTS: usize = 4096;

/// Wire events recognized by the reconstructor, keyed on the payload's
/// `type` tag. Anything else lands on `Unknown` and is skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum StreamEvent {
    MessageStart {
        #[serde(default)]
        message: MessageStart,
    },
    ContentBlockStart {
        #[serde(default)]
        index: usize,
        #[serde(default)]
        content_block: BlockStart,
    },
    ContentBlockDelta {
        #[serde(default)]
        index: usize,
        #[serde(default)]
        delta: BlockDelta,
    },
    ContentBlockStop {
        #[serde(default)]
        #[allow(dead_code)]
        index: usize,
    },
    MessageDelta {
        #[serde(default)]
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<TokenUsage>,
    },
    MessageStop,
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct MessageStart {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Default, Deserialize)]
struct BlockStart {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum BlockDelta {
    ThinkingDelta {
        #[serde(default)]
        thinking: String,
    },
    TextDelta {
        #[serde(default)]
        text: String,
    },
    InputJsonDelta {
        #[serde(default)]
        partial_json: String,
    },
    SignatureDelta {
        #[serde(default)]
        signature: String,
    },
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct MessageDeltaBody {
    #[serde(default)]
    stop_reason: Option<String>,
}

/// One in-progress content block, accumulated field by field.
#[derive(Debug, Clone, Default)]
struct BlockState {
    kind: String,
    content: String,
    id: String,
    name: String,
    input: String,
    signature: String,
}

/// Stateful accumulator for one streamed turn.
///
/// Apply frames in arrival order; finalize at any point for a snapshot.
/// State is monotonic - fields only ever gain information - so finalizing
/// mid-stream yields a valid, if incomplete, turn. Each parse owns its own
/// state; there is nothing shared between concurrent reconstructions.
#[derive(Debug)]
pub struct TurnState {
    model: Option<String>,
    role: Option<String>,
    stop_reason: Option<String>,
    usage: Option<TokenUsage>,
    blocks: Vec<Option<BlockState>>,
    derive_result_errors: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            model: None,
            role: None,
            stop_reason: None,
            usage: None,
            blocks: Vec::new(),
            derive_result_errors: true,
        }
    }

    /// The `tool_result` error flag is a guess (a case-insensitive "error"
    /// substring check on the content), not vendor-reported data. Callers
    /// that cannot tolerate the misclassification risk can switch it off;
    /// `is_error` is then always false for streamed tool results.
    pub fn with_result_error_heuristic(mut self, enabled: bool) -> Self {
        self.derive_result_errors = enabled;
        self
    }

    /// Apply one frame. Frames that did not parse as JSON, or whose `type`
    /// is not a recognized event, are ignored - never an error.
    pub fn apply(&mut self, frame: &Frame) {
        let Some(payload) = &frame.parsed_payload else {
            return;
        };

        let Ok(event) = StreamEvent::deserialize(payload) else {
            return;
        };

        match event {
            StreamEvent::MessageStart { message } => {
                if message.model.is_some() {
                    self.model = message.model;
                }
                if message.role.is_some() {
                    self.role = message.role;
                }
                if let Some(usage) = message.usage {
                    self.merge_usage(&usage);
                }
            }

            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                if index >= MAX_BLOCK_SLOTS {
                    return;
                }
                if index >= self.blocks.len() {
                    self.blocks.resize_with(index + 1, || None);
                }

                // A block is created exactly once; a duplicate start for an
                // allocated index keeps the first allocation.
                let slot = &mut self.blocks[index];
                if slot.is_none() {
                    *slot = Some(BlockState {
                        kind: content_block.kind.unwrap_or_default(),
                        id: content_block.id.unwrap_or_default(),
                        name: content_block.name.unwrap_or_default(),
                        ..Default::default()
                    });
                }
            }

            StreamEvent::ContentBlockDelta { index, delta } => {
                // No-op when the block was never started
                let Some(Some(block)) = self.blocks.get_mut(index) else {
                    return;
                };

                match delta {
                    BlockDelta::ThinkingDelta { thinking } => block.content.push_str(&thinking),
                    BlockDelta::TextDelta { text } => block.content.push_str(&text),
                    BlockDelta::InputJsonDelta { partial_json } => {
                        block.input.push_str(&partial_json)
                    }
                    // Signatures replace; they are not fragments
                    BlockDelta::SignatureDelta { signature } => block.signature = signature,
                    BlockDelta::Unknown => {}
                }
            }

            // Boundary marker only
            StreamEvent::ContentBlockStop { .. } => {}

            StreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_some() {
                    self.stop_reason = delta.stop_reason;
                }
                if let Some(usage) = usage {
                    self.merge_usage(&usage);
                }
            }

            StreamEvent::MessageStop | StreamEvent::Ping | StreamEvent::Unknown => {}
        }
    }

    /// Compact the sparse block arena into an ordered turn. Unallocated
    /// positions and blocks that never learned a type are skipped.
    pub fn finalize(&self) -> ReconstructedTurn {
        let content = self
            .blocks
            .iter()
            .flatten()
            .filter(|block| !block.kind.is_empty())
            .map(|block| self.freeze(block))
            .collect();

        ReconstructedTurn {
            model: self.model.clone(),
            role: self.role.clone(),
            stop_reason: self.stop_reason.clone(),
            usage: self.usage,
            content,
        }
    }

    fn merge_usage(&mut self, usage: &TokenUsage) {
        self.usage.get_or_insert_with(TokenUsage::default).merge(usage);
    }

    fn freeze(&self, block: &BlockState) -> ContentBlock {
        match block.kind.as_str() {
            "thinking" => ContentBlock::Thinking {
                thinking: block.content.clone(),
                signature: block.signature.clone(),
            },
            "tool_use" => {
                // Reassembled fragments that form valid JSON become the
                // structured input; otherwise the raw buffer is kept as-is
                let input = serde_json::from_str(&block.input)
                    .unwrap_or_else(|_| Value::String(block.input.clone()));
                ContentBlock::ToolUse {
                    id: block.id.clone(),
                    name: block.name.clone(),
                    input,
                }
            }
            "tool_result" => {
                let is_error = self.derive_result_errors && looks_like_error(&block.content);
                ContentBlock::ToolResult {
                    tool_use_id: block.id.clone(),
                    content: block.content.clone(),
                    is_error,
                }
            }
            // "text" and anything unrecognized render as plain text
            _ => ContentBlock::Text {
                text: block.content.clone(),
            },
        }
    }
}

fn looks_like_error(content: &str) -> bool {
    content.to_lowercase().contains("error")
}

/// Rebuild a turn from a full frame sequence in one shot.
pub fn reconstruct_turn(frames: &[Frame]) -> ReconstructedTurn {
    let mut state = TurnState::new();
    for frame in frames {
        state.apply(frame);
    }
    state.finalize()
}
