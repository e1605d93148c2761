use serde::{Deserialize, Serialize};
use serde_json::Value;

// NOTE: Schema Design Goals
//
// 1. Normalization: one canonical turn shape regardless of which vendor wire
//    format produced the bytes (Anthropic SSE, OpenAI Responses, JSON lines)
// 2. Totality: every record here is produced by total transformations; a
//    field a vendor never reported stays absent instead of defaulting to zero
// 3. Determinism: identity is positional (frame sequence, block index,
//    source path) so re-parsing identical bytes yields identical records

/// One decoded unit of a stream body (one SSE block or one JSON line),
/// before semantic interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Arrival ordinal. Strictly increasing and gapless within a decode pass.
    pub sequence: u64,

    /// SSE event name, JSON `type` discriminator, or a fallback label
    /// (`message`, `json_line`, `raw_line`).
    pub event_label: String,

    /// Payload text as it appeared on the wire.
    pub raw_payload: String,

    /// Parsed payload. Absent when the raw text is not valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_payload: Option<Value>,
}

impl Frame {
    /// Whether the payload parsed as JSON.
    pub fn is_parsed(&self) -> bool {
        self.parsed_payload.is_some()
    }
}

/// One semantic unit of an assistant turn.
///
/// Ordering is significant and matches emission order in the source turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: String,
    },
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

/// Token counters reported by a vendor.
///
/// Absent means "not reported", which is distinct from an explicit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
}

impl TokenUsage {
    /// Shallow key-wise merge: fields present in `other` overwrite.
    pub fn merge(&mut self, other: &TokenUsage) {
        if other.input_tokens.is_some() {
            self.input_tokens = other.input_tokens;
        }
        if other.output_tokens.is_some() {
            self.output_tokens = other.output_tokens;
        }
        if other.cache_read_input_tokens.is_some() {
            self.cache_read_input_tokens = other.cache_read_input_tokens;
        }
        if other.cache_creation_input_tokens.is_some() {
            self.cache_creation_input_tokens = other.cache_creation_input_tokens;
        }
    }

    /// True when no counter was ever reported.
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.cache_read_input_tokens.is_none()
            && self.cache_creation_input_tokens.is_none()
    }
}

/// Canonical assistant turn rebuilt from a frame sequence.
///
/// Built once per parse invocation; callers rebuild on re-parse instead of
/// patching in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconstructedTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub content: Vec<ContentBlock>,
}

impl ReconstructedTurn {
    /// Concatenate the plain text blocks, newline-joined.
    pub fn plain_text(&self) -> String {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        parts.join("\n")
    }
}

/// Role/turn entry projected from a static dialogue document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Position tag into the source document, e.g. `messages[3]`.
    pub source: String,
    pub role: String,
    #[serde(default)]
    pub content: Option<Value>,
}

/// What a tool entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolEntryKind {
    Definition,
    Invocation,
    Result,
}

impl ToolEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolEntryKind::Definition => "definition",
            ToolEntryKind::Invocation => "invocation",
            ToolEntryKind::Result => "result",
        }
    }
}

/// Tool definition, invocation, or result projected from a static document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub source: String,
    pub kind: ToolEntryKind,
    pub name: String,
    pub payload: Value,
}

/// MCP call or server registration projected from a static document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpEntry {
    pub source: String,
    pub method: String,
    pub payload: Value,
}

/// Named skill reference, structural or scanned out of free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub source: String,
    pub name: String,
}

/// The four independent projections of a dialogue-shaped document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogueProjections {
    pub roles: Vec<RoleEntry>,
    pub tools: Vec<ToolEntry>,
    pub mcp: Vec<McpEntry>,
    pub skills: Vec<SkillEntry>,
}

impl DialogueProjections {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.tools.is_empty()
            && self.mcp.is_empty()
            && self.skills.is_empty()
    }
}

/// Which body of an exchange a parse applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTarget {
    Request,
    Response,
}

impl ParseTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseTarget::Request => "request",
            ParseTarget::Response => "response",
        }
    }
}

/// Terminal output of a parse: either the four projections of a static
/// dialogue document, or a reconstructed streaming turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
#[serde(rename_all = "snake_case")]
pub enum ParseOutcome {
    Dialogue {
        target: ParseTarget,
        /// The parsed document, retained for aggregate display.
        document: Value,
        projections: DialogueProjections,
    },
    Stream {
        target: ParseTarget,
        frames: Vec<Frame>,
        turn: ReconstructedTurn,
        /// Best-effort plain text across vendor stream shapes.
        aggregated_text: String,
    },
}

impl ParseOutcome {
    pub fn target(&self) -> ParseTarget {
        match self {
            ParseOutcome::Dialogue { target, .. } => *target,
            ParseOutcome::Stream { target, .. } => *target,
        }
    }
}
