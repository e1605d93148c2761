// Error types
pub mod error;

// Agent and protocol detection
pub mod detect;

// Vendor body summaries
pub mod anthropic;
pub mod google;
pub mod openai;

// Shared summary shapes
pub mod summary;

// MCP message classification
pub mod mcp;

// Session tracking
pub mod session;

// Provider registry
pub mod registry;

// Detection
pub use detect::{
    AgentKind, ExchangeClassification, Protocol, classify_exchange, detect_agent, detect_protocol,
    is_sse_content_type,
};

// MCP
pub use mcp::{McpCategory, McpMessageKind, McpSummary, classify_method, summarize_message};

// Sessions
pub use session::{SessionInfo, SessionTracker};

// Registry
pub use registry::{provider_names, summarize_request, summarize_response};

// Error types
pub use error::{Error, Result};
