use agspect_types::CapturedExchange;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Agent clients recognized from request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    ClaudeCode,
    OpenCode,
    Cline,
    Codex,
    Gemini,
    Unknown,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::ClaudeCode => "claude_code",
            AgentKind::OpenCode => "opencode",
            AgentKind::Cline => "cline",
            AgentKind::Codex => "codex",
            AgentKind::Gemini => "gemini",
            AgentKind::Unknown => "unknown",
        }
    }

    /// Short display name.
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::ClaudeCode => "Claude",
            AgentKind::OpenCode => "OpenCode",
            AgentKind::Cline => "Cline",
            AgentKind::Codex => "Codex",
            AgentKind::Gemini => "Gemini",
            AgentKind::Unknown => "Unknown",
        }
    }
}

/// Upstream API protocol families carried by an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Anthropic,
    Openai,
    Google,
    Mcp,
    Unknown,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Anthropic => "anthropic",
            Protocol::Openai => "openai",
            Protocol::Google => "google",
            Protocol::Mcp => "mcp",
            Protocol::Unknown => "unknown",
        }
    }
}

static AGENT_PATTERNS: LazyLock<Vec<(AgentKind, Vec<Regex>)>> = LazyLock::new(|| {
    fn compile(patterns: &[&str]) -> Vec<Regex> {
        patterns
            .iter()
            .map(|pattern| Regex::new(&format!("(?i){}", pattern)).expect("static agent pattern"))
            .collect()
    }

    vec![
        (
            AgentKind::ClaudeCode,
            compile(&[r"claude[-_]?code", r"claude[-_]?cli", r"anthropic[-_]?cli"]),
        ),
        (AgentKind::OpenCode, compile(&[r"opencode", r"open[-_]?code"])),
        (AgentKind::Cline, compile(&[r"cline", r"vscode.*cline"])),
        (
            AgentKind::Codex,
            compile(&[r"codex", r"vscode.*codex", r"openai[-_]?codex"]),
        ),
        (
            AgentKind::Gemini,
            compile(&[r"gemini[-_]?cli", r"google[-_]?gemini"]),
        ),
    ]
});

static ANTHROPIC_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v1/messages").expect("static path pattern"));
static OPENAI_CHAT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v1/chat/completions").expect("static path pattern"));
static OPENAI_RESPONSES_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v1/responses").expect("static path pattern"));
static GOOGLE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/v1beta/models/.+:(generateContent|streamGenerateContent)")
        .expect("static path pattern")
});

const ANTHROPIC_HOSTS: [&str; 1] = ["api.anthropic.com"];
const OPENAI_HOSTS: [&str; 1] = ["api.openai.com"];
const GOOGLE_HOSTS: [&str; 1] = ["generativelanguage.googleapis.com"];

const MCP_METHODS: [&str; 12] = [
    "initialize",
    "initialized",
    "shutdown",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/read",
    "prompts/list",
    "prompts/get",
    "notifications/initialized",
    "notifications/cancelled",
    "completion/complete",
];

/// Classify the agent client from request headers.
///
/// `user_agent` overrides the header when the caller already extracted it.
pub fn detect_agent(headers: &HashMap<String, String>, user_agent: Option<&str>) -> AgentKind {
    let normalized: HashMap<String, &str> = headers
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value.as_str()))
        .collect();

    let ua = user_agent
        .or_else(|| normalized.get("user-agent").copied())
        .unwrap_or("");
    let x_client = normalized.get("x-client-name").copied().unwrap_or("");
    let x_app = normalized.get("x-app").copied().unwrap_or("");

    let combined = format!("{} {} {}", ua, x_client, x_app);
    for (agent, patterns) in AGENT_PATTERNS.iter() {
        if patterns.iter().any(|pattern| pattern.is_match(&combined)) {
            return *agent;
        }
    }

    // Anthropic-specific headers plus a CLI app marker still mean Claude Code
    // even when the user agent gives nothing away
    let has_anthropic_headers =
        normalized.contains_key("anthropic-version") || normalized.contains_key("anthropic-beta");
    if has_anthropic_headers {
        let app = x_app.to_lowercase();
        if app == "cli" || app == "claude-code" {
            return AgentKind::ClaudeCode;
        }
    }

    AgentKind::Unknown
}

/// Classify the upstream protocol from host, path, and optionally the parsed
/// request body. Returns the protocol plus a provider guess from the host.
pub fn detect_protocol(
    host: &str,
    path: &str,
    request_body: Option<&Value>,
) -> (Protocol, Option<&'static str>) {
    let host_lower = host.to_lowercase();
    let host_clean = host_lower.split(':').next().unwrap_or("");
    let path_clean = path.split('?').next().unwrap_or("");

    if request_body.is_some_and(is_mcp_message) {
        return (Protocol::Mcp, None);
    }

    if ANTHROPIC_HOSTS.contains(&host_clean) || ANTHROPIC_PATH.is_match(path_clean) {
        if host_clean.contains("anthropic") {
            return (Protocol::Anthropic, Some("anthropic"));
        }
        return (Protocol::Anthropic, guess_provider(host_clean));
    }

    if OPENAI_HOSTS.contains(&host_clean)
        || OPENAI_CHAT_PATH.is_match(path_clean)
        || OPENAI_RESPONSES_PATH.is_match(path_clean)
    {
        if host_clean.contains("openai") {
            return (Protocol::Openai, Some("openai"));
        }
        return (Protocol::Openai, guess_provider(host_clean));
    }

    if GOOGLE_HOSTS.contains(&host_clean) || GOOGLE_PATH.is_match(path_clean) {
        return (Protocol::Google, Some("google"));
    }

    // Body-shape heuristics for gateways on unrecognized hosts
    if let Some(body) = request_body.and_then(Value::as_object) {
        if body.contains_key("model") && body.contains_key("messages") {
            let metadata = body
                .get("metadata")
                .map(|value| value.to_string())
                .unwrap_or_default();
            if metadata.contains("anthropic-version") {
                return (Protocol::Anthropic, guess_provider(host_clean));
            }
            return (Protocol::Openai, guess_provider(host_clean));
        }
        if body.contains_key("contents") && body.contains_key("generationConfig") {
            return (Protocol::Google, guess_provider(host_clean));
        }
    }

    (Protocol::Unknown, None)
}

/// Whether a response content type marks an SSE stream.
pub fn is_sse_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.to_lowercase().contains("text/event-stream"))
}

/// One-shot classification of a captured exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeClassification {
    pub agent: AgentKind,
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<String>,
    pub is_sse_response: bool,
}

/// Run agent, protocol, and streaming detection over one exchange record.
pub fn classify_exchange(exchange: &CapturedExchange) -> ExchangeClassification {
    let agent = detect_agent(&exchange.request_headers, None);

    let request_body: Option<Value> = exchange
        .request_body
        .as_deref()
        .and_then(|text| serde_json::from_str(text).ok());
    let (protocol, api_provider) =
        detect_protocol(&exchange.host, &exchange.path, request_body.as_ref());

    ExchangeClassification {
        agent,
        protocol,
        api_provider: api_provider.map(str::to_string),
        is_sse_response: is_sse_content_type(exchange.response_header("content-type")),
    }
}

fn is_mcp_message(body: &Value) -> bool {
    let Some(map) = body.as_object() else {
        return false;
    };
    if map.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return false;
    }

    if let Some(method) = map.get("method").and_then(Value::as_str)
        && (MCP_METHODS.contains(&method) || method.contains('/'))
    {
        return true;
    }

    map.contains_key("id") && (map.contains_key("result") || map.contains_key("error"))
}

fn guess_provider(host: &str) -> Option<&'static str> {
    if host.contains("anthropic") {
        Some("anthropic")
    } else if host.contains("openai") {
        Some("openai")
    } else if host.contains("google") || host.contains("googleapis") {
        Some("google")
    } else if host.contains("azure") {
        Some("azure")
    } else if host.contains("openrouter") {
        Some("openrouter")
    } else {
        None
    }
}
