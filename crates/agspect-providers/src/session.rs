use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Inactivity window after which a session is considered over.
const SESSION_WINDOW_SECS: i64 = 1800;

/// One tracked agent session: a run of exchanges from the same (agent, host)
/// pair without a 30-minute gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub agent: String,
    pub host: String,
    pub started_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub request_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<String>,
}

/// Groups exchanges into sessions. Timestamps are supplied by the caller, so
/// tracking is deterministic and testable; there is no ambient clock here.
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: HashMap<String, SessionInfo>,
    by_agent_host: HashMap<String, Vec<String>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one exchange to the live session for (agent, host), or open a
    /// new one when none is live. Returns a snapshot of the session.
    pub fn track(
        &mut self,
        agent: &str,
        host: &str,
        protocol: Option<&str>,
        api_provider: Option<&str>,
        now: DateTime<Utc>,
    ) -> SessionInfo {
        let index_key = format!("{}:{}", agent, host);

        let live_id = self
            .by_agent_host
            .get(&index_key)
            .into_iter()
            .flatten()
            .rev()
            .find(|session_id| {
                self.sessions
                    .get(*session_id)
                    .is_some_and(|session| is_live(session, now))
            })
            .cloned();

        if let Some(session_id) = live_id
            && let Some(session) = self.sessions.get_mut(&session_id)
        {
            session.last_active = now;
            session.request_count += 1;
            if session.protocol.is_none() {
                session.protocol = protocol.map(str::to_string);
            }
            if session.api_provider.is_none() {
                session.api_provider = api_provider.map(str::to_string);
            }
            return session.clone();
        }

        let session_id = generate_session_id(agent, host, now);
        let session = SessionInfo {
            session_id: session_id.clone(),
            agent: agent.to_string(),
            host: host.to_string(),
            started_at: now,
            last_active: now,
            request_count: 1,
            protocol: protocol.map(str::to_string),
            api_provider: api_provider.map(str::to_string),
        };

        self.by_agent_host
            .entry(index_key)
            .or_default()
            .push(session_id.clone());
        self.sessions.insert(session_id, session.clone());
        session
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(session_id)
    }

    /// Sessions still inside their activity window at `now`.
    pub fn active_sessions(&self, now: DateTime<Utc>) -> Vec<&SessionInfo> {
        self.sessions
            .values()
            .filter(|session| is_live(session, now))
            .collect()
    }

    pub fn sessions_for_agent(&self, agent: &str) -> Vec<&SessionInfo> {
        self.sessions
            .values()
            .filter(|session| session.agent == agent)
            .collect()
    }

    /// Drop sessions whose window has passed. Returns how many were removed.
    pub fn expire_sessions(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| !is_live(session, now))
            .map(|(session_id, _)| session_id.clone())
            .collect();

        for session_id in &expired {
            if let Some(session) = self.sessions.remove(session_id) {
                let index_key = format!("{}:{}", session.agent, session.host);
                if let Some(ids) = self.by_agent_host.get_mut(&index_key) {
                    ids.retain(|id| id != session_id);
                    if ids.is_empty() {
                        self.by_agent_host.remove(&index_key);
                    }
                }
            }
        }

        expired.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn is_live(session: &SessionInfo, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(session.last_active).num_seconds() < SESSION_WINDOW_SECS
}

/// Deterministic 16-hex-char id from the session's opening coordinates.
fn generate_session_id(agent: &str, host: &str, started_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", agent, host, started_at.timestamp_millis()).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest.chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn test_exchanges_within_window_share_a_session() {
        let mut tracker = SessionTracker::new();

        let first = tracker.track("claude_code", "api.anthropic.com", Some("anthropic"), None, at(0));
        let second = tracker.track("claude_code", "api.anthropic.com", None, Some("anthropic"), at(10));

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(second.request_count, 2);
        // First non-empty values stick
        assert_eq!(second.protocol.as_deref(), Some("anthropic"));
        assert_eq!(second.api_provider.as_deref(), Some("anthropic"));
        assert_eq!(tracker.session_count(), 1);
    }

    #[test]
    fn test_gap_beyond_window_opens_a_new_session() {
        let mut tracker = SessionTracker::new();

        let first = tracker.track("codex", "api.openai.com", None, None, at(0));
        let second = tracker.track("codex", "api.openai.com", None, None, at(31));

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(tracker.session_count(), 2);
    }

    #[test]
    fn test_distinct_agent_host_pairs_never_share() {
        let mut tracker = SessionTracker::new();

        let claude = tracker.track("claude_code", "api.anthropic.com", None, None, at(0));
        let codex = tracker.track("codex", "api.anthropic.com", None, None, at(0));

        assert_ne!(claude.session_id, codex.session_id);
    }

    #[test]
    fn test_session_ids_are_deterministic() {
        let mut first_tracker = SessionTracker::new();
        let mut second_tracker = SessionTracker::new();

        let first = first_tracker.track("cline", "api.anthropic.com", None, None, at(5));
        let second = second_tracker.track("cline", "api.anthropic.com", None, None, at(5));

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(first.session_id.len(), 16);
    }

    #[test]
    fn test_expire_sessions_sweeps_stale_entries() {
        let mut tracker = SessionTracker::new();
        tracker.track("claude_code", "api.anthropic.com", None, None, at(0));
        tracker.track("codex", "api.openai.com", None, None, at(25));

        let expired = tracker.expire_sessions(at(40));

        assert_eq!(expired, 1);
        assert_eq!(tracker.session_count(), 1);
        assert_eq!(tracker.active_sessions(at(40)).len(), 1);
    }

    #[test]
    fn test_lookup_by_id_and_agent() {
        let mut tracker = SessionTracker::new();
        let session = tracker.track("gemini", "generativelanguage.googleapis.com", None, None, at(0));

        assert!(tracker.get(&session.session_id).is_some());
        assert_eq!(tracker.sessions_for_agent("gemini").len(), 1);
        assert!(tracker.sessions_for_agent("codex").is_empty());
    }
}
