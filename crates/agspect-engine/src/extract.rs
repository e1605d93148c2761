use agspect_types::{
    DialogueProjections, McpEntry, RoleEntry, SkillEntry, ToolEntry, ToolEntryKind,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Skill lists in prompt text look like "- name:" items.
/// Matches are best-effort hints; the structural `load_skills` path is the
/// authoritative source.
static SKILL_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*([a-zA-Z0-9_-]+)\s*:").unwrap());

/// Project a parsed dialogue document into role, tool, MCP, and skill
/// entries. Four independent order-preserving passes; a shape that is absent
/// simply yields an empty list. Entries copy what they need out of the
/// document, so it can be dropped afterwards.
pub fn extract_dialogue(document: &Value) -> DialogueProjections {
    let Some(root) = document.as_object() else {
        return DialogueProjections::default();
    };

    DialogueProjections {
        roles: extract_roles(root),
        tools: extract_tools(root),
        mcp: extract_mcp(root),
        skills: extract_skills(root),
    }
}

/// Objects inside `messages[]` / `input[]`, tagged with their source path.
fn message_containers(root: &Map<String, Value>) -> Vec<(String, &Map<String, Value>)> {
    let mut containers = Vec::new();

    for key in ["messages", "input"] {
        if let Some(items) = root.get(key).and_then(Value::as_array) {
            for (index, item) in items.iter().enumerate() {
                if let Some(node) = item.as_object() {
                    containers.push((format!("{}[{}]", key, index), node));
                }
            }
        }
    }

    containers
}

fn extract_roles(root: &Map<String, Value>) -> Vec<RoleEntry> {
    let mut entries = Vec::new();

    if let Some(role) = root.get("role").and_then(Value::as_str) {
        entries.push(RoleEntry {
            source: "root.role".to_string(),
            role: role.to_string(),
            content: root.get("content").cloned(),
        });
    }

    for (source, node) in message_containers(root) {
        if let Some(role) = node.get("role").and_then(Value::as_str) {
            entries.push(RoleEntry {
                source,
                role: role.to_string(),
                content: node.get("content").cloned(),
            });
        }
    }

    entries
}

fn extract_tools(root: &Map<String, Value>) -> Vec<ToolEntry> {
    let mut entries = Vec::new();

    if let Some(tools) = root.get("tools").and_then(Value::as_array) {
        for (index, tool) in tools.iter().enumerate() {
            let Some(definition) = tool.as_object() else {
                continue;
            };

            let name = definition
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("tool_{}", index));
            entries.push(ToolEntry {
                source: format!("tools[{}]", index),
                kind: ToolEntryKind::Definition,
                name,
                payload: tool.clone(),
            });
        }
    }

    let mut containers = message_containers(root);
    // A bare single-turn document can carry content blocks at the root
    if root
        .get("content")
        .and_then(Value::as_array)
        .is_some_and(|blocks| !blocks.is_empty())
    {
        containers.push(("root.content".to_string(), root));
    }

    for (source, node) in containers {
        let Some(blocks) = node.get("content").and_then(Value::as_array) else {
            continue;
        };

        for (index, block) in blocks.iter().enumerate() {
            let Some(map) = block.as_object() else {
                continue;
            };
            let Some(kind) = map.get("type").and_then(Value::as_str) else {
                continue;
            };

            match kind {
                "tool_use" => {
                    let name = map
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("tool_use_{}", index));
                    let payload = map
                        .get("input")
                        .filter(|input| !input.is_null())
                        .cloned()
                        .unwrap_or_else(|| block.clone());
                    entries.push(ToolEntry {
                        source: format!("{}.content[{}]", source, index),
                        kind: ToolEntryKind::Invocation,
                        name,
                        payload,
                    });
                }
                "tool_result" => {
                    let name = map
                        .get("tool_use_id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("tool_result_{}", index));
                    entries.push(ToolEntry {
                        source: format!("{}.content[{}]", source, index),
                        kind: ToolEntryKind::Result,
                        name,
                        payload: block.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    entries
}

fn extract_mcp(root: &Map<String, Value>) -> Vec<McpEntry> {
    let mut entries = Vec::new();

    if let (Some(method), Some(jsonrpc)) = (
        root.get("method").and_then(Value::as_str),
        root.get("jsonrpc").and_then(Value::as_str),
    ) {
        entries.push(McpEntry {
            source: "root".to_string(),
            method: method.to_string(),
            payload: serde_json::json!({
                "jsonrpc": jsonrpc,
                "id": root.get("id").cloned().unwrap_or(Value::Null),
                "params": root.get("params").cloned().unwrap_or(Value::Null),
            }),
        });
    }

    if let Some(servers) = root.get("mcp_servers").and_then(Value::as_object) {
        for (name, config) in servers {
            entries.push(McpEntry {
                source: format!("mcp_servers.{}", name),
                method: name.clone(),
                payload: config.clone(),
            });
        }
    }

    entries
}

fn extract_skills(root: &Map<String, Value>) -> Vec<SkillEntry> {
    let mut entries: Vec<SkillEntry> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    if let Some(skills) = root.get("load_skills").and_then(Value::as_array) {
        for (index, skill) in skills.iter().enumerate() {
            if let Some(name) = skill.as_str() {
                add_skill(
                    &mut entries,
                    &mut seen,
                    format!("load_skills[{}]", index),
                    name,
                );
            }
        }
    }

    for (source, node) in message_containers(root) {
        match node.get("content") {
            Some(Value::String(text)) => {
                scan_text_for_skills(&mut entries, &mut seen, text, &format!("{}.content", source));
            }
            Some(Value::Array(parts)) => {
                for (index, part) in parts.iter().enumerate() {
                    let Some(map) = part.as_object() else {
                        continue;
                    };

                    if let Some(text) = map.get("text").and_then(Value::as_str) {
                        scan_text_for_skills(
                            &mut entries,
                            &mut seen,
                            text,
                            &format!("{}.content[{}].text", source, index),
                        );
                    }

                    // Tool-use inputs can request skills too
                    if let Some(nested) = map
                        .get("input")
                        .and_then(|input| input.get("load_skills"))
                        .and_then(Value::as_array)
                    {
                        for (skill_index, skill) in nested.iter().enumerate() {
                            if let Some(name) = skill.as_str() {
                                add_skill(
                                    &mut entries,
                                    &mut seen,
                                    format!(
                                        "{}.content[{}].input.load_skills[{}]",
                                        source, index, skill_index
                                    ),
                                    name,
                                );
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    entries
}

fn add_skill(
    entries: &mut Vec<SkillEntry>,
    seen: &mut HashSet<(String, String)>,
    source: String,
    name: &str,
) {
    if seen.insert((source.clone(), name.to_string())) {
        entries.push(SkillEntry {
            source,
            name: name.to_string(),
        });
    }
}

fn scan_text_for_skills(
    entries: &mut Vec<SkillEntry>,
    seen: &mut HashSet<(String, String)>,
    text: &str,
    source: &str,
) {
    // Cheap prefilter before running the regex over long prompt text
    if !text.contains("skills") && !text.contains("Skill tool") {
        return;
    }

    for captures in SKILL_NAME_REGEX.captures_iter(text) {
        add_skill(entries, seen, source.to_string(), &captures[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_from_root_and_containers() {
        let document = serde_json::json!({
            "role": "assistant",
            "content": "top",
            "messages": [
                { "role": "user", "content": "hi" },
                { "no_role": true },
                { "role": "assistant", "content": [{ "type": "text", "text": "yo" }] }
            ],
            "input": [
                { "role": "developer", "content": "sys" }
            ]
        });

        let roles = extract_dialogue(&document).roles;

        assert_eq!(roles.len(), 4);
        assert_eq!(roles[0].source, "root.role");
        assert_eq!(roles[0].role, "assistant");
        assert_eq!(roles[1].source, "messages[0]");
        assert_eq!(roles[2].source, "messages[2]");
        assert_eq!(roles[3].source, "input[0]");
        assert_eq!(roles[3].role, "developer");
    }

    #[test]
    fn test_tools_definitions_invocations_results() {
        let document = serde_json::json!({
            "tools": [
                { "name": "web_search", "description": "..." },
                { "description": "anonymous" },
                "not an object"
            ],
            "messages": [
                {
                    "role": "assistant",
                    "content": [
                        { "type": "text", "text": "calling" },
                        { "type": "tool_use", "id": "toolu_1", "name": "web_search",
                          "input": { "query": "rust" } }
                    ]
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "tool_result", "tool_use_id": "toolu_1", "content": "ok" }
                    ]
                }
            ]
        });

        let tools = extract_dialogue(&document).tools;

        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0].kind, ToolEntryKind::Definition);
        assert_eq!(tools[0].name, "web_search");
        assert_eq!(tools[1].name, "tool_1");
        assert_eq!(tools[2].kind, ToolEntryKind::Invocation);
        assert_eq!(tools[2].source, "messages[0].content[1]");
        assert_eq!(tools[2].payload, serde_json::json!({ "query": "rust" }));
        assert_eq!(tools[3].kind, ToolEntryKind::Result);
        assert_eq!(tools[3].name, "toolu_1");
    }

    #[test]
    fn test_invocation_without_input_keeps_whole_block() {
        let document = serde_json::json!({
            "messages": [
                {
                    "role": "assistant",
                    "content": [{ "type": "tool_use", "id": "toolu_2", "name": "noop" }]
                }
            ]
        });

        let tools = extract_dialogue(&document).tools;

        assert_eq!(tools.len(), 1);
        assert_eq!(
            tools[0].payload,
            serde_json::json!({ "type": "tool_use", "id": "toolu_2", "name": "noop" })
        );
    }

    #[test]
    fn test_root_content_blocks_are_scanned() {
        let document = serde_json::json!({
            "input": [],
            "content": [
                { "type": "tool_use", "id": "toolu_3", "name": "root_tool", "input": {} }
            ]
        });

        let tools = extract_dialogue(&document).tools;

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].source, "root.content[0]");
    }

    #[test]
    fn test_mcp_root_call_and_servers() {
        let document = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": { "name": "query" },
            "mcp_servers": {
                "sqlite": { "command": "mcp-sqlite" },
                "web": { "url": "https://example.test" }
            },
            "messages": []
        });

        let mcp = extract_dialogue(&document).mcp;

        assert_eq!(mcp.len(), 3);
        assert_eq!(mcp[0].source, "root");
        assert_eq!(mcp[0].method, "tools/call");
        assert_eq!(mcp[0].payload["jsonrpc"], "2.0");
        assert_eq!(mcp[0].payload["id"], 4);
        assert_eq!(mcp[1].source, "mcp_servers.sqlite");
        assert_eq!(mcp[2].method, "web");
    }

    #[test]
    fn test_skills_structural_and_deduped() {
        let document = serde_json::json!({
            "load_skills": ["web-search", "code-review", "web-search"],
            "messages": []
        });

        let skills = extract_dialogue(&document).skills;

        // Same name at different positions is two distinct sources
        assert_eq!(skills.len(), 3);
        assert_eq!(skills[0].name, "web-search");
        assert_eq!(skills[0].source, "load_skills[0]");
        assert_eq!(skills[1].name, "code-review");
        assert_eq!(skills[2].source, "load_skills[2]");
    }

    #[test]
    fn test_skills_scanned_from_text_with_prefilter() {
        let document = serde_json::json!({
            "messages": [
                {
                    "role": "system",
                    "content": "Available skills:\n- web-search: find things\n- code-review: review code\n- web-search: repeated"
                },
                {
                    "role": "system",
                    "content": "- hidden-skill: no trigger word here"
                }
            ]
        });

        let skills = extract_dialogue(&document).skills;

        // Repeated name in the same text dedupes; the prefilter skips the
        // second message entirely
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "web-search");
        assert_eq!(skills[0].source, "messages[0].content");
        assert_eq!(skills[1].name, "code-review");
    }

    #[test]
    fn test_skills_from_tool_use_input() {
        let document = serde_json::json!({
            "messages": [
                {
                    "role": "assistant",
                    "content": [
                        {
                            "type": "tool_use",
                            "id": "toolu_4",
                            "name": "Skill",
                            "input": { "load_skills": ["pdf-tools"] }
                        }
                    ]
                }
            ]
        });

        let skills = extract_dialogue(&document).skills;

        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "pdf-tools");
        assert_eq!(skills[0].source, "messages[0].content[0].input.load_skills[0]");
    }

    #[test]
    fn test_non_object_document_yields_nothing() {
        let projections = extract_dialogue(&serde_json::json!([1, 2, 3]));
        assert!(projections.is_empty());
    }
}
