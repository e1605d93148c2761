use crate::output::Printer;
use crate::types::OutputFormat;
use agspect_engine::parse_body;
use agspect_types::{
    ContentBlock, DialogueProjections, ParseOutcome, ParseTarget, ReconstructedTurn, preview_text,
    preview_value,
};
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(
    file: &Path,
    target: ParseTarget,
    preview: usize,
    format: OutputFormat,
) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read body file: {}", file.display()))?;

    let outcome = parse_body(&raw, target);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Plain => match &outcome {
            ParseOutcome::Dialogue {
                target,
                projections,
                ..
            } => print_dialogue(*target, projections, preview),
            ParseOutcome::Stream {
                target,
                frames,
                turn,
                aggregated_text,
            } => print_stream(*target, frames.len(), turn, aggregated_text, preview),
        },
    }

    Ok(())
}

fn print_dialogue(target: ParseTarget, projections: &DialogueProjections, preview: usize) {
    let printer = Printer::new();

    printer.heading(&format!("Dialogue {} body", target.as_str()));
    printer.field(
        "entries",
        &format!(
            "roles:{} tools:{} mcp:{} skills:{}",
            projections.roles.len(),
            projections.tools.len(),
            projections.mcp.len(),
            projections.skills.len()
        ),
    );

    if !projections.roles.is_empty() {
        printer.blank();
        printer.heading("Roles");
        for entry in &projections.roles {
            printer.entry(
                &entry.role,
                &preview_value(entry.content.as_ref(), preview),
                &entry.source,
            );
        }
    }

    if !projections.tools.is_empty() {
        printer.blank();
        printer.heading("Tools");
        for entry in &projections.tools {
            let badge = format!("{} {}", entry.kind.as_str(), entry.name);
            printer.entry(&badge, &preview_value(Some(&entry.payload), preview), &entry.source);
        }
    }

    if !projections.mcp.is_empty() {
        printer.blank();
        printer.heading("MCP");
        for entry in &projections.mcp {
            printer.entry(
                &entry.method,
                &preview_value(Some(&entry.payload), preview),
                &entry.source,
            );
        }
    }

    if !projections.skills.is_empty() {
        printer.blank();
        printer.heading("Skills");
        for entry in &projections.skills {
            printer.entry(&entry.name, "", &entry.source);
        }
    }
}

fn print_stream(
    target: ParseTarget,
    frame_count: usize,
    turn: &ReconstructedTurn,
    aggregated_text: &str,
    preview: usize,
) {
    let printer = Printer::new();

    printer.heading(&format!(
        "Stream {} body ({} frames)",
        target.as_str(),
        frame_count
    ));
    if let Some(model) = &turn.model {
        printer.field("model", model);
    }
    if let Some(stop_reason) = &turn.stop_reason {
        printer.field("stop_reason", stop_reason);
    }
    if let Some(usage) = &turn.usage {
        let mut parts = Vec::new();
        if let Some(tokens) = usage.input_tokens {
            parts.push(format!("in:{}", tokens));
        }
        if let Some(tokens) = usage.output_tokens {
            parts.push(format!("out:{}", tokens));
        }
        if let Some(tokens) = usage.cache_read_input_tokens {
            parts.push(format!("cache_read:{}", tokens));
        }
        if let Some(tokens) = usage.cache_creation_input_tokens {
            parts.push(format!("cache_creation:{}", tokens));
        }
        printer.field("usage", &parts.join(" "));
    }

    if !turn.content.is_empty() {
        printer.blank();
        printer.heading("Content");
        for (index, block) in turn.content.iter().enumerate() {
            let source = format!("block[{}]", index);
            match block {
                ContentBlock::Thinking { thinking, .. } => {
                    printer.entry("thinking", &preview_text(thinking, preview), &source);
                }
                ContentBlock::Text { text } => {
                    printer.entry("text", &preview_text(text, preview), &source);
                }
                ContentBlock::ToolUse { name, input, .. } => {
                    printer.entry(
                        &format!("tool_use {}", name),
                        &preview_value(Some(input), preview),
                        &source,
                    );
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let badge = if *is_error {
                        format!("tool_result! {}", tool_use_id)
                    } else {
                        format!("tool_result {}", tool_use_id)
                    };
                    printer.entry(&badge, &preview_text(content, preview), &source);
                }
            }
        }
    }

    printer.blank();
    printer.heading("Aggregated text");
    printer.field("text", &preview_text(aggregated_text, preview));
}
