use crate::output::Printer;
use crate::types::OutputFormat;
use agspect_engine::decode_frames;
use agspect_types::preview_text;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(file: &Path, preview: usize, format: OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read body file: {}", file.display()))?;

    let frames = decode_frames(&raw);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frames)?),
        OutputFormat::Plain => {
            let printer = Printer::new();
            printer.heading(&format!("Frames ({})", frames.len()));
            for frame in &frames {
                printer.entry(
                    &frame.event_label,
                    &preview_text(&frame.raw_payload, preview),
                    &format!("#{}", frame.sequence),
                );
            }
        }
    }

    Ok(())
}
