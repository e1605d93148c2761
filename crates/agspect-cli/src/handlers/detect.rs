use crate::output::Printer;
use crate::types::OutputFormat;
use agspect_providers::classify_exchange;
use agspect_types::CapturedExchange;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(file: &Path, format: OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read exchange file: {}", file.display()))?;
    let exchange: CapturedExchange = serde_json::from_str(&raw)
        .with_context(|| format!("Not a captured exchange record: {}", file.display()))?;

    let classification = classify_exchange(&exchange);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&classification)?),
        OutputFormat::Plain => {
            let printer = Printer::new();
            printer.heading(&format!(
                "{} {}{}",
                exchange.method, exchange.host, exchange.path
            ));
            printer.field("agent", classification.agent.label());
            printer.field("protocol", classification.protocol.as_str());
            if let Some(provider) = &classification.api_provider {
                printer.field("provider", provider);
            }
            printer.field(
                "streaming",
                if classification.is_sse_response {
                    "sse"
                } else {
                    "no"
                },
            );
        }
    }

    Ok(())
}
