use crate::types::{OutputFormat, TargetArg};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agspect")]
#[command(about = "Inspect captured AI-agent traffic bodies", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct the structured dialogue carried by one body file
    Parse {
        /// File holding one HTTP body (JSON document, SSE text, or JSON lines)
        file: PathBuf,

        /// Which side of the exchange the body belongs to
        #[arg(long, value_enum, default_value = "response")]
        target: TargetArg,

        /// Preview length for plain output entries
        #[arg(long, default_value_t = agspect_types::DEFAULT_PREVIEW_LEN)]
        preview: usize,
    },

    /// Dump the decoded frame sequence of a stream body
    Frames {
        /// File holding SSE text or JSON lines
        file: PathBuf,

        /// Preview length for plain output entries
        #[arg(long, default_value_t = agspect_types::DEFAULT_PREVIEW_LEN)]
        preview: usize,
    },

    /// Detect agent, protocol, and streaming mode of a captured exchange
    Detect {
        /// File holding one captured exchange record as JSON
        file: PathBuf,
    },
}
