use agspect_types::ParseTarget;
use clap::ValueEnum;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-oriented text, colored when stdout is a terminal.
    Plain,
    /// Machine-oriented pretty-printed JSON.
    Json,
}

/// CLI-facing spelling of the parse target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Request,
    Response,
}

impl From<TargetArg> for ParseTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Request => ParseTarget::Request,
            TargetArg::Response => ParseTarget::Response,
        }
    }
}
