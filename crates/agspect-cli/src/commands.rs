use crate::args::{Cli, Commands};
use crate::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse {
            file,
            target,
            preview,
        } => handlers::parse::handle(&file, target.into(), preview, cli.format),

        Commands::Frames { file, preview } => handlers::frames::handle(&file, preview, cli.format),

        Commands::Detect { file } => handlers::detect::handle(&file, cli.format),
    }
}
