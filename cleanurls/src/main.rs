// cleanurls/src/main.rs
//! cleanurls entry point.
//!
//! Parses the command line, sets up logging and configuration, then runs the
//! selected subcommand.

use anyhow::Result;
use clap::Parser;

use cleanurls::cli::{Cli, Commands};
use cleanurls::commands::{clean, generate, selftest, sources, CommandContext};
use cleanurls::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    logger::init_logger(logger::level_from_flags(args.quiet, args.debug));

    if let Commands::Sources(cmd) = &args.command {
        return sources::run_sources(cmd);
    }

    let ctx = CommandContext::load(args.config.as_deref(), args.quiet)?;
    match &args.command {
        Commands::Clean(cmd) => clean::run_clean(cmd, &ctx).await,
        Commands::Generate(cmd) => generate::run_generate(cmd, &ctx).await,
        Commands::SelfTest(cmd) => selftest::run_self_test(cmd, &ctx).await,
        Commands::Sources(cmd) => sources::run_sources(cmd),
    }
}
