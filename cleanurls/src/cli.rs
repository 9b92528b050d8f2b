// cleanurls/src/cli.rs
//! This file defines the command-line interface (CLI) for the cleanurls application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "cleanurls",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Strip tracking parameters and unwrap redirect links using the ClearURLs rules",
    long_about = "cleanurls applies the ClearURLs rules to URLs: it removes tracking parameters from query strings and fragments, strips raw tracking substrings and unwraps redirect links until the URL stops changing. Rules come from the bundled snapshot, a rules file, or the official GitHub/GitLab mirrors (optionally cached).",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress all informational and debug messages.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a configuration file (YAML).
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        env = "CLEANURLS_CONFIG",
        help = "Path to a configuration file (YAML). Defaults to the first file found in the standard locations."
    )]
    pub config: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `cleanurls` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cleans one URL, or every line read from stdin.
    #[command(about = "Clean a URL, or each line of stdin when URL is '-'.")]
    Clean(CleanCommand),

    /// Writes a provider set as Rust source or JSON.
    #[command(about = "Generate Rust source (or JSON) embedding a provider set.")]
    Generate(GenerateCommand),

    /// Runs the built-in cleaning scenarios against a source.
    #[command(name = "self-test", about = "Run the built-in cleaning scenarios against a rule source.")]
    SelfTest(SelfTestCommand),

    /// Lists the known rule sources.
    #[command(about = "List the known rule sources and the source argument syntax.")]
    Sources(SourcesCommand),
}

/// Arguments for the `clean` command.
#[derive(Parser, Debug)]
pub struct CleanCommand {
    /// The URL to clean, or `-` for newline-separated URLs on stdin.
    #[arg(value_name = "URL", help = "The URL to clean, or '-' to read one URL per line from stdin.")]
    pub url: String,

    /// Rule source argument, overriding the configuration file.
    #[arg(long, short = 's', value_name = "SOURCE", help = "Rule source: <source>[:<cache_file>[:<max_age_minutes>]].")]
    pub source: Option<String>,

    /// Keep parameters matched by `referralMarketing` patterns.
    #[arg(long = "keep-referrals", short = 'k', help = "Keep referral marketing parameters (e.g. affiliate tags).")]
    pub keep_referrals: bool,
}

/// Arguments for the `generate` command.
#[derive(Parser, Debug)]
pub struct GenerateCommand {
    /// Destination file, or `-` for stdout.
    #[arg(value_name = "DEST", help = "Destination file, or '-' to write to stdout.")]
    pub destination: String,

    /// Rule source argument, overriding the configuration file.
    #[arg(long, short = 's', value_name = "SOURCE", help = "Rule source: <source>[:<cache_file>[:<max_age_minutes>]].")]
    pub source: Option<String>,

    /// Output format.
    #[arg(long, short = 'f', value_enum, default_value = "rust", help = "Output format.")]
    pub format: OutputFormat,
}

/// Arguments for the `self-test` command.
#[derive(Parser, Debug)]
pub struct SelfTestCommand {
    /// Rule source argument, overriding the configuration file.
    #[arg(long, short = 's', value_name = "SOURCE", help = "Rule source: <source>[:<cache_file>[:<max_age_minutes>]].")]
    pub source: Option<String>,
}

/// Arguments for the `sources` command.
#[derive(Parser, Debug)]
pub struct SourcesCommand {
    /// Print the list as JSON.
    #[arg(long, help = "Print the list as JSON.")]
    pub json: bool,
}

/// Output formats of the `generate` command.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rust source declaring `bundled_prepared_providers()`.
    Rust,
    /// A JSON array of prepared providers.
    Json,
}
