// cleanurls/src/commands/mod.rs
//! Implementations of the `cleanurls` subcommands.
//!
//! Every command receives a [`CommandContext`] holding the resolved
//! configuration; command-line flags take precedence over its values.

pub mod clean;
pub mod generate;
pub mod selftest;
pub mod sources;

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use clearurls_core::CleanerConfig;

use crate::ui::output_format;

/// State shared by all commands of one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: CleanerConfig,
    pub quiet: bool,
}

impl CommandContext {
    /// Loads `config_path`, or discovers a configuration file when it is `None`.
    pub fn load(config_path: Option<&Path>, quiet: bool) -> Result<Self> {
        let config = match config_path {
            Some(path) => CleanerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration '{}'", path.display()))?,
            None => CleanerConfig::discover().context("Failed to load configuration")?,
        };
        debug!("Effective configuration: {:?}", config);
        Ok(Self { config, quiet })
    }

    /// The source argument to use: the flag if given, else the configured one.
    pub fn source<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.unwrap_or(&self.config.source)
    }

    /// Prints a status message on stderr unless `--quiet` was given.
    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            output_format::info_msg(msg);
        }
    }
}
