// cleanurls/src/commands/clean.rs
//! The `clean` command: cleans one URL, or one URL per stdin line.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use log::{debug, info};

use clearurls_core::{load_compiled_providers, UrlCleaner};

use crate::cli::CleanCommand;
use crate::commands::CommandContext;
use crate::ui::output_format;

/// URL argument meaning "read URLs from stdin".
pub const STDIN_MARKER: &str = "-";

pub async fn run_clean(cmd: &CleanCommand, ctx: &CommandContext) -> Result<()> {
    let source = ctx.source(cmd.source.as_deref());
    let providers = load_compiled_providers(source)
        .await
        .with_context(|| format!("Failed to load providers from '{source}'"))?;
    info!("Loaded {} providers from '{}'.", providers.len(), source);

    let mut options = ctx.config.clean_options();
    options.keep_referrals |= cmd.keep_referrals;
    let cleaner = UrlCleaner::new(&providers, options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cmd.url == STDIN_MARKER {
        let failures = clean_lines(&cleaner, io::stdin().lock(), &mut out)?;
        if failures > 0 {
            bail!("{failures} URL(s) could not be cleaned");
        }
    } else {
        let cleaned = cleaner
            .clean(&cmd.url)
            .with_context(|| format!("Failed to clean '{}'", cmd.url))?;
        writeln!(out, "{cleaned}")?;
    }
    out.flush()?;
    Ok(())
}

/// Cleans every non-blank line of `reader`, writing one result per line.
///
/// A URL that fails to clean is reported on stderr and skipped; the number
/// of such failures is returned.
pub fn clean_lines<R: BufRead, W: Write>(cleaner: &UrlCleaner, reader: R, out: &mut W) -> Result<usize> {
    let mut failures = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read from stdin")?;
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        match cleaner.clean(url) {
            Ok(cleaned) => writeln!(out, "{cleaned}")?,
            Err(e) => {
                debug!("Line {}: {:?}", index + 1, e);
                output_format::error_msg(format!("line {}: {}", index + 1, e));
                failures += 1;
            }
        }
    }
    Ok(failures)
}
