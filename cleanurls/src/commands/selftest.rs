// cleanurls/src/commands/selftest.rs
//! The `self-test` command: checks a rule source against known cleaning results.
//!
//! The scenarios hold for the official ClearURLs rules as well as for the
//! bundled snapshot, so a freshly downloaded document can be sanity-checked
//! before it is used.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;

use clearurls_core::{
    bundled_compiled_providers, clean_url, compile_providers, generate_rust_source, load_providers, RunnableProvider,
};

use crate::cli::SelfTestCommand;
use crate::commands::CommandContext;
use crate::ui::output_format::print_message;
use crate::ui::theme::ThemeEntry;

/// `(input, expected)` pairs, cleaned with referral parameters removed.
pub const SCENARIOS: &[(&str, &str)] = &[
    ("https://amazon.com?zoup=com&keywords=truc", "https://amazon.com?zoup=com"),
    (
        "https://amazon.com?zoup=com&keywords=truc#bidule=truc&keywords=ohno",
        "https://amazon.com?zoup=com#bidule=truc",
    ),
    ("https://indeed.com?zoup=com&yclid=truc", "https://indeed.com?zoup=com"),
    ("https://indeed.com?yclid=truc", "https://indeed.com"),
    // exception
    (
        "https://indeed.com/rc/clk?from=com&keywords=truc",
        "https://indeed.com/rc/clk?from=com&keywords=truc",
    ),
    (
        "https://google.com/plop?adurl=https%3A%2F%2Famazon.com%3Fzoup%3Dcom",
        "https://amazon.com?zoup=com",
    ),
    (
        "https://google.com/plop?adurl=https%3A%2F%2Famazon.com%3Fzoup%3Dcom%26keywords%3Dtruc",
        "https://amazon.com?zoup=com",
    ),
];

/// Runs every scenario against `providers`, reporting each one. Returns the failure count.
pub fn run_scenarios<P: RunnableProvider, W: Write>(providers: &[P], out: &mut W, color: bool) -> io::Result<usize> {
    let mut failed = 0;
    for (url, expected) in SCENARIOS {
        match clean_url(providers, url, false) {
            Ok(cleaned) if cleaned == *expected => {
                print_message(out, ThemeEntry::Success, &format!("{url:?} -> {cleaned:?}"), color)?;
            }
            Ok(cleaned) => {
                print_message(
                    out,
                    ThemeEntry::Error,
                    &format!("{url:?} -> {cleaned:?}, expected {expected:?}"),
                    color,
                )?;
                failed += 1;
            }
            Err(e) => {
                print_message(out, ThemeEntry::Error, &format!("{url:?}: {e}"), color)?;
                failed += 1;
            }
        }
    }
    Ok(failed)
}

/// Runs the full check on already loaded providers. Returns the failure count.
pub fn self_test<P: RunnableProvider, W: Write>(providers: &[P], out: &mut W, color: bool) -> Result<usize> {
    let was_compiled = providers.first().is_some_and(|p| p.is_compiled());
    print_message(
        out,
        ThemeEntry::Header,
        &format!("Got {} providers (compiled: {})", providers.len(), was_compiled),
        color,
    )?;
    let mut failed = run_scenarios(providers, out, color)?;

    if !was_compiled {
        let compiled = compile_providers(providers)?;
        print_message(out, ThemeEntry::Header, "Re-running on compiled providers", color)?;
        failed += run_scenarios(&compiled, out, color)?;
        if generate_rust_source(providers)? == generate_rust_source(&compiled)? {
            print_message(out, ThemeEntry::Success, "Generated source matches for raw and compiled", color)?;
        } else {
            print_message(out, ThemeEntry::Error, "Generated source differs for raw and compiled", color)?;
            failed += 1;
        }
    }

    let bundled = bundled_compiled_providers().context("Failed to load the bundled providers")?;
    print_message(out, ThemeEntry::Header, &format!("Got {} bundled providers", bundled.len()), color)?;
    failed += run_scenarios(bundled, out, color)?;
    Ok(failed)
}

pub async fn run_self_test(cmd: &SelfTestCommand, ctx: &CommandContext) -> Result<()> {
    let source = ctx.source(cmd.source.as_deref());
    let providers = load_providers(source)
        .await
        .with_context(|| format!("Failed to load providers from '{source}'"))?;

    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    let failed = self_test(&providers, &mut stderr, color)?;
    if failed > 0 {
        bail!("Got {failed} failure(s)");
    }
    ctx.info("All checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearurls_core::{bundled_providers, RawProvider};
    use test_log::test;

    #[test]
    fn test_bundled_rules_pass() {
        let mut out = Vec::new();
        let failed = self_test(&bundled_providers().unwrap(), &mut out, false).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert_eq!(failed, 0, "{report}");
        assert!(report.contains("Generated source matches"));
        assert!(!report.contains("FAIL"));
    }

    #[test]
    fn test_failures_are_counted() {
        let empty = vec![RawProvider::new("nothing", "^https?://nowhere\\.example")];
        let mut out = Vec::new();
        let failed = run_scenarios(&empty, &mut out, false).unwrap();
        // Only the exception scenario expects an unchanged URL.
        assert_eq!(failed, SCENARIOS.len() - 1);
    }
}
