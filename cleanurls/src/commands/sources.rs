// cleanurls/src/commands/sources.rs
//! The `sources` command: lists the rule sources a source argument may name.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use clearurls_core::{config_candidate_paths, default_cache_file, RuleSource};

use crate::cli::SourcesCommand;

/// One row of the listing.
#[derive(Debug, Serialize)]
pub struct SourceInfo {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_url: Option<&'static str>,
}

fn describe(source: &RuleSource) -> (&'static str, &'static str) {
    match source {
        RuleSource::Bundled => ("bundled", "Rules snapshot compiled into this binary (alias: hardcoded)."),
        RuleSource::GitHub => ("github", "Official rules from the GitHub mirror, checksum verified."),
        RuleSource::GitLab => ("gitlab", "Official rules from the GitLab mirror, checksum verified."),
        RuleSource::File(_) => ("file", "A rules document on disk: file:<path>."),
    }
}

/// All known sources, in display order.
pub fn known_sources() -> Vec<SourceInfo> {
    [
        RuleSource::Bundled,
        RuleSource::GitHub,
        RuleSource::GitLab,
        RuleSource::File(Default::default()),
    ]
    .iter()
    .map(|source| {
        let (name, description) = describe(source);
        let download = source.download_source();
        SourceInfo {
            name,
            description,
            data_url: download.map(|d| d.data_url),
            hash_url: download.map(|d| d.hash_url),
        }
    })
    .collect()
}

pub fn run_sources(cmd: &SourcesCommand) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_sources(&mut out, cmd.json)?;
    out.flush()?;
    Ok(())
}

pub fn write_sources<W: Write>(out: &mut W, json: bool) -> Result<()> {
    let sources = known_sources();
    if json {
        serde_json::to_writer_pretty(&mut *out, &sources)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Source argument: <source>[:<cache_file>[:<max_age_minutes>]]")?;
    writeln!(out)?;
    for source in &sources {
        writeln!(out, "  {:<8} {}", source.name, source.description)?;
        if let Some(data_url) = source.data_url {
            writeln!(out, "  {:<8}   {}", "", data_url)?;
        }
    }
    writeln!(out)?;
    if let Some(cache_file) = default_cache_file() {
        writeln!(out, "Suggested cache file: {}", cache_file.display())?;
    }
    writeln!(out, "Configuration files:")?;
    for path in config_candidate_paths() {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_names_every_source() {
        let mut out = Vec::new();
        write_sources(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        for name in RuleSource::NAMES {
            assert!(text.contains(name), "{name} missing from:\n{text}");
        }
        assert!(text.contains("https://rules2.clearurls.xyz/data.minify.json"));
    }

    #[test]
    fn test_json_listing() {
        let mut out = Vec::new();
        write_sources(&mut out, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(4));
        assert!(parsed[0].get("data_url").is_none());
        assert_eq!(parsed[2]["hash_url"], "https://rules1.clearurls.xyz/rules.minify.hash");
    }
}
