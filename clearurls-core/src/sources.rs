//! sources.rs - Where provider rules come from.
//!
//! A rule source is described by a short argument of the form
//! `<source>[:<cache_file>[:<cache_max_age_minutes>]]`, convenient for CLI
//! flags and configuration files:
//!
//! * `bundled` (alias `hardcoded`): the rules document embedded in this crate.
//! * `github` / `gitlab`: download from the official ClearURLs mirrors,
//!   optionally through a cache file that expires after the given minutes
//!   (no age, or `0`, means the cache never expires).
//! * `file:<path>`: a rules document on disk.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::OnceCell;

use crate::download::{cached_fetch_rules, fetch_rules, DownloadSource};
use crate::errors::{ClearUrlsError, Result};
use crate::providers::{compile_providers, parse_rules_document, CompiledProvider, RawProvider};

/// The rules document shipped inside the crate.
pub const BUNDLED_RULES: &str = include_str!("../config/bundled_rules.json");

static BUNDLED_COMPILED: OnceCell<Vec<CompiledProvider>> = OnceCell::new();

/// Parses the bundled rules document.
pub fn bundled_providers() -> Result<Vec<RawProvider>> {
    debug!("Loading bundled rules from embedded string...");
    parse_rules_document(BUNDLED_RULES.as_bytes())
}

/// The bundled providers, compiled once per process.
pub fn bundled_compiled_providers() -> Result<&'static [CompiledProvider]> {
    BUNDLED_COMPILED
        .get_or_try_init(|| compile_providers(&bundled_providers()?))
        .map(Vec::as_slice)
}

/// A known origin of provider rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Bundled,
    GitHub,
    GitLab,
    File(PathBuf),
}

impl RuleSource {
    /// Names accepted as `<source>` in a source argument.
    pub const NAMES: [&'static str; 4] = ["bundled", "github", "gitlab", "file"];

    /// Download locations for remote sources.
    pub fn download_source(&self) -> Option<&'static DownloadSource> {
        match self {
            RuleSource::GitHub => Some(&DownloadSource::GITHUB),
            RuleSource::GitLab => Some(&DownloadSource::GITLAB),
            RuleSource::Bundled | RuleSource::File(_) => None,
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Bundled => f.write_str("bundled"),
            RuleSource::GitHub => f.write_str("github"),
            RuleSource::GitLab => f.write_str("gitlab"),
            RuleSource::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// A parsed source argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source: RuleSource,
    pub cache_file: Option<PathBuf>,
    /// `None` means a cache file never expires.
    pub cache_max_age: Option<Duration>,
}

impl SourceSpec {
    pub fn bundled() -> Self {
        Self {
            source: RuleSource::Bundled,
            cache_file: None,
            cache_max_age: None,
        }
    }

    /// Parses `<source>[:<cache_file>[:<cache_max_age_minutes>]]`.
    pub fn parse(argument: &str) -> Result<Self> {
        let invalid = |detail: &str| ClearUrlsError::InvalidSource(format!("'{argument}': {detail}"));

        let (name, rest) = match argument.split_once(':') {
            Some((name, rest)) => (name, rest),
            None => (argument, ""),
        };
        if name.is_empty() {
            return Err(invalid("missing source name"));
        }

        // A trailing `:<digits>` (possibly empty) is the max age.
        let (cache_file, max_age) = match rest.rsplit_once(':') {
            Some((file, age)) if age.bytes().all(|b| b.is_ascii_digit()) && !file.is_empty() => (file, age),
            _ => (rest, ""),
        };
        let cache_max_age = if max_age.is_empty() {
            None
        } else {
            let minutes: u64 = max_age.parse().map_err(|_| invalid("invalid cache max age"))?;
            (minutes > 0).then(|| Duration::from_secs(minutes * 60))
        };
        let cache_file = (!cache_file.is_empty()).then(|| PathBuf::from(cache_file));

        let source = match name.to_ascii_lowercase().as_str() {
            "bundled" | "hardcoded" => RuleSource::Bundled,
            "github" => RuleSource::GitHub,
            "gitlab" => RuleSource::GitLab,
            "file" => {
                let path = cache_file.ok_or_else(|| invalid("'file' needs a path"))?;
                return Ok(Self {
                    source: RuleSource::File(path),
                    cache_file: None,
                    cache_max_age: None,
                });
            }
            _ => return Err(invalid(&format!("unknown source, expected one of {}", RuleSource::NAMES.join(", ")))),
        };
        Ok(Self {
            source,
            cache_file,
            cache_max_age,
        })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if let Some(cache_file) = &self.cache_file {
            write!(f, ":{}", cache_file.display())?;
            if let Some(age) = self.cache_max_age {
                write!(f, ":{}", age.as_secs() / 60)?;
            }
        }
        Ok(())
    }
}

/// Anything able to produce raw providers.
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Vec<RawProvider>>;
}

#[async_trait]
impl ProviderLoader for SourceSpec {
    fn describe(&self) -> String {
        self.to_string()
    }

    async fn load(&self) -> Result<Vec<RawProvider>> {
        info!("Loading providers from '{}'.", self);
        let providers = match &self.source {
            RuleSource::Bundled => bundled_providers()?,
            RuleSource::File(path) => {
                let data = tokio::fs::read(path).await?;
                parse_rules_document(&data)?
            }
            remote => {
                let download = remote
                    .download_source()
                    .ok_or_else(|| ClearUrlsError::InvalidSource(remote.to_string()))?;
                let data = match &self.cache_file {
                    Some(cache_file) => cached_fetch_rules(download, cache_file, self.cache_max_age, true).await?,
                    None => fetch_rules(download, true).await?,
                };
                parse_rules_document(&data)?
            }
        };
        info!("Got {} providers from '{}'.", providers.len(), self);
        Ok(providers)
    }
}

/// Loads raw providers from a source argument.
pub async fn load_providers(argument: &str) -> Result<Vec<RawProvider>> {
    SourceSpec::parse(argument)?.load().await
}

/// Loads and compiles providers from a source argument.
pub async fn load_compiled_providers(argument: &str) -> Result<Vec<CompiledProvider>> {
    let spec = SourceSpec::parse(argument)?;
    if spec.source == RuleSource::Bundled {
        return Ok(bundled_compiled_providers()?.to_vec());
    }
    compile_providers(&spec.load().await?)
}
