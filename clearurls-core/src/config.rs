//! Configuration management for `clearurls-core`.
//!
//! A small YAML file selects the rule source and the default cleaning
//! options. Every field is optional; command-line flags override file values.
//!
//! ```yaml
//! source: "github:/home/me/.cache/cleanurls/rules.json:1440"
//! keep_referrals: false
//! redirect_before_complete: true
//! ```
//!
//! License: MIT OR APACHE 2.0

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{ClearUrlsError, Result};
use crate::runner::CleanOptions;
use crate::sources::SourceSpec;

/// Directory name used under the platform config and cache directories.
pub const APP_DIR_NAME: &str = "cleanurls";

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanerConfig {
    /// A source argument, see [`SourceSpec::parse`].
    pub source: String,
    pub keep_referrals: bool,
    pub redirect_before_complete: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        let options = CleanOptions::default();
        Self {
            source: "bundled".to_string(),
            keep_referrals: options.keep_referrals,
            redirect_before_complete: options.redirect_before_complete,
        }
    }
}

impl CleanerConfig {
    /// Loads and validates a configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClearUrlsError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: CleanerConfig = serde_yml::from_str(&text)
            .map_err(|e| ClearUrlsError::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Loads the first existing file of [`config_candidate_paths`], or the defaults.
    pub fn discover() -> Result<Self> {
        match config_candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("No configuration file found, using defaults.");
                Ok(Self::default())
            }
        }
    }

    /// Checks that `source` is a valid source argument.
    pub fn validate(&self) -> Result<()> {
        self.source_spec()
            .map(|_| ())
            .map_err(|e| ClearUrlsError::Config(format!("invalid 'source': {e}")))
    }

    pub fn source_spec(&self) -> Result<SourceSpec> {
        SourceSpec::parse(&self.source)
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            keep_referrals: self.keep_referrals,
            redirect_before_complete: self.redirect_before_complete,
        }
    }
}

/// Where configuration files are looked for, most specific first.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{APP_DIR_NAME}")).join(CONFIG_FILE_NAME));
    }
    paths
}

/// Default cache file for downloaded rules, if the platform has a cache directory.
pub fn default_cache_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_DIR_NAME).join("rules.minify.json"))
}
