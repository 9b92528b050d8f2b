//! errors.rs - Custom error types for the clearurls-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Every variant carries enough context (provider name, pattern, URL) to
//! diagnose a failure without re-running the operation.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = ClearUrlsError> = std::result::Result<T, E>;

/// The provider fields that hold regular expressions.
///
/// Used to name the offending field when a pattern fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderField {
    UrlPattern,
    Rules,
    RawRules,
    ReferralMarketing,
    Exceptions,
    Redirections,
}

impl fmt::Display for ProviderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Names as they appear in the rules document.
        let name = match self {
            ProviderField::UrlPattern => "urlPattern",
            ProviderField::Rules => "rules",
            ProviderField::RawRules => "rawRules",
            ProviderField::ReferralMarketing => "referralMarketing",
            ProviderField::Exceptions => "exceptions",
            ProviderField::Redirections => "redirections",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong while loading, compiling or applying rules.
///
/// Data errors name the provider, URL or document at fault; only
/// [`ClearUrlsError::UnsupportedOperation`] signals a caller bug.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClearUrlsError {
    #[error("Provider '{provider}': failed to compile {field} pattern '{pattern}': {source}")]
    PatternCompile {
        provider: String,
        field: ProviderField,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("URL '{url}': provider '{provider}': ambiguous redirection ({detail})")]
    RedirectAmbiguity {
        provider: String,
        url: String,
        detail: String,
    },

    #[error("Failed to parse URL '{url}': {source}")]
    UrlParse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to parse query string '{input}': {detail}")]
    QueryParse { input: String, detail: String },

    /// A matching operation was called on a representation that cannot match.
    /// This is a bug at the call site, not a problem with the rule data.
    #[error("Provider '{provider}': operation '{operation}' is not supported by the prepared representation")]
    UnsupportedOperation {
        provider: String,
        operation: &'static str,
    },

    #[error("Cleaning '{url}' revisited an earlier URL, the rules redirect in a cycle")]
    CleaningCycle { url: String },

    #[error("Failed to download '{url}': {detail}")]
    Download { url: String, detail: String },

    #[error("Invalid checksum for '{data_url}' (against '{hash_url}'): expected '{expected}', got '{actual}'")]
    ChecksumMismatch {
        data_url: String,
        hash_url: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid rules document: {0}")]
    InvalidRules(String),

    #[error("Invalid source argument: {0}")]
    InvalidSource(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to render generated source: {0}")]
    Codegen(String),

    #[error("Failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}

impl ClearUrlsError {
    /// Returns `true` for errors caused by a programming mistake rather than by data.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ClearUrlsError::UnsupportedOperation { .. })
    }
}
