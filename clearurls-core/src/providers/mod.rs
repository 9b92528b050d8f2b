// clearurls-core/src/providers/mod.rs
//! Defines the `RunnableProvider` trait and the three provider representations.
//!
//! A provider is one named entry of the ClearURLs rules document. It exists in
//! one of three forms that differ only in how their regular expressions are
//! stored:
//!
//! * [`RawProvider`]: fragment lists exactly as read from the rules document,
//!   compiled on demand for every evaluation.
//! * [`PreparedProvider`]: one combined, case-insensitive pattern string per
//!   field. It cannot match anything; it is the bridge between the other two
//!   forms and the canonical text used for code generation.
//! * [`CompiledProvider`]: ready-to-use `Regex` values, built once and shared.
//!
//! The [`Provider`] enum holds exactly one of them, so heterogeneous lists can
//! be stored and cleaned with the same engine.
//!
//! License: MIT OR APACHE 2.0

pub mod compiled;
pub mod prepared;
pub mod raw;

use regex::Regex;

use crate::errors::{ClearUrlsError, Result};

pub use compiled::{compile_providers, CompiledProvider};
pub use prepared::PreparedProvider;
pub use raw::{parse_rules_document, RawProvider};

/// The capability set shared by every provider representation.
///
/// Matching-family operations (`match_url`, `has_redirect`, `apply_raw_rules`,
/// `rules_key_filter`) are only meaningful on the raw and compiled forms; the
/// prepared form answers them with [`ClearUrlsError::UnsupportedOperation`].
pub trait RunnableProvider: std::fmt::Debug + Send + Sync {
    /// True iff `urlPattern` matches `url` and no `exceptions` pattern does.
    fn match_url(&self, url: &str) -> Result<bool>;

    /// The unique name of the provider.
    fn name(&self) -> &str;

    /// The `completeProvider` flag.
    fn is_complete(&self) -> bool;

    /// Capture groups (group 1 onwards) of the single redirection pattern that
    /// matches `url`, or `None` when no redirection applies.
    ///
    /// More than one match, or a match whose capture group did not participate,
    /// is a [`ClearUrlsError::RedirectAmbiguity`].
    fn has_redirect(&self, url: &str) -> Result<Option<Vec<String>>>;

    /// Removes every substring matched by `rawRules` from the URL text.
    fn apply_raw_rules(&self, url: &str) -> Result<String>;

    /// Whether a query or fragment `key` should be removed.
    ///
    /// When `keep_referrals` is set, a key that also matches
    /// `referralMarketing` is kept.
    fn rules_key_filter(&self, key: &str, keep_referrals: bool) -> Result<bool>;

    /// The single-pattern textual form of this provider.
    fn to_prepared(&self) -> PreparedProvider;

    /// The compiled form of this provider.
    fn to_compiled(&self) -> Result<CompiledProvider>;

    /// True when every pattern is already compiled, so compiling again is wasted work.
    fn is_compiled(&self) -> bool {
        false
    }
}

/// A provider in exactly one of its three representations.
#[derive(Debug, Clone)]
pub enum Provider {
    Raw(RawProvider),
    Prepared(PreparedProvider),
    Compiled(CompiledProvider),
}

impl Provider {
    fn inner(&self) -> &dyn RunnableProvider {
        match self {
            Provider::Raw(p) => p,
            Provider::Prepared(p) => p,
            Provider::Compiled(p) => p,
        }
    }

    /// Converts this provider to its prepared form.
    pub fn prepare(&self) -> Provider {
        Provider::Prepared(self.to_prepared())
    }

    /// Converts this provider to its compiled form. Already compiled providers
    /// are returned unchanged.
    pub fn compile(self) -> Result<Provider> {
        match self {
            Provider::Compiled(_) => Ok(self),
            other => other.to_compiled().map(Provider::Compiled),
        }
    }

    /// Compiles a whole list, failing on the first provider that does not compile.
    pub fn compile_all(providers: Vec<Provider>) -> Result<Vec<Provider>> {
        providers.into_iter().map(Provider::compile).collect()
    }
}

impl RunnableProvider for Provider {
    fn match_url(&self, url: &str) -> Result<bool> {
        self.inner().match_url(url)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn is_complete(&self) -> bool {
        self.inner().is_complete()
    }

    fn has_redirect(&self, url: &str) -> Result<Option<Vec<String>>> {
        self.inner().has_redirect(url)
    }

    fn apply_raw_rules(&self, url: &str) -> Result<String> {
        self.inner().apply_raw_rules(url)
    }

    fn rules_key_filter(&self, key: &str, keep_referrals: bool) -> Result<bool> {
        self.inner().rules_key_filter(key, keep_referrals)
    }

    fn to_prepared(&self) -> PreparedProvider {
        self.inner().to_prepared()
    }

    fn to_compiled(&self) -> Result<CompiledProvider> {
        self.inner().to_compiled()
    }

    fn is_compiled(&self) -> bool {
        self.inner().is_compiled()
    }
}

impl From<RawProvider> for Provider {
    fn from(p: RawProvider) -> Self {
        Provider::Raw(p)
    }
}

impl From<PreparedProvider> for Provider {
    fn from(p: PreparedProvider) -> Self {
        Provider::Prepared(p)
    }
}

impl From<CompiledProvider> for Provider {
    fn from(p: CompiledProvider) -> Self {
        Provider::Compiled(p)
    }
}

impl<T: RunnableProvider + ?Sized> RunnableProvider for Box<T> {
    fn match_url(&self, url: &str) -> Result<bool> {
        (**self).match_url(url)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn has_redirect(&self, url: &str) -> Result<Option<Vec<String>>> {
        (**self).has_redirect(url)
    }

    fn apply_raw_rules(&self, url: &str) -> Result<String> {
        (**self).apply_raw_rules(url)
    }

    fn rules_key_filter(&self, key: &str, keep_referrals: bool) -> Result<bool> {
        (**self).rules_key_filter(key, keep_referrals)
    }

    fn to_prepared(&self) -> PreparedProvider {
        (**self).to_prepared()
    }

    fn to_compiled(&self) -> Result<CompiledProvider> {
        (**self).to_compiled()
    }

    fn is_compiled(&self) -> bool {
        (**self).is_compiled()
    }
}

/// Finds the single redirection among `patterns` that matches `url`.
///
/// Shared by the raw and compiled forms, which only differ in when the
/// patterns get compiled.
pub(crate) fn single_redirect(
    provider: &str,
    url: &str,
    patterns: &[Regex],
) -> Result<Option<Vec<String>>> {
    let ambiguity = |detail: String| ClearUrlsError::RedirectAmbiguity {
        provider: provider.to_string(),
        url: url.to_string(),
        detail,
    };

    let mut found: Option<(&str, Vec<String>)> = None;
    for pattern in patterns {
        let mut all_captures = pattern.captures_iter(url);
        let Some(captures) = all_captures.next() else {
            continue;
        };
        if all_captures.next().is_some() {
            return Err(ambiguity(format!("pattern '{}' matched more than once", pattern.as_str())));
        }
        if let Some((previous, _)) = found {
            return Err(ambiguity(format!(
                "patterns '{}' and '{}' both matched",
                previous,
                pattern.as_str()
            )));
        }
        if captures.get(1).is_none() {
            return Err(ambiguity(format!("pattern '{}' matched without a capture group", pattern.as_str())));
        }
        let groups = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        found = Some((pattern.as_str(), groups));
    }
    Ok(found.map(|(_, groups)| groups))
}
