//! compiled.rs - Providers with every pattern compiled once.
//!
//! This is the only representation meant for cleaning many URLs: compilation
//! cost is paid once at construction, after which the provider is immutable
//! and can be shared across threads.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::Regex;

use crate::errors::Result;
use crate::providers::{single_redirect, PreparedProvider, RunnableProvider};

/// A provider whose patterns are compiled regular expressions.
///
/// `None` fields are absent patterns and match nothing.
#[derive(Debug, Clone)]
pub struct CompiledProvider {
    pub name: String,
    pub url_pattern: Option<Regex>,
    pub complete_provider: bool,
    pub rules: Option<Regex>,
    pub raw_rules: Option<Regex>,
    pub referral_marketing: Option<Regex>,
    pub exceptions: Option<Regex>,
    pub redirections: Vec<Regex>,
}

fn is_match(regex: &Option<Regex>, haystack: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(haystack))
}

fn pattern_text(regex: &Option<Regex>) -> String {
    regex.as_ref().map(|re| re.as_str().to_string()).unwrap_or_default()
}

impl RunnableProvider for CompiledProvider {
    fn match_url(&self, url: &str) -> Result<bool> {
        if !is_match(&self.url_pattern, url) {
            return Ok(false);
        }
        Ok(!is_match(&self.exceptions, url))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_complete(&self) -> bool {
        self.complete_provider
    }

    fn has_redirect(&self, url: &str) -> Result<Option<Vec<String>>> {
        single_redirect(&self.name, url, &self.redirections)
    }

    fn apply_raw_rules(&self, url: &str) -> Result<String> {
        Ok(match &self.raw_rules {
            Some(raw_rules) => raw_rules.replace_all(url, "").into_owned(),
            None => url.to_string(),
        })
    }

    fn rules_key_filter(&self, key: &str, keep_referrals: bool) -> Result<bool> {
        let should_remove = is_match(&self.rules, key);
        if should_remove && keep_referrals && is_match(&self.referral_marketing, key) {
            return Ok(false);
        }
        Ok(should_remove)
    }

    fn to_prepared(&self) -> PreparedProvider {
        PreparedProvider {
            name: self.name.clone(),
            complete_provider: self.complete_provider,
            url_pattern: pattern_text(&self.url_pattern),
            rules: pattern_text(&self.rules),
            raw_rules: pattern_text(&self.raw_rules),
            referral_marketing: pattern_text(&self.referral_marketing),
            exceptions: pattern_text(&self.exceptions),
            redirections: self
                .redirections
                .iter()
                .map(|re| re.as_str().to_string())
                .collect(),
        }
    }

    fn to_compiled(&self) -> Result<CompiledProvider> {
        Ok(self.clone())
    }

    fn is_compiled(&self) -> bool {
        true
    }
}

/// Compiles every provider of `providers`, in order.
///
/// Fails on the first provider that does not compile; the error names the
/// provider, the field and the pattern.
pub fn compile_providers<P: RunnableProvider>(providers: &[P]) -> Result<Vec<CompiledProvider>> {
    debug!("Starting compilation of {} providers.", providers.len());
    let compiled = providers
        .iter()
        .map(RunnableProvider::to_compiled)
        .collect::<Result<Vec<_>>>()?;
    debug!("Finished compiling providers. Total compiled: {}.", compiled.len());
    Ok(compiled)
}
