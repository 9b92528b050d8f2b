// clearurls-core/src/runner.rs
//! The URL cleaning engine.
//!
//! Providers are applied in list order, pass after pass, until a full pass
//! leaves the URL unchanged. A provider whose redirection matches ends the
//! pass early; the unwrapped target is then cleaned from the first provider
//! again.
//!
//! Per provider, in order:
//! 1. skip it unless `match_url` holds (URL pattern matches, no exception does);
//! 2. a redirection match aborts the pass and yields the decoded target;
//! 3. complete providers stop here;
//! 4. query keys, then fragment keys, accepted by `rules_key_filter` are removed;
//! 5. `rawRules` are stripped from the resulting URL text.
//!
//! License: MIT OR APACHE 2.0

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::errors::{ClearUrlsError, Result};
use crate::providers::{compile_providers, CompiledProvider, RunnableProvider};
use crate::query::{encode_query, is_parameter_fragment, parse_query, query_unescape, split_url, QueryPair};

/// Options controlling one cleaning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Keep parameters that match a provider's `referralMarketing` patterns.
    pub keep_referrals: bool,
    /// Evaluate redirections of complete providers before skipping them.
    ///
    /// This is what the ClearURLs add-on does; its documentation says complete
    /// providers are skipped outright, which `false` reproduces.
    pub redirect_before_complete: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            keep_referrals: false,
            redirect_before_complete: true,
        }
    }
}

impl CleanOptions {
    pub fn keeping_referrals(keep_referrals: bool) -> Self {
        Self {
            keep_referrals,
            ..Self::default()
        }
    }
}

/// Result of one pass over the provider list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PassOutcome {
    Cleaned(String),
    Redirected { provider: String, target: String },
}

/// Cleans `url` with `providers` until it reaches a fixed point.
///
/// Any provider error aborts cleaning; no partially cleaned URL is returned.
pub fn clean_url<P: RunnableProvider>(providers: &[P], url: &str, keep_referrals: bool) -> Result<String> {
    clean_url_with_options(providers, url, &CleanOptions::keeping_referrals(keep_referrals))
}

/// Same as [`clean_url`] with explicit [`CleanOptions`].
pub fn clean_url_with_options<P: RunnableProvider>(
    providers: &[P],
    url: &str,
    options: &CleanOptions,
) -> Result<String> {
    let mut current = url.to_string();
    let mut seen = HashSet::new();
    let mut passes = 0usize;
    loop {
        passes += 1;
        let next = match run_providers(providers, &current, options)? {
            PassOutcome::Cleaned(next) => next,
            PassOutcome::Redirected { provider, target } => {
                debug!("Pass {}: provider '{}' unwrapped a redirection.", passes, provider);
                target
            }
        };
        if next == current {
            debug!("URL stable after {} pass(es).", passes);
            trace!("Cleaned URL: {}", next);
            return Ok(next);
        }
        seen.insert(current);
        if seen.contains(&next) {
            return Err(ClearUrlsError::CleaningCycle { url: url.to_string() });
        }
        current = next;
    }
}

/// Runs every provider once over `url`, stopping at the first redirection.
fn run_providers<P: RunnableProvider>(providers: &[P], url: &str, options: &CleanOptions) -> Result<PassOutcome> {
    let mut running = url.to_string();
    for provider in providers {
        if !provider.match_url(&running)? {
            continue;
        }
        trace!("Provider '{}' matched.", provider.name());

        if provider.is_complete() && !options.redirect_before_complete {
            continue;
        }
        if let Some(target) = redirect_target(provider, &running)? {
            return Ok(PassOutcome::Redirected {
                provider: provider.name().to_string(),
                target,
            });
        }
        if provider.is_complete() {
            continue;
        }

        running = apply_rules(provider, &running, options.keep_referrals)?;
    }
    Ok(PassOutcome::Cleaned(running))
}

/// The decoded redirect target of `provider` for `url`, if any.
///
/// An empty capture is not a redirection.
fn redirect_target<P: RunnableProvider>(provider: &P, url: &str) -> Result<Option<String>> {
    let Some(groups) = provider.has_redirect(url)? else {
        return Ok(None);
    };
    let Some(first) = groups.first() else {
        return Err(ClearUrlsError::RedirectAmbiguity {
            provider: provider.name().to_string(),
            url: url.to_string(),
            detail: "no capture group".to_string(),
        });
    };
    let target = query_unescape(first)?;
    Ok(Some(target).filter(|t| !t.is_empty()))
}

/// Removes the keys of `pairs` that `provider` filters out.
fn filter_pairs<P: RunnableProvider>(
    provider: &P,
    mut pairs: Vec<QueryPair>,
    keep_referrals: bool,
) -> Result<Vec<QueryPair>> {
    let mut to_delete = BTreeSet::new();
    for pair in &pairs {
        if !to_delete.contains(&pair.key) && provider.rules_key_filter(&pair.key_text(), keep_referrals)? {
            to_delete.insert(pair.key.clone());
        }
    }
    if !to_delete.is_empty() {
        debug!("Provider '{}' removes {} key(s).", provider.name(), to_delete.len());
        pairs.retain(|pair| !to_delete.contains(&pair.key));
    }
    Ok(pairs)
}

/// Applies the query, fragment and raw rules of one provider.
fn apply_rules<P: RunnableProvider>(provider: &P, url: &str, keep_referrals: bool) -> Result<String> {
    let parts = split_url(url)?;

    let query_pairs = parse_query(parts.query.unwrap_or_default())?;
    let query = encode_query(&filter_pairs(provider, query_pairs, keep_referrals)?);

    let fragment = match parts.fragment {
        Some(fragment) if is_parameter_fragment(fragment) => {
            let fragment_pairs = parse_query(fragment)?;
            Some(encode_query(&filter_pairs(provider, fragment_pairs, keep_referrals)?))
        }
        other => other.map(str::to_string),
    };

    let rewritten = parts.join(&query, fragment.as_deref());
    provider.apply_raw_rules(&rewritten)
}

/// A compiled provider set bundled with the options it is run with.
///
/// Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct UrlCleaner {
    providers: Arc<Vec<CompiledProvider>>,
    options: CleanOptions,
}

impl UrlCleaner {
    /// Compiles `providers` (a no-op for already compiled ones).
    pub fn new<P: RunnableProvider>(providers: &[P], options: CleanOptions) -> Result<Self> {
        Ok(Self {
            providers: Arc::new(compile_providers(providers)?),
            options,
        })
    }

    pub fn clean(&self, url: &str) -> Result<String> {
        clean_url_with_options(self.providers.as_slice(), url, &self.options)
    }

    pub fn providers(&self) -> &[CompiledProvider] {
        &self.providers
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }
}
