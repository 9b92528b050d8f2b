//! raw.rs - Providers exactly as they appear in the ClearURLs rules document.
//!
//! A `RawProvider` keeps every field as the list of fragments the document
//! supplies. It can be evaluated directly, compiling each fragment on demand,
//! which is slow but needs no preparation step. The usual path is to convert
//! it through [`PreparedProvider`] into a [`CompiledProvider`].
//!
//! License: MIT OR APACHE 2.0

use std::fmt;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ClearUrlsError, ProviderField, Result};
use crate::providers::{single_redirect, CompiledProvider, PreparedProvider, RunnableProvider};
use crate::regex_utils::{any_of, build_fragment_regex, build_regex, case_insensitive};

/// One provider entry of the rules document, before any preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProvider {
    /// The key of the entry in the `providers` object.
    #[serde(skip)]
    pub name: String,
    pub url_pattern: String,
    pub complete_provider: bool,
    pub rules: Vec<String>,
    pub raw_rules: Vec<String>,
    pub referral_marketing: Vec<String>,
    pub exceptions: Vec<String>,
    pub redirections: Vec<String>,
}

#[derive(Deserialize)]
struct RulesDocument {
    providers: serde_json::Map<String, serde_json::Value>,
}

/// Parses a ClearURLs rules document into raw providers, in document order.
pub fn parse_rules_document(data: &[u8]) -> Result<Vec<RawProvider>> {
    let document: RulesDocument = serde_json::from_slice(data)?;
    let mut providers = Vec::with_capacity(document.providers.len());
    for (name, entry) in document.providers {
        let mut provider: RawProvider = serde_json::from_value(entry)?;
        provider.name = name;
        if provider.complete_provider && provider.fragment_count() > 0 {
            warn!(
                "Provider '{}' is a complete provider but also carries rules ({}).",
                provider.name,
                provider.fragment_count()
            );
        }
        providers.push(provider);
    }
    debug!("Parsed {} providers from rules document.", providers.len());
    Ok(providers)
}

impl RawProvider {
    /// Creates an empty provider named `name` matching URLs with `url_pattern`.
    pub fn new(name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_pattern: url_pattern.into(),
            ..Default::default()
        }
    }

    fn fragment_count(&self) -> usize {
        self.rules.len()
            + self.raw_rules.len()
            + self.referral_marketing.len()
            + self.exceptions.len()
            + self.redirections.len()
    }

    fn fragment_regex(&self, field: ProviderField, fragment: &str, prefix: &str, suffix: &str) -> Result<Regex> {
        build_fragment_regex(fragment, prefix, suffix).map_err(|source| ClearUrlsError::PatternCompile {
            provider: self.name.clone(),
            field,
            pattern: fragment.to_string(),
            source,
        })
    }

    /// True if any fragment of `fragments` matches `haystack`.
    fn matches_any(
        &self,
        field: ProviderField,
        fragments: &[String],
        prefix: &str,
        suffix: &str,
        haystack: &str,
    ) -> Result<bool> {
        for fragment in fragments {
            if self.fragment_regex(field, fragment, prefix, suffix)?.is_match(haystack) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for RawProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawProvider '{}'", self.name)?;
        let counts = [
            ("r", self.rules.len()),
            ("rr", self.raw_rules.len()),
            ("rm", self.referral_marketing.len()),
            ("e", self.exceptions.len()),
            ("re", self.redirections.len()),
        ];
        for (label, count) in counts {
            if count > 0 {
                write!(f, " {label}:{count}")?;
            }
        }
        if self.complete_provider {
            f.write_str(" complete")?;
        }
        Ok(())
    }
}

impl RunnableProvider for RawProvider {
    fn match_url(&self, url: &str) -> Result<bool> {
        if self.url_pattern.is_empty() {
            return Ok(false);
        }
        let url_pattern = build_regex(&case_insensitive(&self.url_pattern))
            .map_err(|source| ClearUrlsError::PatternCompile {
                provider: self.name.clone(),
                field: ProviderField::UrlPattern,
                pattern: self.url_pattern.clone(),
                source,
            })?;
        if !url_pattern.is_match(url) {
            return Ok(false);
        }
        let is_exception = self.matches_any(ProviderField::Exceptions, &self.exceptions, "", "", url)?;
        Ok(!is_exception)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_complete(&self) -> bool {
        self.complete_provider
    }

    fn has_redirect(&self, url: &str) -> Result<Option<Vec<String>>> {
        let patterns = self
            .redirections
            .iter()
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| {
                build_regex(&case_insensitive(fragment)).map_err(|source| {
                    ClearUrlsError::PatternCompile {
                        provider: self.name.clone(),
                        field: ProviderField::Redirections,
                        pattern: fragment.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<Regex>>>()?;
        single_redirect(&self.name, url, &patterns)
    }

    fn apply_raw_rules(&self, url: &str) -> Result<String> {
        if self.raw_rules.is_empty() {
            return Ok(url.to_string());
        }
        // Single pass over the combined alternation, as in the compiled form.
        let combined = case_insensitive(&any_of(&self.raw_rules, "", ""));
        let regex = build_regex(&combined).map_err(|source| ClearUrlsError::PatternCompile {
            provider: self.name.clone(),
            field: ProviderField::RawRules,
            pattern: combined.clone(),
            source,
        })?;
        Ok(regex.replace_all(url, "").into_owned())
    }

    fn rules_key_filter(&self, key: &str, keep_referrals: bool) -> Result<bool> {
        let should_remove = self.matches_any(ProviderField::Rules, &self.rules, "^", "$", key)?;
        if should_remove && keep_referrals {
            let is_referral =
                self.matches_any(ProviderField::ReferralMarketing, &self.referral_marketing, "^", "$", key)?;
            return Ok(!is_referral);
        }
        Ok(should_remove)
    }

    fn to_prepared(&self) -> PreparedProvider {
        PreparedProvider {
            name: self.name.clone(),
            complete_provider: self.complete_provider,
            url_pattern: case_insensitive(&self.url_pattern),
            rules: case_insensitive(&any_of(&self.rules, "^", "$")),
            raw_rules: case_insensitive(&any_of(&self.raw_rules, "", "")),
            referral_marketing: case_insensitive(&any_of(&self.referral_marketing, "^", "$")),
            exceptions: case_insensitive(&any_of(&self.exceptions, "", "")),
            redirections: self
                .redirections
                .iter()
                .filter(|fragment| !fragment.is_empty())
                .map(|fragment| case_insensitive(fragment))
                .collect(),
        }
    }

    fn to_compiled(&self) -> Result<CompiledProvider> {
        self.to_prepared().to_compiled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "providers": {
            "zeta": {
                "urlPattern": "^https?://zeta\\.example",
                "rules": ["ref"],
                "forceRedirection": true
            },
            "alpha": {
                "urlPattern": "^https?://alpha\\.example",
                "completeProvider": true
            }
        }
    }"#;

    fn amazon() -> RawProvider {
        RawProvider {
            rules: vec!["keywords".to_string(), "tag".to_string()],
            referral_marketing: vec!["tag".to_string()],
            raw_rules: vec!["/ref=[^/?]*".to_string()],
            exceptions: vec!["^https?://amazon\\.com/gp/".to_string()],
            ..RawProvider::new("amazon", "^https?://(?:[a-z0-9-]+\\.)*?amazon\\.com")
        }
    }

    #[test]
    fn test_parse_keeps_document_order_and_names() {
        let providers = parse_rules_document(DOCUMENT.as_bytes()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(providers[0].rules, vec!["ref".to_string()]);
        assert!(providers[1].complete_provider);
        assert!(providers[1].rules.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_rules_document(b"not json"),
            Err(ClearUrlsError::Json(_))
        ));
    }

    #[test]
    fn test_match_url_honours_exceptions() {
        let provider = amazon();
        assert!(provider.match_url("https://AMAZON.com/dp/1?tag=x").unwrap());
        assert!(!provider.match_url("https://amazon.com/gp/help").unwrap());
        assert!(!provider.match_url("https://example.com/").unwrap());
    }

    #[test]
    fn test_empty_url_pattern_matches_nothing() {
        let provider = RawProvider::new("empty", "");
        assert!(!provider.match_url("https://example.com/").unwrap());
    }

    #[test]
    fn test_rules_key_filter_anchors_and_referrals() {
        let provider = amazon();
        assert!(provider.rules_key_filter("Keywords", false).unwrap());
        assert!(!provider.rules_key_filter("keywords2", false).unwrap());
        assert!(provider.rules_key_filter("tag", false).unwrap());
        assert!(!provider.rules_key_filter("tag", true).unwrap());
        assert!(provider.rules_key_filter("keywords", true).unwrap());
    }

    #[test]
    fn test_apply_raw_rules() {
        let provider = amazon();
        let cleaned = provider.apply_raw_rules("https://amazon.com/dp/1/ref=abc?x=1").unwrap();
        assert_eq!(cleaned, "https://amazon.com/dp/1?x=1");
    }

    #[test]
    fn test_overlapping_raw_rules_apply_in_one_pass() {
        let provider = RawProvider {
            raw_rules: vec!["b".to_string(), "ab".to_string()],
            ..RawProvider::new("overlap", "^https?://x\\.example")
        };
        let url = "https://x.example/ab";
        let compiled = provider.to_compiled().unwrap();
        assert_eq!(provider.apply_raw_rules(url).unwrap(), "https://x.example/");
        assert_eq!(provider.apply_raw_rules(url).unwrap(), compiled.apply_raw_rules(url).unwrap());
    }

    #[test]
    fn test_invalid_fragment_reports_field() {
        let provider = RawProvider {
            rules: vec!["(".to_string()],
            ..RawProvider::new("broken", ".*")
        };
        let err = provider.rules_key_filter("x", false).unwrap_err();
        match err {
            ClearUrlsError::PatternCompile { provider, field, .. } => {
                assert_eq!(provider, "broken");
                assert_eq!(field, ProviderField::Rules);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_summarises_counts() {
        assert_eq!(amazon().to_string(), "RawProvider 'amazon' r:2 rr:1 rm:1 e:1");
        let complete = RawProvider {
            complete_provider: true,
            ..RawProvider::new("c", ".*")
        };
        assert_eq!(complete.to_string(), "RawProvider 'c' complete");
    }

    #[test]
    fn test_to_prepared_combines_fragments() {
        let prepared = amazon().to_prepared();
        assert_eq!(prepared.rules, "(?i)^(?:(?:keywords)|(?:tag))$");
        assert_eq!(prepared.raw_rules, "(?i)(?:(?:/ref=[^/?]*))");
        assert!(prepared.redirections.is_empty());
        assert!(!amazon().is_compiled());
    }
}
