//! prepared.rs - The intermediate, textual form of a provider.
//!
//! Every list field is collapsed into one case-insensitive alternation string.
//! This form is what gets compiled and what gets serialized when generating
//! source code; it cannot evaluate URLs itself.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ClearUrlsError, ProviderField, Result};
use crate::providers::{CompiledProvider, RunnableProvider};
use crate::regex_utils::build_optional_regex;

/// A provider whose patterns are combined strings, ready to be compiled.
///
/// Empty strings stand for absent patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedProvider {
    pub name: String,
    pub url_pattern: String,
    pub complete_provider: bool,
    pub rules: String,
    pub raw_rules: String,
    pub referral_marketing: String,
    pub exceptions: String,
    pub redirections: Vec<String>,
}

impl PreparedProvider {
    fn unsupported(&self, operation: &'static str) -> ClearUrlsError {
        ClearUrlsError::UnsupportedOperation {
            provider: self.name.clone(),
            operation,
        }
    }

    fn compile_field(&self, field: ProviderField, pattern: &str) -> Result<Option<Regex>> {
        build_optional_regex(pattern).map_err(|source| ClearUrlsError::PatternCompile {
            provider: self.name.clone(),
            field,
            pattern: pattern.to_string(),
            source,
        })
    }
}

impl RunnableProvider for PreparedProvider {
    fn match_url(&self, _url: &str) -> Result<bool> {
        Err(self.unsupported("match_url"))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_complete(&self) -> bool {
        self.complete_provider
    }

    fn has_redirect(&self, _url: &str) -> Result<Option<Vec<String>>> {
        Err(self.unsupported("has_redirect"))
    }

    fn apply_raw_rules(&self, _url: &str) -> Result<String> {
        Err(self.unsupported("apply_raw_rules"))
    }

    fn rules_key_filter(&self, _key: &str, _keep_referrals: bool) -> Result<bool> {
        Err(self.unsupported("rules_key_filter"))
    }

    fn to_prepared(&self) -> PreparedProvider {
        self.clone()
    }

    fn to_compiled(&self) -> Result<CompiledProvider> {
        debug!("Compiling provider '{}'.", self.name);
        let mut redirections = Vec::with_capacity(self.redirections.len());
        for pattern in &self.redirections {
            if let Some(regex) = self.compile_field(ProviderField::Redirections, pattern)? {
                redirections.push(regex);
            }
        }
        Ok(CompiledProvider {
            name: self.name.clone(),
            complete_provider: self.complete_provider,
            url_pattern: self.compile_field(ProviderField::UrlPattern, &self.url_pattern)?,
            rules: self.compile_field(ProviderField::Rules, &self.rules)?,
            raw_rules: self.compile_field(ProviderField::RawRules, &self.raw_rules)?,
            referral_marketing: self.compile_field(ProviderField::ReferralMarketing, &self.referral_marketing)?,
            exceptions: self.compile_field(ProviderField::Exceptions, &self.exceptions)?,
            redirections,
        })
    }
}
