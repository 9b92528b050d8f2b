//! codegen.rs - Emitting provider sets as Rust source or JSON.
//!
//! Generated Rust source declares a `bundled_prepared_providers()` function
//! returning the prepared form of every provider, so a downstream crate can
//! embed a rules snapshot without shipping or downloading the JSON document.
//! Output is deterministic: the same providers always render byte-identical
//! text, whichever representation they are given in.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::errors::{ClearUrlsError, Result};
use crate::providers::{PreparedProvider, RunnableProvider};

/// Name of the function declared by [`generate_rust_source`].
pub const GENERATED_FN_NAME: &str = "bundled_prepared_providers";

static RUST_TEMPLATE: &str = r#"// Code generated by `cleanurls generate`. DO NOT EDIT.
// {count} providers.

use clearurls_core::PreparedProvider;

/// The providers this file was generated from, in rules document order.
pub fn {fn_name}() -> Vec<PreparedProvider> \{
    vec![
{{ for p in providers }}        PreparedProvider \{
            name: String::from({p.name}),
            url_pattern: String::from({p.url_pattern}),
            complete_provider: {p.complete_provider},
            rules: String::from({p.rules}),
            raw_rules: String::from({p.raw_rules}),
            referral_marketing: String::from({p.referral_marketing}),
            exceptions: String::from({p.exceptions}),
            redirections: vec![{{ for r in p.redirections }}String::from({r}), {{ endfor }}],
        },
{{ endfor }}    ]
}
"#;

/// A prepared provider with every string already written as a Rust literal.
#[derive(Serialize)]
struct ProviderLiterals {
    name: String,
    url_pattern: String,
    complete_provider: bool,
    rules: String,
    raw_rules: String,
    referral_marketing: String,
    exceptions: String,
    redirections: Vec<String>,
}

#[derive(Serialize)]
struct SourceContext {
    count: usize,
    fn_name: &'static str,
    providers: Vec<ProviderLiterals>,
}

/// Quotes `text` as a Rust string literal.
fn rust_literal(text: &str) -> String {
    format!("{text:?}")
}

impl From<&PreparedProvider> for ProviderLiterals {
    fn from(p: &PreparedProvider) -> Self {
        Self {
            name: rust_literal(&p.name),
            url_pattern: rust_literal(&p.url_pattern),
            complete_provider: p.complete_provider,
            rules: rust_literal(&p.rules),
            raw_rules: rust_literal(&p.raw_rules),
            referral_marketing: rust_literal(&p.referral_marketing),
            exceptions: rust_literal(&p.exceptions),
            redirections: p.redirections.iter().map(|r| rust_literal(r)).collect(),
        }
    }
}

/// Renders `providers` as Rust source declaring [`GENERATED_FN_NAME`].
pub fn generate_rust_source<P: RunnableProvider>(providers: &[P]) -> Result<String> {
    let prepared: Vec<PreparedProvider> = providers.iter().map(RunnableProvider::to_prepared).collect();
    let context = SourceContext {
        count: prepared.len(),
        fn_name: GENERATED_FN_NAME,
        providers: prepared.iter().map(ProviderLiterals::from).collect(),
    };

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("rust", RUST_TEMPLATE)
        .map_err(|e| ClearUrlsError::Codegen(format!("invalid template: {e}")))?;
    let source = tt
        .render("rust", &context)
        .map_err(|e| ClearUrlsError::Codegen(e.to_string()))?;
    debug!("Generated {} bytes of Rust source for {} providers.", source.len(), context.count);
    Ok(source)
}

/// Renders `providers` as a pretty-printed JSON array of prepared providers.
pub fn prepared_to_json<P: RunnableProvider>(providers: &[P]) -> Result<String> {
    let prepared: Vec<PreparedProvider> = providers.iter().map(RunnableProvider::to_prepared).collect();
    let mut json = serde_json::to_string_pretty(&prepared)?;
    json.push('\n');
    Ok(json)
}
