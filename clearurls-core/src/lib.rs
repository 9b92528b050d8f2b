// clearurls-core/src/lib.rs
//! # ClearURLs Core Library
//!
//! `clearurls-core` applies the [ClearURLs](https://docs.clearurls.xyz/1.27.3/specs/rules/)
//! rules to URLs: it strips tracking parameters from query strings and
//! fragments, removes raw tracking substrings, and unwraps redirect links
//! (`…?adurl=https%3A%2F%2F…`) until the URL stops changing.
//!
//! ## Modules
//!
//! * `providers`: The `RunnableProvider` trait and the raw, prepared and compiled provider forms.
//! * `regex_utils`: Builds the anchored, case-insensitive alternations providers are made of.
//! * `runner`: The cleaning loop (`clean_url`) and the shareable `UrlCleaner`.
//! * `query`: Strict query string parsing and canonical re-encoding.
//! * `sources`: Source arguments (`bundled`, `github`, `gitlab`, `file`) and the bundled rules.
//! * `download`: Downloading the official rules with checksum verification and a file cache.
//! * `codegen`: Emitting a provider set as Rust source or JSON.
//! * `config`: The YAML configuration file.
//! * `errors`: The `ClearUrlsError` type.
//!
//! ## Usage Example
//!
//! ```rust
//! use clearurls_core::{bundled_providers, clean_url, compile_providers};
//!
//! fn main() -> clearurls_core::Result<()> {
//!     let providers = compile_providers(&bundled_providers()?)?;
//!     let cleaned = clean_url(&providers, "https://amazon.com?zoup=com&keywords=truc", false)?;
//!     assert_eq!(cleaned, "https://amazon.com?zoup=com");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`Result`], whose error is the structured
//! [`ClearUrlsError`]. Cleaning never returns a partially cleaned URL.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod codegen;
pub mod config;
pub mod download;
pub mod errors;
pub mod providers;
pub mod query;
pub mod regex_utils;
pub mod runner;
pub mod sources;

pub use errors::{ClearUrlsError, ProviderField, Result};

pub use providers::{
    compile_providers, parse_rules_document, CompiledProvider, PreparedProvider, Provider, RawProvider,
    RunnableProvider,
};

pub use runner::{clean_url, clean_url_with_options, CleanOptions, UrlCleaner};

pub use sources::{
    bundled_compiled_providers, bundled_providers, load_compiled_providers, load_providers, ProviderLoader,
    RuleSource, SourceSpec,
};

pub use download::{cached_fetch_rules, fetch_rules, DownloadSource};

pub use codegen::{generate_rust_source, prepared_to_json};

pub use config::{config_candidate_paths, default_cache_file, CleanerConfig};
