// clearurls-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use clearurls_core::config::{self, CleanerConfig};
use clearurls_core::{load_compiled_providers, load_providers, clean_url, ClearUrlsError, RuleSource, SourceSpec};

#[test]
fn test_load_from_file() -> Result<()> {
    let yaml_content = r#"
source: "github:/tmp/cleanurls/rules.json:1440"
keep_referrals: true
redirect_before_complete: false
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let config = CleanerConfig::load_from_file(file.path())?;

    let spec = config.source_spec()?;
    assert_eq!(spec.source, RuleSource::GitHub);
    assert_eq!(spec.cache_max_age, Some(Duration::from_secs(1440 * 60)));

    let options = config.clean_options();
    assert!(options.keep_referrals);
    assert!(!options.redirect_before_complete);
    Ok(())
}

#[test]
fn test_empty_file_yields_defaults() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"{}\n")?;
    assert_eq!(CleanerConfig::load_from_file(file.path())?, CleanerConfig::default());
    Ok(())
}

#[test]
fn test_missing_file_is_config_error() {
    let err = CleanerConfig::load_from_file("/definitely/not/here/config.yaml").unwrap_err();
    assert!(matches!(err, ClearUrlsError::Config(_)));
}

#[test]
fn test_default_cache_file_is_under_app_dir() {
    if let Some(path) = config::default_cache_file() {
        assert!(path.parent().is_some_and(|dir| dir.ends_with(config::APP_DIR_NAME)));
    }
}

#[test]
fn test_source_spec_display_round_trips() -> Result<()> {
    for argument in ["bundled", "gitlab", "github:/tmp/rules.json", "github:/tmp/rules.json:30"] {
        assert_eq!(SourceSpec::parse(argument)?.to_string(), argument);
    }
    Ok(())
}

#[tokio::test]
async fn test_file_source_loads_and_cleans() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"{"providers":{"shop":{"urlPattern":"^https?://shop\\.example","rules":["campaign","src"]}}}"#,
    )?;
    let argument = format!("file:{}", file.path().display());

    let raw = load_providers(&argument).await?;
    assert_eq!(raw.len(), 1);

    let compiled = load_compiled_providers(&argument).await?;
    let cleaned = clean_url(&compiled, "https://shop.example/item?id=3&campaign=x&SRC=y", false)?;
    assert_eq!(cleaned, "https://shop.example/item?id=3");
    Ok(())
}

#[tokio::test]
async fn test_bundled_source_loads_compiled() -> Result<()> {
    let compiled = load_compiled_providers("bundled").await?;
    assert!(compiled.iter().any(|p| p.name == "google"));
    Ok(())
}
