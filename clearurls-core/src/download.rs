//! download.rs - Fetching the official rules documents, with checksum and cache.
//!
//! The ClearURLs project publishes a minified rules document next to its
//! SHA-256 hash on two mirrors. Both are fetched concurrently; the document is
//! only returned once its hash matches and it parses and compiles.
//!
//! License: MIT OR APACHE 2.0

use std::future::Future;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::Utc;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};

use crate::errors::{ClearUrlsError, Result};
use crate::providers::{compile_providers, parse_rules_document, RawProvider};

const JSON_MIME: &str = "application/json";
const HASH_MIME: &str = "application/octet-stream";

/// A rules document URL paired with the URL of its SHA-256 hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSource {
    pub data_url: &'static str,
    pub hash_url: &'static str,
}

impl DownloadSource {
    /// The GitHub-hosted mirror.
    pub const GITHUB: DownloadSource = DownloadSource {
        data_url: "https://rules2.clearurls.xyz/data.minify.json",
        hash_url: "https://rules2.clearurls.xyz/rules.minify.hash",
    };

    /// The GitLab-hosted mirror.
    pub const GITLAB: DownloadSource = DownloadSource {
        data_url: "https://rules1.clearurls.xyz/data.minify.json",
        hash_url: "https://rules1.clearurls.xyz/rules.minify.hash",
    };
}

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("cleanurls/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GETs `url`, checking the status and that the `Content-Type` starts with `expected_mime`.
async fn get_http_body(client: &Client, url: &str, expected_mime: &str) -> Result<Vec<u8>> {
    let download_error = |detail: String| ClearUrlsError::Download {
        url: url.to_string(),
        detail,
    };
    debug!("GET '{}' started.", url);
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;
    debug!("GET '{}' ended with {}.", url, resp.status());
    if resp.status() != StatusCode::OK {
        return Err(download_error(format!("unexpected response code {}", resp.status())));
    }
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with(expected_mime) {
        return Err(download_error(format!(
            "wrong mime type ('{content_type}', expected '{expected_mime}')"
        )));
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Checks `data` against a hexadecimal SHA-256 digest, ignoring case and surrounding whitespace.
pub fn verify_checksum(source: &DownloadSource, data: &[u8], expected_hex: &str) -> Result<()> {
    let expected = expected_hex.trim();
    let actual = hex::encode(Sha256::digest(data));
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(ClearUrlsError::ChecksumMismatch {
            data_url: source.data_url.to_string(),
            hash_url: source.hash_url.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    debug!("Valid hash '{}' at {}.", expected, Utc::now().to_rfc3339());
    Ok(())
}

/// Parses `data` and checks it holds at least one provider and that all of them compile.
pub fn validate_document(data: &[u8]) -> Result<Vec<RawProvider>> {
    let providers = parse_rules_document(data)?;
    if providers.is_empty() {
        return Err(ClearUrlsError::InvalidRules("no providers found".to_string()));
    }
    compile_providers(&providers)
        .map_err(|e| ClearUrlsError::InvalidRules(format!("providers do not compile: {e}")))?;
    Ok(providers)
}

/// Downloads a rules document from `source`.
///
/// With `check_hash`, the document and its hash are fetched concurrently and
/// the document is rejected unless its SHA-256 matches.
pub async fn fetch_rules(source: &DownloadSource, check_hash: bool) -> Result<Vec<u8>> {
    let client = http_client()?;
    let data = if check_hash {
        let (data, hash) = tokio::try_join!(
            get_http_body(&client, source.data_url, JSON_MIME),
            get_http_body(&client, source.hash_url, HASH_MIME),
        )?;
        verify_checksum(source, &data, &String::from_utf8_lossy(&hash))?;
        data
    } else {
        get_http_body(&client, source.data_url, JSON_MIME).await?
    };
    let providers = validate_document(&data)?;
    info!("Downloaded {} providers from '{}'.", providers.len(), source.data_url);
    Ok(data)
}

/// Returns `true` when a cache file of age `age` may still be used.
pub fn is_cache_fresh(age: Duration, max_age: Option<Duration>) -> bool {
    max_age.map_or(true, |max_age| age < max_age)
}

/// Returns the content of `cache_file`, or calls `miss` and stores its result there.
///
/// The parent directory is created up front, even when `miss` later fails.
/// A failed `miss` leaves any existing cache file untouched.
pub async fn get_cached_data<F, Fut>(cache_file: &Path, max_age: Option<Duration>, miss: F) -> Result<Vec<u8>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    if let Some(parent) = cache_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    match tokio::fs::metadata(cache_file).await {
        Ok(metadata) => {
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or_default();
            info!("Cache: using '{}' ({}s old).", cache_file.display(), age.as_secs());
            let cached = tokio::fs::read(cache_file).await?;
            if is_cache_fresh(age, max_age) {
                return Ok(cached);
            }
            info!("Cache: expired, re-downloading '{}'.", cache_file.display());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Cache: '{}' does not exist yet.", cache_file.display());
        }
        Err(e) => return Err(e.into()),
    }

    let data = miss().await?;
    if let Err(e) = tokio::fs::write(cache_file, &data).await {
        warn!("Cache: failed to write '{}': {}", cache_file.display(), e);
        return Err(e.into());
    }
    Ok(data)
}

/// [`fetch_rules`] through a cache file.
pub async fn cached_fetch_rules(
    source: &DownloadSource,
    cache_file: &Path,
    max_age: Option<Duration>,
    check_hash: bool,
) -> Result<Vec<u8>> {
    get_cached_data(cache_file, max_age, || fetch_rules(source, check_hash)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{"providers":{"x":{"urlPattern":"^https://x\\.example","rules":["utm_source"]}}}"#;

    #[test]
    fn test_verify_checksum() {
        let digest = hex::encode(Sha256::digest(DOCUMENT.as_bytes()));
        let source = DownloadSource::GITHUB;
        assert!(verify_checksum(&source, DOCUMENT.as_bytes(), &format!("  {}\n", digest.to_uppercase())).is_ok());
        let err = verify_checksum(&source, b"tampered", &digest).unwrap_err();
        assert!(matches!(err, ClearUrlsError::ChecksumMismatch { ref expected, .. } if *expected == digest));
    }

    #[test]
    fn test_validate_document() {
        assert_eq!(validate_document(DOCUMENT.as_bytes()).unwrap().len(), 1);
        assert!(matches!(
            validate_document(br#"{"providers":{}}"#),
            Err(ClearUrlsError::InvalidRules(_))
        ));
        assert!(matches!(
            validate_document(br#"{"providers":{"x":{"urlPattern":"("}}}"#),
            Err(ClearUrlsError::InvalidRules(_))
        ));
    }

    #[test]
    fn test_cache_freshness() {
        let minute = Duration::from_secs(60);
        assert!(is_cache_fresh(minute * 1000, None));
        assert!(is_cache_fresh(minute, Some(minute * 2)));
        assert!(!is_cache_fresh(minute * 3, Some(minute * 2)));
    }

    #[tokio::test]
    async fn test_cache_miss_writes_file_then_hit_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let cache_file = dir.path().join("nested").join("rules.json");

        let first = get_cached_data(&cache_file, None, || async { Ok(DOCUMENT.as_bytes().to_vec()) })
            .await
            .unwrap();
        assert_eq!(first, DOCUMENT.as_bytes());
        assert!(cache_file.exists());

        let second = get_cached_data(&cache_file, None, || async {
            Err(ClearUrlsError::InvalidRules("must not be called".to_string()))
        })
        .await
        .unwrap();
        assert_eq!(second, DOCUMENT.as_bytes());
    }

    #[tokio::test]
    async fn test_failed_miss_keeps_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_file = dir.path().join("rules.json");
        std::fs::write(&cache_file, DOCUMENT).unwrap();

        // A zero max age is always expired.
        let result = get_cached_data(&cache_file, Some(Duration::ZERO), || async {
            Err(ClearUrlsError::InvalidRules("offline".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&cache_file).unwrap(), DOCUMENT);
    }
}
