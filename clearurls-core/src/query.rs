//! query.rs - Splitting URLs and (de)coding their query and fragment parameters.
//!
//! URLs are validated with the `url` crate, but rewritten textually: only the
//! query and fragment are touched, so the rest of the URL keeps the caller's
//! spelling (no trailing slash added, no host normalisation).
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;

use url::form_urlencoded;
use url::Url;

use crate::errors::{ClearUrlsError, Result};

/// One decoded `key=value` pair. Keys may repeat.
///
/// Both sides are kept as bytes: a well-formed escape need not decode to
/// UTF-8 (`%E9` from a latin-1 page), and such values must survive a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl QueryPair {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key as text for rule matching, invalid UTF-8 replaced.
    pub fn key_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}

/// A URL split into the text before the query, the query and the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub base: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// Validates `url` and splits it into its textual parts.
pub fn split_url(url: &str) -> Result<UrlParts<'_>> {
    Url::parse(url).map_err(|source| ClearUrlsError::UrlParse {
        url: url.to_string(),
        source,
    })?;
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match before_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (before_fragment, None),
    };
    Ok(UrlParts { base, query, fragment })
}

impl UrlParts<'_> {
    /// Rebuilds the URL text with a new query and fragment.
    ///
    /// Empty values drop their `?` or `#` separator.
    pub fn join(&self, query: &str, fragment: Option<&str>) -> String {
        let mut url = String::with_capacity(self.base.len() + query.len() + 2);
        url.push_str(self.base);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

fn query_error(input: &str, detail: impl Into<String>) -> ClearUrlsError {
    ClearUrlsError::QueryParse {
        input: input.to_string(),
        detail: detail.into(),
    }
}

/// Checks that every `%` starts a two digit hexadecimal escape.
fn validate_escapes(input: &str, whole: &str) -> Result<()> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(query_error(
                    whole,
                    format!("invalid escape '{}'", String::from_utf8_lossy(&bytes[i..end])),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Decodes one form-encoded component to bytes: `+` is a space, `%XX` is a byte.
fn unescape_bytes(input: &str, whole: &str) -> Result<Vec<u8>> {
    validate_escapes(input, whole)?;
    let spaced = input.replace('+', " ");
    Ok(urlencoding::decode_binary(spaced.as_bytes()).into_owned())
}

/// Decodes one form-encoded component to text.
///
/// Only malformed escapes are errors; bytes that are not UTF-8 are replaced.
pub fn query_unescape(input: &str) -> Result<String> {
    let decoded = unescape_bytes(input, input)?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

/// Parses a query string into decoded pairs, keeping their order.
///
/// Malformed escapes and `;` separators are errors, never silently dropped.
pub fn parse_query(input: &str) -> Result<Vec<QueryPair>> {
    let mut pairs = Vec::new();
    for segment in input.split('&').filter(|s| !s.is_empty()) {
        if segment.contains(';') {
            return Err(query_error(input, "invalid semicolon separator"));
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        pairs.push(QueryPair::new(unescape_bytes(key, input)?, unescape_bytes(value, input)?));
    }
    Ok(pairs)
}

/// Encodes pairs as `application/x-www-form-urlencoded`, sorted by key.
///
/// The sort is stable, so values of a repeated key keep their relative order.
pub fn encode_query(pairs: &[QueryPair]) -> String {
    let mut sorted: Vec<&QueryPair> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));
    sorted
        .into_iter()
        .map(|pair| {
            let key: String = form_urlencoded::byte_serialize(&pair.key).collect();
            let value: String = form_urlencoded::byte_serialize(&pair.value).collect();
            format!("{key}={value}")
        })
        .collect::<Vec<String>>()
        .join("&")
}

/// True when a fragment should be treated as a second query string.
pub fn is_parameter_fragment(fragment: &str) -> bool {
    let mut segments = fragment.split('&').filter(|s| !s.is_empty()).peekable();
    segments.peek().is_some() && segments.all(|segment| segment.contains('='))
}
