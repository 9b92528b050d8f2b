// clearurls-core/tests/cleaning_integration_tests.rs
use anyhow::Result;
use test_log::test;

use clearurls_core::{
    bundled_compiled_providers, bundled_providers, clean_url, clean_url_with_options, compile_providers,
    generate_rust_source, CleanOptions, ClearUrlsError, Provider, RawProvider, RunnableProvider, UrlCleaner,
};

/// `(input, expected)` pairs cleaned with the bundled rules, referrals removed.
const SCENARIOS: &[(&str, &str)] = &[
    ("https://amazon.com?zoup=com&keywords=truc", "https://amazon.com?zoup=com"),
    (
        "https://amazon.com?zoup=com&keywords=truc#bidule=truc&keywords=ohno",
        "https://amazon.com?zoup=com#bidule=truc",
    ),
    ("https://indeed.com?zoup=com&yclid=truc", "https://indeed.com?zoup=com"),
    ("https://indeed.com?yclid=truc", "https://indeed.com"),
    (
        "https://indeed.com/rc/clk?from=com&keywords=truc",
        "https://indeed.com/rc/clk?from=com&keywords=truc",
    ),
    (
        "https://google.com/plop?adurl=https%3A%2F%2Famazon.com%3Fzoup%3Dcom",
        "https://amazon.com?zoup=com",
    ),
    (
        "https://google.com/plop?adurl=https%3A%2F%2Famazon.com%3Fzoup%3Dcom%26keywords%3Dtruc",
        "https://amazon.com?zoup=com",
    ),
];

fn run_scenarios<P: RunnableProvider>(providers: &[P]) -> Result<()> {
    for (input, expected) in SCENARIOS {
        let cleaned = clean_url(providers, input, false)?;
        assert_eq!(&cleaned, expected, "cleaning {input}");
    }
    Ok(())
}

#[test]
fn test_scenarios_with_raw_providers() -> Result<()> {
    run_scenarios(&bundled_providers()?)
}

#[test]
fn test_scenarios_with_compiled_providers() -> Result<()> {
    run_scenarios(bundled_compiled_providers()?)
}

#[test]
fn test_scenarios_with_mixed_provider_list() -> Result<()> {
    // Every other provider compiled, the rest left raw.
    let mixed: Vec<Provider> = bundled_providers()?
        .into_iter()
        .enumerate()
        .map(|(i, raw)| if i % 2 == 0 { Provider::from(raw) } else { raw.to_compiled().map(Provider::from).unwrap() })
        .collect();
    run_scenarios(&mixed)?;
    assert!(Provider::compile_all(mixed)?.iter().all(|p| p.is_compiled()));
    Ok(())
}

#[test]
fn test_cleaning_is_idempotent() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    let urls = [
        "https://www.amazon.com/dp/B01/ref=sr_1_1?keywords=x&tag=abc-20&th=1",
        "https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com%2Fpage%3Fid%3D1%26fbclid%3Dabc&h=AT0",
        "https://www.google.com/search?q=rust+regex&ved=1&ei=2&oq=rust",
        "https://example.com/article?utm_source=news&utm_medium=mail&id=7#section",
    ];
    for url in urls {
        let once = clean_url(providers, url, false)?;
        let twice = clean_url(providers, &once, false)?;
        assert_eq!(once, twice, "cleaning {url}");
    }
    Ok(())
}

#[test]
fn test_raw_and_compiled_agree() -> Result<()> {
    let raw = bundled_providers()?;
    let compiled = compile_providers(&raw)?;
    let urls = [
        "https://www.amazon.com/dp/B01/ref=sr_1_1?keywords=x&tag=abc-20&th=1",
        "https://www.google.com/url?q=https%3A%2F%2Fexample.org%2F&sa=D&usg=x",
        "https://www.youtube.com/watch?v=abc&feature=share&si=xyz",
        "https://github.com/owner/repo?utm_source=x",
    ];
    for url in urls {
        for keep in [false, true] {
            assert_eq!(clean_url(&raw, url, keep)?, clean_url(&compiled, url, keep)?, "{url} {keep}");
        }
    }
    Ok(())
}

#[test]
fn test_overlapping_raw_rules_agree_across_representations() -> Result<()> {
    let raw = vec![RawProvider {
        raw_rules: vec!["b".to_string(), "ab".to_string()],
        ..RawProvider::new("overlap", "^https?://x\\.example")
    }];
    let compiled = compile_providers(&raw)?;
    let url = "https://x.example/ab";
    assert_eq!(clean_url(&raw, url, false)?, "https://x.example/");
    assert_eq!(clean_url(&raw, url, false)?, clean_url(&compiled, url, false)?);
    Ok(())
}

#[test]
fn test_latin1_escapes_are_kept_while_cleaning() -> Result<()> {
    let url = "https://x.example/?q=caf%E9&utm_source=a";
    let raw = bundled_providers()?;
    assert_eq!(clean_url(&raw, url, false)?, "https://x.example/?q=caf%E9");
    assert_eq!(clean_url(bundled_compiled_providers()?, url, false)?, "https://x.example/?q=caf%E9");
    Ok(())
}

#[test]
fn test_generated_source_is_identical_for_raw_and_compiled() -> Result<()> {
    let raw = bundled_providers()?;
    let compiled = compile_providers(&raw)?;
    assert_eq!(generate_rust_source(&raw)?, generate_rust_source(&compiled)?);
    Ok(())
}

#[test]
fn test_referral_marketing_is_kept_on_request() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    let url = "https://www.amazon.com/dp/B01?tag=abc-20&keywords=x";
    assert_eq!(clean_url(providers, url, false)?, "https://www.amazon.com/dp/B01");
    assert_eq!(clean_url(providers, url, true)?, "https://www.amazon.com/dp/B01?tag=abc-20");
    Ok(())
}

#[test]
fn test_raw_rules_strip_path_segments() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    let cleaned = clean_url(providers, "https://www.amazon.com/dp/B01/ref=sr_1_1?keywords=x", false)?;
    assert_eq!(cleaned, "https://www.amazon.com/dp/B01");
    Ok(())
}

#[test]
fn test_exceptions_leave_url_untouched() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    let url = "https://github.com/owner/repo?utm_source=x";
    assert_eq!(clean_url(providers, url, false)?, url);
    Ok(())
}

#[test]
fn test_facebook_link_is_unwrapped_and_cleaned() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    let url = "https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com%2Fpage%3Fid%3D1%26fbclid%3Dabc&h=AT0";
    assert_eq!(clean_url(providers, url, false)?, "https://example.com/page?id=1");
    Ok(())
}

#[test]
fn test_url_cleaner_applies_options() -> Result<()> {
    let cleaner = UrlCleaner::new(&bundled_providers()?, CleanOptions::keeping_referrals(true))?;
    let url = "https://www.amazon.com/dp/B01?tag=abc-20&keywords=x";
    assert_eq!(cleaner.clean(url)?, "https://www.amazon.com/dp/B01?tag=abc-20");
    Ok(())
}

#[test]
fn test_ambiguous_redirections_are_errors() -> Result<()> {
    let providers = vec![RawProvider {
        redirections: vec!["[?&]to=([^&]+)".to_string(), "[?&]next=([^&]+)".to_string()],
        ..RawProvider::new("doubled", "^https?://out\\.example")
    }];
    let url = "https://out.example/?to=https%3A%2F%2Fa.example%2F&next=https%3A%2F%2Fb.example%2F";
    let err = clean_url_with_options(&providers, url, &CleanOptions::default()).unwrap_err();
    assert!(matches!(err, ClearUrlsError::RedirectAmbiguity { ref provider, .. } if provider == "doubled"));
    Ok(())
}

#[test]
fn test_invalid_url_is_an_error() -> Result<()> {
    let providers = bundled_compiled_providers()?;
    assert!(matches!(
        clean_url(providers, "amazon.com?keywords=x", false),
        Err(ClearUrlsError::UrlParse { .. })
    ));
    Ok(())
}
