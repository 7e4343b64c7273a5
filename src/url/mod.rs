//! URL handling module for Workana-Watch
//!
//! This module resolves job links against the site root and builds the
//! listing URL for each page.

mod builder;

pub use builder::JobsUrlBuilder;

use url::Url;

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be ignored:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that cannot be joined onto the base
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use workana_watch::url::resolve_url;
///
/// let base = Url::parse("https://example.com").unwrap();
/// assert_eq!(
///     resolve_url("/jobs/123", &base).as_deref(),
///     Some("https://example.com/jobs/123")
/// );
/// ```
pub fn resolve_url(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Returns the last non-empty path segment of an absolute URL
///
/// Query and fragment are ignored, so `/job/build-an-app?ref=list` yields
/// `build-an-app`.
pub fn last_path_segment(absolute: &str) -> Option<String> {
    let url = Url::parse(absolute).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}
