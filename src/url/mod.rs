//! URL handling module for Thread-Trail
//!
//! Thread addresses on the forum are plain path prefixes: page `n` of a
//! thread lives at `{base}/p={n}`. This module builds those page URLs,
//! normalizes thread addresses found in pager links, and resolves relative
//! hrefs against the page they were found on.

use crate::TrailError;
use ::url::Url;

/// Path segment prefix that selects a page within a thread
const PAGE_SEGMENT_PREFIX: &str = "p=";

/// Builds the URL of one page of a thread
///
/// Page 0 is the newest page; higher numbers walk backward in time.
///
/// # Examples
///
/// ```
/// use thread_trail::url::page_url;
///
/// assert_eq!(page_url("https://f.example/thr/7/", 2), "https://f.example/thr/7/p=2");
/// ```
pub fn page_url(base: &str, page: u32) -> String {
    format!(
        "{}/{}{}",
        base.trim_end_matches('/'),
        PAGE_SEGMENT_PREFIX,
        page
    )
}

/// Normalizes a thread address so it can be used as a pagination base
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove fragment and query
/// 3. Drop a trailing `p=N` page segment, if the link points at a page
/// 4. Remove the trailing slash
///
/// # Arguments
///
/// * `address` - Absolute thread or page URL
///
/// # Returns
///
/// * `Ok(String)` - The thread's base address
/// * `Err(TrailError)` - The address is not a valid absolute HTTP(S) URL
pub fn thread_base(address: &str) -> Result<String, TrailError> {
    let mut url = Url::parse(address.trim())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(TrailError::InvalidAddress(address.to_string()));
    }

    url.set_fragment(None);
    url.set_query(None);

    let segments: Vec<String> = url
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let kept: Vec<&str> = match segments.split_last() {
        Some((last, rest)) if is_page_segment(last) => rest.iter().map(String::as_str).collect(),
        _ => segments.iter().map(String::as_str).collect(),
    };
    url.set_path(&kept.join("/"));

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Returns true for path segments of the form `p=<digits>`
fn is_page_segment(segment: &str) -> bool {
    segment
        .strip_prefix(PAGE_SEGMENT_PREFIX)
        .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
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
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
