//! Best-effort heuristics over third-party search result titles.
//!
//! Every function here returns `None` on a miss. A miss means "skip this
//! result", never an error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Platform name that must never be mistaken for a person or a job title.
const PLATFORM_NAME: &str = "LinkedIn";

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Lu}[\p{L}'\-]*\.?(?:\s+\p{Lu}[\p{L}'\-]*\.?){1,3})\s*[-–|]").unwrap()
});

static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)[-–]\s*([^|]+?)\s*(?:\bat\s+|\|)").unwrap());

static PROFILE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://(?:[a-z]{2,3}\.)?linkedin\.com/in/[\w\-%]+").unwrap()
});

/// Person name at the start of a profile result title, e.g.
/// `"Jane A. Smith - VP of Security at Acme | LinkedIn"` gives `"Jane A. Smith"`.
///
/// Leading honorifics are not stripped: `"Dr. Jane Smith - CISO"` gives `"Dr. Jane Smith"`.
pub fn parse_name(result_title: &str) -> Option<String> {
    let caps = NAME_REGEX.captures(result_title.trim_start())?;
    let name = caps.get(1)?.as_str().trim();
    if name.split_whitespace().count() < 2 || name.contains(PLATFORM_NAME) {
        return None;
    }
    Some(name.to_string())
}

/// Job title between the first dash separator and `at`/`|`.
///
/// The title string is tried first; the snippet only when the title gives nothing.
pub fn parse_title(result_title: &str, snippet: &str) -> Option<String> {
    title_from(result_title).or_else(|| title_from(snippet))
}

fn title_from(text: &str) -> Option<String> {
    let caps = TITLE_REGEX.captures(text)?;
    let title = caps.get(1)?.as_str().trim();
    if title.is_empty() || title.contains(PLATFORM_NAME) {
        return None;
    }
    Some(title.to_string())
}

/// First personal profile URL found in `url_or_text`.
pub fn extract_profile_url(url_or_text: &str) -> Option<String> {
    PROFILE_URL_REGEX
        .find(url_or_text)
        .map(|m| m.as_str().to_string())
}

/// Comparison key for profile URLs: no query, fragment or trailing slash, lower-cased.
pub fn canonical_profile_url(url: &str) -> String {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    url[..end].trim_end_matches('/').to_lowercase()
}
