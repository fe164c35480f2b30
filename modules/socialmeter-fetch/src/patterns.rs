//! Regex extraction of avatar URLs and follower counts from profile HTML
//! and scrape-service markdown.

use regex::Regex;
use socialmeter_common::followers::parse_followers;

/// CDN domains an extracted avatar URL must belong to before we trust it.
const AVATAR_CDN_DOMAINS: &[&str] = &["cdninstagram.com", "fbcdn.net"];

/// Ordered avatar patterns: Open-Graph meta tag first, then embedded JSON
/// fields, Twitter-card meta tag as last resort.
const AVATAR_PATTERNS: &[&str] = &[
    r#"<meta\s+property=["']og:image["']\s+content=["']([^"']+)["']"#,
    r#""profile_pic_url_hd"\s*:\s*"([^"]+)""#,
    r#""profile_pic_url"\s*:\s*"([^"]+)""#,
    r#"<meta\s+name=["']twitter:image["']\s+content=["']([^"']+)["']"#,
];

/// Follower-count patterns against embedded JSON, then the og:description
/// style "1.2M Followers, ..." summary.
const FOLLOWER_HTML_PATTERNS: &[&str] = &[
    r#""edge_followed_by"\s*:\s*\{\s*"count"\s*:\s*(\d+)"#,
    r#""follower_count"\s*:\s*(\d+)"#,
    r#"content=["']([\d.,]+[KkMm]?)\s+Followers"#,
];

/// Text patterns for markdown renderings, including the Chinese locale.
const FOLLOWER_TEXT_PATTERNS: &[&str] = &[
    r"(?i)([\d.,]+[KkMm]?)\s*followers",
    r"([\d.,]+[KkMm]?)\s*位?追蹤者",
    r"([\d.,]+[KkMm]?)\s*粉絲",
];

/// Extract an avatar URL from profile HTML, trying patterns in order.
/// Escaped URLs are unescaped and the result must sit on a known CDN
/// domain, otherwise the candidate is skipped.
pub fn extract_avatar(html: &str) -> Option<String> {
    for pattern in AVATAR_PATTERNS {
        let re = Regex::new(pattern).expect("valid regex");
        for cap in re.captures_iter(html) {
            let url = unescape_url(&cap[1]);
            if is_platform_cdn(&url) {
                return Some(url);
            }
        }
    }
    None
}

/// Extract a follower count from profile HTML (embedded JSON first).
pub fn extract_followers_from_html(html: &str) -> Option<u64> {
    first_count(FOLLOWER_HTML_PATTERNS, html)
}

/// Extract a follower count from rendered text/markdown.
pub fn extract_followers_from_text(text: &str) -> Option<u64> {
    first_count(FOLLOWER_TEXT_PATTERNS, text)
}

fn first_count(patterns: &[&str], haystack: &str) -> Option<u64> {
    for pattern in patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(haystack) {
            if let Some(count) = parse_followers(&cap[1]) {
                return Some(count);
            }
        }
    }
    None
}

/// Undo the HTML/unicode escaping Instagram applies to URLs embedded in
/// page JSON and meta tags.
pub fn unescape_url(raw: &str) -> String {
    raw.replace("\\u0026", "&")
        .replace("&amp;", "&")
        .replace("\\/", "/")
}

/// True when the URL's host is (a subdomain of) one of the platform's CDN
/// domains.
pub fn is_platform_cdn(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    AVATAR_CDN_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}
