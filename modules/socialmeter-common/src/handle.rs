use std::fmt;

use url::Url;

/// Path segments that identify non-profile Instagram URLs.
const RESERVED_SEGMENTS: &[&str] = &["p", "reel", "reels", "stories", "explore", "tv", "accounts"];

/// A bare account identifier parsed out of a profile URL or raw username.
///
/// Never empty and never one of the reserved non-profile path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    /// Parse a handle from a profile URL or a raw (possibly `@`-prefixed)
    /// username. Post/reel/story URLs are rejected: their deeper path
    /// segments are content IDs, not handles.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let candidate = if input.contains("instagram.com") {
            let url = Url::parse(input)
                .or_else(|_| Url::parse(&format!("https://{input}")))
                .ok()?;
            url.path_segments()?
                .find(|s| !s.is_empty())?
                .trim_start_matches('@')
                .to_string()
        } else {
            input.trim_start_matches('@').trim_matches('/').to_string()
        };

        if candidate.is_empty() || RESERVED_SEGMENTS.contains(&candidate.as_str()) {
            return None;
        }
        Some(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_username() {
        assert_eq!(Handle::parse("nasa").unwrap().as_str(), "nasa");
        assert_eq!(Handle::parse("@nasa").unwrap().as_str(), "nasa");
        assert_eq!(Handle::parse("nasa/").unwrap().as_str(), "nasa");
    }

    #[test]
    fn parses_profile_urls() {
        assert_eq!(
            Handle::parse("https://www.instagram.com/nasa/").unwrap().as_str(),
            "nasa"
        );
        assert_eq!(
            Handle::parse("instagram.com/nasa?hl=en").unwrap().as_str(),
            "nasa"
        );
    }

    #[test]
    fn rejects_non_profile_urls() {
        assert!(Handle::parse("https://www.instagram.com/p/Cxyz123/").is_none());
        assert!(Handle::parse("https://www.instagram.com/reel/Cxyz123/").is_none());
        assert!(Handle::parse("https://www.instagram.com/stories/nasa/123/").is_none());
        assert!(Handle::parse("https://www.instagram.com/explore/").is_none());
    }

    #[test]
    fn rejects_empty_and_reserved_bare_input() {
        assert!(Handle::parse("").is_none());
        assert!(Handle::parse("   ").is_none());
        assert!(Handle::parse("@").is_none());
        assert!(Handle::parse("explore").is_none());
    }
}
