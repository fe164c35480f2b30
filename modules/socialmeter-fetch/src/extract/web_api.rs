use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use socialmeter_common::Handle;
use tracing::{debug, info};

use super::{ExtractionAttempt, Extractor};

const WEB_API_URL: &str = "https://i.instagram.com/api/v1/users/web_profile_info/";
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Browser-like user agent; the endpoint rejects obvious bots.
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// App-identifying header the endpoint requires (public web client ID).
const IG_APP_ID: &str = "936619743392459";

#[derive(Debug, Deserialize)]
struct WebProfileResponse {
    #[serde(default)]
    data: Option<ProfileData>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    #[serde(default)]
    user: Option<ProfileUser>,
}

#[derive(Debug, Deserialize, Default)]
struct ProfileUser {
    #[serde(default)]
    profile_pic_url_hd: Option<String>,
    #[serde(default)]
    profile_pic_url: Option<String>,
    #[serde(default)]
    edge_followed_by: Option<EdgeFollowedBy>,
    #[serde(default)]
    follower_count: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct EdgeFollowedBy {
    #[serde(default)]
    count: Option<u64>,
}

/// Prefer the high-definition avatar field and the primary follower-edge
/// field over their alternates.
fn read_user(user: ProfileUser) -> (Option<String>, Option<u64>) {
    let avatar = user.profile_pic_url_hd.or(user.profile_pic_url);
    let followers = user
        .edge_followed_by
        .and_then(|e| e.count)
        .or(user.follower_count);
    (avatar, followers)
}

/// The platform's own public JSON profile endpoint.
pub struct WebApiExtractor {
    client: reqwest::Client,
}

impl WebApiExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for WebApiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for WebApiExtractor {
    fn name(&self) -> &'static str {
        "web-api"
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        debug!(handle = %handle, strategy = self.name(), "Querying public profile API");

        let resp = match self
            .client
            .get(WEB_API_URL)
            .query(&[("username", handle.as_str())])
            .header("User-Agent", BROWSER_UA)
            .header("x-ig-app-id", IG_APP_ID)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ExtractionAttempt::failed(format!("profile API request failed: {e}")),
        };

        if !resp.status().is_success() {
            return ExtractionAttempt::failed(format!("profile API returned {}", resp.status()));
        }

        let body: WebProfileResponse = match resp.json().await {
            Ok(b) => b,
            Err(e) => return ExtractionAttempt::failed(format!("profile API parse failed: {e}")),
        };

        let Some(user) = body.data.and_then(|d| d.user) else {
            return ExtractionAttempt::failed("profile API response has no user");
        };

        let (avatar_url, followers) = read_user(user);
        if avatar_url.is_none() && followers.is_none() {
            return ExtractionAttempt::failed("profile API response has no usable fields");
        }

        info!(
            handle = %handle,
            strategy = self.name(),
            followers = ?followers,
            has_avatar = avatar_url.is_some(),
            "Profile API hit"
        );
        ExtractionAttempt {
            avatar_url,
            followers,
            ..ExtractionAttempt::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_response_and_prefers_primary_fields() {
        let json = r#"{
            "data": {
                "user": {
                    "profile_pic_url": "https://scontent.cdninstagram.com/sd.jpg",
                    "profile_pic_url_hd": "https://scontent.cdninstagram.com/hd.jpg",
                    "edge_followed_by": {"count": 98000000},
                    "follower_count": 97999999
                }
            }
        }"#;
        let resp: WebProfileResponse = serde_json::from_str(json).unwrap();
        let user = resp.data.unwrap().user.unwrap();
        let (avatar, followers) = read_user(user);
        assert_eq!(avatar.as_deref(), Some("https://scontent.cdninstagram.com/hd.jpg"));
        assert_eq!(followers, Some(98_000_000));
    }

    #[test]
    fn falls_back_to_alternate_fields() {
        let json = r#"{
            "data": {
                "user": {
                    "profile_pic_url": "https://scontent.cdninstagram.com/sd.jpg",
                    "follower_count": 12345
                }
            }
        }"#;
        let resp: WebProfileResponse = serde_json::from_str(json).unwrap();
        let user = resp.data.unwrap().user.unwrap();
        let (avatar, followers) = read_user(user);
        assert_eq!(avatar.as_deref(), Some("https://scontent.cdninstagram.com/sd.jpg"));
        assert_eq!(followers, Some(12_345));
    }

    #[test]
    fn tolerates_missing_user() {
        let resp: WebProfileResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(resp.data.unwrap().user.is_none());
    }
}
