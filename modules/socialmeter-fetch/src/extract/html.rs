use std::time::Duration;

use async_trait::async_trait;
use socialmeter_common::Handle;
use tracing::{debug, info};

use super::{ExtractionAttempt, Extractor};
use crate::patterns;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Mobile pages embed the profile JSON inline more reliably than desktop.
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// Direct profile-page fetch with regex pattern extraction.
pub struct HtmlExtractor {
    client: reqwest::Client,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        let url = format!("https://www.instagram.com/{handle}/");
        debug!(handle = %handle, strategy = self.name(), "Fetching profile page");

        let resp = match self
            .client
            .get(&url)
            .header("User-Agent", MOBILE_UA)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ExtractionAttempt::failed(format!("page fetch failed: {e}")),
        };

        if !resp.status().is_success() {
            return ExtractionAttempt::failed(format!("profile page returned {}", resp.status()));
        }

        let html = match resp.text().await {
            Ok(t) => t,
            Err(e) => return ExtractionAttempt::failed(format!("page body read failed: {e}")),
        };

        let avatar_url = patterns::extract_avatar(&html);
        let followers = patterns::extract_followers_from_html(&html);

        if avatar_url.is_none() && followers.is_none() {
            return ExtractionAttempt::failed("no pattern matched in profile page");
        }

        info!(
            handle = %handle,
            strategy = self.name(),
            followers = ?followers,
            has_avatar = avatar_url.is_some(),
            "Extracted from profile page"
        );
        ExtractionAttempt {
            avatar_url,
            followers,
            ..ExtractionAttempt::default()
        }
    }
}
