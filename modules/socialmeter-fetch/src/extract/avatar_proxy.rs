use std::time::Duration;

use async_trait::async_trait;
use socialmeter_common::Handle;
use tracing::{debug, info};

use super::{ExtractionAttempt, Extractor};

const PROXY_BASE: &str = "https://unavatar.io/instagram";
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Third-party avatar aggregation proxy. A successful image response means
/// the proxy resolved the account; the final redirected URL is the avatar.
/// Follower counts are out of this strategy's reach.
pub struct AvatarProxyExtractor {
    client: reqwest::Client,
}

impl AvatarProxyExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for AvatarProxyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for AvatarProxyExtractor {
    fn name(&self) -> &'static str {
        "avatar-proxy"
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        let url = format!("{PROXY_BASE}/{handle}?fallback=false");
        debug!(handle = %handle, strategy = self.name(), "Requesting avatar via proxy");

        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return ExtractionAttempt::failed(format!("proxy request failed: {e}")),
        };

        if !resp.status().is_success() {
            return ExtractionAttempt::failed(format!("proxy returned {}", resp.status()));
        }

        let is_image = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);

        if !is_image {
            return ExtractionAttempt::failed("proxy response is not an image");
        }

        // resp.url() is the final URL after the proxy's redirects.
        let avatar_url = resp.url().to_string();
        info!(handle = %handle, strategy = self.name(), "Avatar resolved via proxy");
        ExtractionAttempt {
            avatar_url: Some(avatar_url),
            ..ExtractionAttempt::default()
        }
    }
}
