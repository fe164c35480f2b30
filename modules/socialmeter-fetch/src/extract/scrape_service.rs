use async_trait::async_trait;
use firecrawl_client::FirecrawlClient;
use socialmeter_common::Handle;
use tracing::{debug, info};

use super::{ExtractionAttempt, Extractor};
use crate::patterns;

/// Fixed settle allowance for the profile page's client-rendered content.
const RENDER_WAIT_MS: u32 = 3_000;

/// Third-party scrape proxy for when direct fetches are blocked. Applies
/// the same HTML patterns as the direct fetch, then falls back to text
/// patterns against the markdown rendering.
pub struct ScrapeServiceExtractor {
    client: FirecrawlClient,
}

impl ScrapeServiceExtractor {
    pub fn new(api_key: String) -> Self {
        Self {
            client: FirecrawlClient::new(api_key),
        }
    }
}

#[async_trait]
impl Extractor for ScrapeServiceExtractor {
    fn name(&self) -> &'static str {
        "scrape-service"
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        let url = format!("https://www.instagram.com/{handle}/");
        debug!(handle = %handle, strategy = self.name(), "Requesting scrape");

        let doc = match self.client.scrape(&url, RENDER_WAIT_MS).await {
            Ok(d) => d,
            Err(e) => return ExtractionAttempt::failed(format!("scrape service failed: {e}")),
        };

        let html = doc.html.as_deref().unwrap_or("");
        let avatar_url = patterns::extract_avatar(html);
        let mut followers = patterns::extract_followers_from_html(html);

        // Client-rendered counts often survive only in the markdown text.
        if followers.is_none() {
            if let Some(markdown) = doc.markdown.as_deref() {
                followers = patterns::extract_followers_from_text(markdown);
            }
        }

        if avatar_url.is_none() && followers.is_none() {
            return ExtractionAttempt::failed("no pattern matched in scraped content");
        }

        info!(
            handle = %handle,
            strategy = self.name(),
            followers = ?followers,
            has_avatar = avatar_url.is_some(),
            "Extracted from scrape service"
        );
        ExtractionAttempt {
            avatar_url,
            followers,
            ..ExtractionAttempt::default()
        }
    }
}
