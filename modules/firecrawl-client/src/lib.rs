pub mod error;

pub use error::{FirecrawlError, Result};

use std::time::Duration;

use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.firecrawl.dev/v1";

pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeInput<'a> {
    url: &'a str,
    formats: &'a [&'a str],
    /// Milliseconds to let client-rendered content settle before capture.
    wait_for: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeDocument>,
    #[serde(default)]
    error: Option<String>,
}

/// Scraped page in the formats we asked for.
#[derive(Debug, Deserialize, Default)]
pub struct ScrapeDocument {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
}

impl FirecrawlClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Scrape a URL as HTML + markdown, allowing `wait_ms` for
    /// client-rendered content.
    pub async fn scrape(&self, url: &str, wait_ms: u32) -> Result<ScrapeDocument> {
        tracing::info!(url, wait_ms, "Starting Firecrawl scrape");

        let input = ScrapeInput {
            url,
            formats: &["html", "markdown"],
            wait_for: wait_ms,
        };

        let endpoint = format!("{BASE_URL}/scrape");
        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse = resp.json().await?;
        if !api_resp.success {
            return Err(FirecrawlError::Rejected(
                api_resp.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        let doc = api_resp.data.unwrap_or_default();
        tracing::info!(
            url,
            html_bytes = doc.html.as_deref().map(str::len).unwrap_or(0),
            markdown_bytes = doc.markdown.as_deref().map(str::len).unwrap_or(0),
            "Firecrawl scrape complete"
        );
        Ok(doc)
    }
}
