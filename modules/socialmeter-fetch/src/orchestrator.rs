//! Fixed-priority fallback across extraction strategies.
//!
//! Strategies run in order until both the avatar and the follower count are
//! known. Each field is first-writer-wins; followers-only AI strategies are
//! consulted only while no earlier strategy has produced a count. A failed
//! strategy is skipped, never retried.

use std::path::PathBuf;
use std::sync::Arc;

use openrouter_client::OpenRouterClient;
use serde::{Deserialize, Serialize};
use socialmeter_common::{Config, Handle, SocialMeterError};
use tracing::{debug, info, warn};

use crate::cache::{AvatarCache, InMemoryAvatarCache};
use crate::consensus::Confidence;
use crate::extract::{
    AiConsensusExtractor, AiVisionExtractor, AvatarProxyExtractor, Extractor, HtmlExtractor,
    ScrapeServiceExtractor, WebApiExtractor,
};

#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    pub url_or_username: String,
    #[serde(default, alias = "itemId")]
    pub item_id: Option<String>,
    #[serde(default, alias = "screenshotPath")]
    pub screenshot_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResponse {
    fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

pub struct FollowerFetcher {
    extractors: Vec<Box<dyn Extractor>>,
    cache: Arc<dyn AvatarCache>,
    /// Retained for the per-request vision strategy; the screenshot path
    /// arrives with the request, so that extractor cannot live in the
    /// static priority list.
    vision_client: Option<Arc<OpenRouterClient>>,
}

impl FollowerFetcher {
    pub fn new(extractors: Vec<Box<dyn Extractor>>, cache: Arc<dyn AvatarCache>) -> Self {
        Self {
            extractors,
            cache,
            vision_client: None,
        }
    }

    pub fn with_vision_client(mut self, client: Arc<OpenRouterClient>) -> Self {
        self.vision_client = Some(client);
        self
    }

    /// Assemble the standard priority cascade. Strategies whose
    /// collaborator key is missing are left out, not stubbed.
    pub fn from_config(config: &Config) -> Self {
        let mut extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(AvatarProxyExtractor::new()),
            Box::new(WebApiExtractor::new()),
            Box::new(HtmlExtractor::new()),
        ];

        if let Some(key) = &config.firecrawl_api_key {
            extractors.push(Box::new(ScrapeServiceExtractor::new(key.clone())));
        } else {
            info!("FIRECRAWL_API_KEY not set, scrape-service strategy disabled");
        }

        let mut fetcher = Self::new(extractors, Arc::new(InMemoryAvatarCache::new()));

        if let Some(key) = &config.openrouter_api_key {
            let client = Arc::new(OpenRouterClient::new(key).with_app_name("socialmeter"));
            fetcher
                .extractors
                .push(Box::new(AiConsensusExtractor::new(client.clone())));
            fetcher.vision_client = Some(client);
        } else {
            info!("OPENROUTER_API_KEY not set, AI strategies disabled");
        }

        fetcher
    }

    /// Run the cascade for one request. Never returns an error: total
    /// failure is a `success: false` response naming every strategy tried.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResponse {
        let Some(handle) = Handle::parse(&request.url_or_username) else {
            let err = SocialMeterError::Validation(format!(
                "not a profile URL or username: {}",
                request.url_or_username
            ));
            return FetchResponse::failure(err.to_string());
        };

        let mut avatar_url: Option<String> = None;
        let mut followers: Option<u64> = None;
        let mut confidence: Option<Confidence> = None;
        let mut contributed: Vec<&'static str> = Vec::new();
        let mut attempted: Vec<&'static str> = Vec::new();

        if let Some(cached) = self.cache.get(handle.as_str()).await {
            debug!(handle = %handle, "Avatar served from cache");
            avatar_url = Some(cached);
            contributed.push("cache");
        }

        for extractor in &self.extractors {
            if avatar_url.is_some() && followers.is_some() {
                break;
            }
            if extractor.followers_only() && followers.is_some() {
                continue;
            }

            attempted.push(extractor.name());
            let attempt = extractor.attempt(&handle).await;

            if let Some(error) = &attempt.error {
                debug!(handle = %handle, strategy = extractor.name(), error = %error, "Strategy failed, falling through");
                continue;
            }

            let mut used = false;
            if avatar_url.is_none() && attempt.avatar_url.is_some() {
                avatar_url = attempt.avatar_url.clone();
                used = true;
            }
            if followers.is_none() && attempt.followers.is_some() {
                followers = attempt.followers;
                confidence = attempt.confidence;
                used = true;
            }
            if used {
                contributed.push(extractor.name());
            }
        }

        // Screenshot OCR: strictly last, and only while no count exists.
        if followers.is_none() {
            if let (Some(path), Some(client)) = (&request.screenshot_path, &self.vision_client) {
                let vision = AiVisionExtractor::new(client.clone(), PathBuf::from(path));
                attempted.push(vision.name());
                let attempt = vision.attempt(&handle).await;
                match attempt.followers {
                    Some(count) => {
                        followers = Some(count);
                        contributed.push(vision.name());
                    }
                    None => {
                        debug!(handle = %handle, strategy = vision.name(), error = ?attempt.error, "Vision strategy failed");
                    }
                }
            }
        }

        if avatar_url.is_none() && followers.is_none() {
            warn!(handle = %handle, attempted = %attempted.join("+"), "All strategies exhausted");
            let err = SocialMeterError::AllStrategiesExhausted(attempted.join("+"));
            return FetchResponse::failure(format!("no data found for @{handle}: {err}"));
        }

        if let Some(url) = &avatar_url {
            self.cache.set(handle.as_str(), url.clone()).await;
        }

        info!(
            handle = %handle,
            followers = ?followers,
            has_avatar = avatar_url.is_some(),
            method = %contributed.join("+"),
            "Fetch complete"
        );

        FetchResponse {
            success: true,
            // Canonical digits, no separators; formatting is the caller's
            // display concern.
            followers_count: followers.map(|n| n.to_string()),
            avatar_url,
            method: Some(contributed.join("+")),
            confidence,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoopAvatarCache;
    use crate::extract::ExtractionAttempt;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubExtractor {
        name: &'static str,
        avatar: Option<&'static str>,
        followers: Option<u64>,
        confidence: Option<Confidence>,
        followers_only: bool,
        calls: AtomicUsize,
    }

    impl StubExtractor {
        fn new(name: &'static str, avatar: Option<&'static str>, followers: Option<u64>) -> Self {
            Self {
                name,
                avatar,
                followers,
                confidence: None,
                followers_only: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self::new(name, None, None)
        }
    }

    #[async_trait]
    impl Extractor for &'static StubExtractor {
        fn name(&self) -> &'static str {
            self.name
        }

        fn followers_only(&self) -> bool {
            self.followers_only
        }

        async fn attempt(&self, _handle: &Handle) -> ExtractionAttempt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.avatar.is_none() && self.followers.is_none() {
                return ExtractionAttempt::failed("stub failure");
            }
            ExtractionAttempt {
                avatar_url: self.avatar.map(String::from),
                followers: self.followers,
                confidence: self.confidence,
                error: None,
            }
        }
    }

    fn fetcher_of(stubs: Vec<&'static StubExtractor>) -> FollowerFetcher {
        let extractors: Vec<Box<dyn Extractor>> = stubs
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn Extractor>)
            .collect();
        FollowerFetcher::new(extractors, Arc::new(NoopAvatarCache))
    }

    fn request(input: &str) -> FetchRequest {
        FetchRequest {
            url_or_username: input.to_string(),
            item_id: None,
            screenshot_path: None,
        }
    }

    #[tokio::test]
    async fn merges_partial_results_across_strategies() {
        let avatar_only: &'static StubExtractor = Box::leak(Box::new(StubExtractor::new(
            "avatar-proxy",
            Some("https://scontent.cdninstagram.com/a.jpg"),
            None,
        )));
        let followers_only: &'static StubExtractor =
            Box::leak(Box::new(StubExtractor::new("web-api", None, Some(98_000_000))));

        let fetcher = fetcher_of(vec![avatar_only, followers_only]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert!(resp.success);
        assert_eq!(
            resp.avatar_url.as_deref(),
            Some("https://scontent.cdninstagram.com/a.jpg")
        );
        assert_eq!(resp.followers_count.as_deref(), Some("98000000"));
        assert_eq!(resp.method.as_deref(), Some("avatar-proxy+web-api"));
    }

    #[tokio::test]
    async fn short_circuits_once_both_fields_present() {
        let complete: &'static StubExtractor = Box::leak(Box::new(StubExtractor::new(
            "web-api",
            Some("https://scontent.cdninstagram.com/a.jpg"),
            Some(12_345),
        )));
        let never_reached: &'static StubExtractor =
            Box::leak(Box::new(StubExtractor::new("html", Some("x"), Some(1))));

        let fetcher = fetcher_of(vec![complete, never_reached]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert!(resp.success);
        assert_eq!(resp.method.as_deref(), Some("web-api"));
        assert_eq!(never_reached.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_writer_wins_per_field() {
        let first: &'static StubExtractor = Box::leak(Box::new(StubExtractor::new(
            "avatar-proxy",
            Some("https://scontent.cdninstagram.com/first.jpg"),
            None,
        )));
        let second: &'static StubExtractor = Box::leak(Box::new(StubExtractor::new(
            "web-api",
            Some("https://scontent.cdninstagram.com/second.jpg"),
            Some(500),
        )));

        let fetcher = fetcher_of(vec![first, second]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert_eq!(
            resp.avatar_url.as_deref(),
            Some("https://scontent.cdninstagram.com/first.jpg")
        );
        assert_eq!(resp.followers_count.as_deref(), Some("500"));
    }

    #[tokio::test]
    async fn followers_only_strategy_skipped_when_count_known() {
        let with_count: &'static StubExtractor =
            Box::leak(Box::new(StubExtractor::new("web-api", None, Some(42_000))));
        let ai: &'static StubExtractor = Box::leak(Box::new(StubExtractor {
            name: "ai-consensus",
            avatar: None,
            followers: Some(99),
            confidence: Some(Confidence::High),
            followers_only: true,
            calls: AtomicUsize::new(0),
        }));
        // Avatar never resolves, so the loop keeps going past the AI stub.
        let fetcher = fetcher_of(vec![with_count, ai]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert!(resp.success);
        assert_eq!(resp.followers_count.as_deref(), Some("42000"));
        assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
        assert_eq!(resp.method.as_deref(), Some("web-api"));
    }

    #[tokio::test]
    async fn consensus_confidence_propagates() {
        let failing: &'static StubExtractor = Box::leak(Box::new(StubExtractor::failing("html")));
        let ai: &'static StubExtractor = Box::leak(Box::new(StubExtractor {
            name: "ai-consensus",
            avatar: None,
            followers: Some(50_250),
            confidence: Some(Confidence::High),
            followers_only: true,
            calls: AtomicUsize::new(0),
        }));

        let fetcher = fetcher_of(vec![failing, ai]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert!(resp.success);
        assert_eq!(resp.followers_count.as_deref(), Some("50250"));
        assert_eq!(resp.confidence, Some(Confidence::High));
        assert_eq!(resp.method.as_deref(), Some("ai-consensus"));
        // Pure digits, so the persistence gate must accept this.
        assert_eq!(
            socialmeter_common::gate::validate(resp.followers_count.as_deref().unwrap()),
            Ok(())
        );
    }

    #[tokio::test]
    async fn exhausted_strategies_reported_in_failure() {
        let a: &'static StubExtractor = Box::leak(Box::new(StubExtractor::failing("avatar-proxy")));
        let b: &'static StubExtractor = Box::leak(Box::new(StubExtractor::failing("web-api")));

        let fetcher = fetcher_of(vec![a, b]);
        let resp = fetcher.fetch(&request("nasa")).await;

        assert!(!resp.success);
        let error = resp.error.unwrap();
        assert!(error.contains("avatar-proxy+web-api"), "error was: {error}");
        assert_eq!(resp.followers_count, None);
        assert_eq!(resp.avatar_url, None);
    }

    #[tokio::test]
    async fn invalid_handle_is_rejected_without_any_attempt() {
        let stub: &'static StubExtractor =
            Box::leak(Box::new(StubExtractor::new("web-api", None, Some(1))));
        let fetcher = fetcher_of(vec![stub]);

        let resp = fetcher
            .fetch(&request("https://www.instagram.com/p/Cxyz123/"))
            .await;

        assert!(!resp.success);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cached_avatar_contributes_to_provenance() {
        let cache = Arc::new(InMemoryAvatarCache::new());
        cache
            .set("nasa", "https://scontent.cdninstagram.com/cached.jpg".to_string())
            .await;

        let followers_src: &'static StubExtractor =
            Box::leak(Box::new(StubExtractor::new("web-api", None, Some(7))));
        let fetcher = FollowerFetcher::new(
            vec![Box::new(followers_src) as Box<dyn Extractor>],
            cache,
        );

        let resp = fetcher.fetch(&request("nasa")).await;
        assert!(resp.success);
        assert_eq!(
            resp.avatar_url.as_deref(),
            Some("https://scontent.cdninstagram.com/cached.jpg")
        );
        assert_eq!(resp.method.as_deref(), Some("cache+web-api"));
    }

    #[test]
    fn response_serializes_to_camel_case_wire_shape() {
        let resp = FetchResponse {
            success: true,
            followers_count: Some("98000000".to_string()),
            avatar_url: Some("https://cdn.example/a.jpg".to_string()),
            method: Some("web-api".to_string()),
            confidence: Some(Confidence::High),
            error: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["followersCount"], "98000000");
        assert_eq!(json["avatarUrl"], "https://cdn.example/a.jpg");
        assert_eq!(json["confidence"], "high");
        assert!(json.get("error").is_none());
    }
}
