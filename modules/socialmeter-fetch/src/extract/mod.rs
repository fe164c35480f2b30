//! Extraction strategies. Each one attempts to obtain an avatar URL and/or
//! follower count from a single external source and never errors out: every
//! failure mode folds into the returned attempt record.

pub mod ai_consensus;
pub mod ai_vision;
pub mod avatar_proxy;
pub mod html;
pub mod scrape_service;
pub mod web_api;

pub use ai_consensus::AiConsensusExtractor;
pub use ai_vision::AiVisionExtractor;
pub use avatar_proxy::AvatarProxyExtractor;
pub use html::HtmlExtractor;
pub use scrape_service::ScrapeServiceExtractor;
pub use web_api::WebApiExtractor;

use async_trait::async_trait;
use socialmeter_common::Handle;

use crate::consensus::Confidence;

/// One strategy's outcome. Immutable once produced.
#[derive(Debug, Clone, Default)]
pub struct ExtractionAttempt {
    pub avatar_url: Option<String>,
    pub followers: Option<u64>,
    pub confidence: Option<Confidence>,
    pub error: Option<String>,
}

impl ExtractionAttempt {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.avatar_url.is_none() && self.followers.is_none()
    }
}

#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Strategies that can only ever produce a follower count. The
    /// orchestrator skips these once a count exists, even while it is
    /// still hunting for an avatar.
    fn followers_only(&self) -> bool {
        false
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt;
}
