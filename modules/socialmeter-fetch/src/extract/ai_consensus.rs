use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use openrouter_client::{first_json_object, OpenRouterClient};
use serde::Deserialize;
use socialmeter_common::Handle;
use tracing::{debug, info, warn};

use super::{ExtractionAttempt, Extractor};
use crate::consensus;

/// Independent models queried in parallel. Diversity matters more than
/// capability here: agreement between two weak models beats one strong
/// model's confident guess.
pub const CONSENSUS_MODELS: &[&str] = &[
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-haiku",
    "google/gemini-2.0-flash-001",
];

/// Per-model deadline. An unresolved query at the deadline is a failed
/// candidate, not a retry.
const MODEL_TIMEOUT: Duration = Duration::from_secs(8);

const SYSTEM_PROMPT: &str = "You report Instagram follower counts. Respond with strict JSON \
    only, no prose: {\"found\": true|false, \"followers\": <integer>}. If you do not know \
    the current count, set found to false.";

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    followers: Option<u64>,
}

/// Last-resort follower estimation by multi-model agreement.
pub struct AiConsensusExtractor {
    client: Arc<OpenRouterClient>,
    models: Vec<String>,
}

impl AiConsensusExtractor {
    pub fn new(client: Arc<OpenRouterClient>) -> Self {
        Self::with_models(client, CONSENSUS_MODELS.iter().map(|m| m.to_string()).collect())
    }

    pub fn with_models(client: Arc<OpenRouterClient>, models: Vec<String>) -> Self {
        Self { client, models }
    }

    async fn query_model(&self, model: &str, handle: &Handle) -> Option<u64> {
        let user_prompt = format!(
            "How many followers does the Instagram account @{handle} have right now? \
             Respond with JSON only."
        );

        let request = self.client.chat_completion(model, SYSTEM_PROMPT, &user_prompt);
        let text = match tokio::time::timeout(MODEL_TIMEOUT, request).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(model, error = %e, "Consensus model query failed");
                return None;
            }
            Err(_) => {
                warn!(model, "Consensus model query timed out");
                return None;
            }
        };

        let json = first_json_object(&text)?;
        let verdict: ModelVerdict = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                warn!(model, error = %e, "Consensus model returned malformed JSON");
                return None;
            }
        };

        if !verdict.found {
            debug!(model, "Consensus model reported count unknown");
            return None;
        }
        verdict.followers
    }
}

#[async_trait]
impl Extractor for AiConsensusExtractor {
    fn name(&self) -> &'static str {
        "ai-consensus"
    }

    fn followers_only(&self) -> bool {
        true
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        debug!(handle = %handle, strategy = self.name(), models = self.models.len(), "Fanning out consensus queries");

        let queries = self.models.iter().map(|m| self.query_model(m, handle));
        let candidates: Vec<u64> = futures::future::join_all(queries)
            .await
            .into_iter()
            .flatten()
            .collect();

        let resolved = consensus::resolve(&candidates);
        match resolved.value {
            Some(value) => {
                info!(
                    handle = %handle,
                    strategy = self.name(),
                    candidates = candidates.len(),
                    value,
                    confidence = ?resolved.confidence,
                    "Consensus resolved"
                );
                ExtractionAttempt {
                    followers: Some(value),
                    confidence: Some(resolved.confidence),
                    ..ExtractionAttempt::default()
                }
            }
            None => ExtractionAttempt::failed("no model produced a candidate count"),
        }
    }
}
