use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use openrouter_client::{first_json_object, OpenRouterClient};
use serde::Deserialize;
use socialmeter_common::Handle;
use tracing::{debug, info, warn};

use super::{ExtractionAttempt, Extractor};

const VISION_MODEL: &str = "openai/gpt-4o-mini";
const MODEL_TIMEOUT: Duration = Duration::from_secs(15);

const VISION_PROMPT: &str = "Read the follower count displayed in this profile screenshot. \
    Respond with strict JSON only: {\"found\": true|false, \"followers\": \"<digits>\"}. \
    The followers value must be the exact digits shown, no K/M abbreviation, no separators. \
    If the count is abbreviated or unreadable, set found to false.";

#[derive(Debug, Deserialize)]
struct VisionVerdict {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    followers: Option<serde_json::Value>,
}

/// OCR of a user-supplied profile screenshot. Anything other than a pure
/// integer reading is rejected: a model that "helpfully" rounds to 11.1K
/// must not win over nothing.
pub struct AiVisionExtractor {
    client: Arc<OpenRouterClient>,
    screenshot_path: PathBuf,
}

impl AiVisionExtractor {
    pub fn new(client: Arc<OpenRouterClient>, screenshot_path: PathBuf) -> Self {
        Self {
            client,
            screenshot_path,
        }
    }
}

/// Accept integer JSON numbers and pure-digit strings, nothing else.
fn integer_from_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn mime_for_path(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl Extractor for AiVisionExtractor {
    fn name(&self) -> &'static str {
        "ai-vision"
    }

    fn followers_only(&self) -> bool {
        true
    }

    async fn attempt(&self, handle: &Handle) -> ExtractionAttempt {
        debug!(handle = %handle, strategy = self.name(), path = %self.screenshot_path.display(), "Reading screenshot");

        let bytes = match tokio::fs::read(&self.screenshot_path).await {
            Ok(b) => b,
            Err(e) => return ExtractionAttempt::failed(format!("screenshot unreadable: {e}")),
        };

        let mime = mime_for_path(&self.screenshot_path);
        let request = self
            .client
            .vision_completion(VISION_MODEL, VISION_PROMPT, &bytes, mime);

        let text = match tokio::time::timeout(MODEL_TIMEOUT, request).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return ExtractionAttempt::failed(format!("vision query failed: {e}")),
            Err(_) => return ExtractionAttempt::failed("vision query timed out"),
        };

        let Some(json) = first_json_object(&text) else {
            return ExtractionAttempt::failed("vision response contained no JSON");
        };
        let verdict: VisionVerdict = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => return ExtractionAttempt::failed(format!("vision JSON malformed: {e}")),
        };

        if !verdict.found {
            return ExtractionAttempt::failed("vision model could not read a count");
        }

        let Some(count) = verdict.followers.as_ref().and_then(integer_from_value) else {
            warn!(
                handle = %handle,
                strategy = self.name(),
                raw = ?verdict.followers,
                "Vision value is not a pure integer, rejecting"
            );
            return ExtractionAttempt::failed("vision value is not a pure integer");
        };

        info!(handle = %handle, strategy = self.name(), count, "Count read from screenshot");
        ExtractionAttempt {
            followers: Some(count),
            ..ExtractionAttempt::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_integer_numbers_and_digit_strings() {
        assert_eq!(integer_from_value(&json!(11100)), Some(11_100));
        assert_eq!(integer_from_value(&json!("11100")), Some(11_100));
    }

    #[test]
    fn rejects_abbreviated_and_non_integer_values() {
        assert_eq!(integer_from_value(&json!("11.1K")), None);
        assert_eq!(integer_from_value(&json!("11,100")), None);
        assert_eq!(integer_from_value(&json!(11.1)), None);
        assert_eq!(integer_from_value(&json!(-5)), None);
        assert_eq!(integer_from_value(&json!(null)), None);
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(std::path::Path::new("shot.png")), "image/png");
        assert_eq!(mime_for_path(std::path::Path::new("shot.jpg")), "image/jpeg");
    }
}
