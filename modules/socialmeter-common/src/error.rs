use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocialMeterError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No known pattern matched: {0}")]
    ParseMismatch(String),

    #[error("Low-confidence value: {0}")]
    LowConfidence(String),

    #[error("All strategies exhausted: tried {0}")]
    AllStrategiesExhausted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
