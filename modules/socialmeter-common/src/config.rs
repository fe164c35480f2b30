use std::env;

/// Application configuration loaded from environment variables.
///
/// Scrape and AI keys are optional: a missing key disables the corresponding
/// extraction strategy instead of failing startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    // Third-party collaborators
    pub firecrawl_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,

    // Persistence (no follower updates without it)
    pub database_url: Option<String>,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message only for malformed values, never for
    /// missing optional keys.
    pub fn from_env() -> Self {
        Self {
            firecrawl_api_key: optional_env("FIRECRAWL_API_KEY"),
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            database_url: optional_env("DATABASE_URL"),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
