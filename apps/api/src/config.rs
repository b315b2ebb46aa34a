use anyhow::{Context, Result};

const DEFAULT_AI_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat-completion credential. `None` is a supported mode: résumé parsing
    /// then runs on the heuristic builder only.
    pub openrouter_api_key: Option<String>,
    pub ai_api_url: String,
    pub ai_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    /// Sessions untouched for this long are evicted.
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            ai_api_url: optional_env("AI_API_URL")
                .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string()),
            ai_timeout_secs: std::env::var("AI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_idle_ttl_secs: std::env::var("SESSION_IDLE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse::<u64>()
                .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
        })
    }
}

/// Reads an env var, treating unset and blank values the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_env_blank_is_none() {
        std::env::set_var("FOLIO_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("FOLIO_TEST_BLANK_KEY"), None);
    }

    #[test]
    fn test_optional_env_trims_value() {
        std::env::set_var("FOLIO_TEST_SET_KEY", " sk-or-123 ");
        assert_eq!(
            optional_env("FOLIO_TEST_SET_KEY"),
            Some("sk-or-123".to_string())
        );
    }

    #[test]
    fn test_optional_env_unset_is_none() {
        assert_eq!(optional_env("FOLIO_TEST_DEFINITELY_UNSET"), None);
    }
}
