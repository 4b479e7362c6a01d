//! API server configuration.

use serde::Deserialize;

use sb_engine::clarify::QuestionServiceConfig;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-pair estimate timeout in milliseconds.
    #[serde(default = "default_pair_timeout_ms")]
    pub pair_timeout_ms: u64,
    /// Overall aggregation ceiling in milliseconds.
    #[serde(default = "default_overall_timeout_ms")]
    pub overall_timeout_ms: u64,
    /// External clarifying-question service.
    #[serde(default)]
    pub question_service: QuestionServiceConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pair_timeout_ms() -> u64 {
    2_000
}

fn default_overall_timeout_ms() -> u64 {
    10_000
}

impl ApiConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("SERVICEBAY_PORT")
            && let Ok(port) = port.parse()
        {
            config.port = port;
        }
        if let Ok(url) = std::env::var("QUESTION_SERVICE_URL") {
            config.question_service.url = url;
            config.question_service.enabled = true;
        }
        if let Ok(enabled) = std::env::var("QUESTION_SERVICE_ENABLED") {
            config.question_service.enabled =
                enabled.eq_ignore_ascii_case("true") || enabled == "1";
        }
        config
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pair_timeout_ms: default_pair_timeout_ms(),
            overall_timeout_ms: default_overall_timeout_ms(),
            question_service: QuestionServiceConfig::default(),
        }
    }
}
