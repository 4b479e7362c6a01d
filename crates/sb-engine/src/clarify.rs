//! Clarifying-question capability interface.
//!
//! Question *generation* is an external capability: the session state
//! machine only consumes its output. The built-in template generator keeps
//! the diagnosis loop fully functional (and deterministic) when no
//! generation service is configured or the service misbehaves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sb_domain::{RankedProblem, TranscriptEntry};

/// Produces one clarifying question for the current candidate set.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate the next question. `None` means the generator could not
    /// produce one; the caller falls back to templates.
    async fn generate(
        &self,
        candidates: &[RankedProblem],
        transcript: &[TranscriptEntry],
        question_number: u8,
    ) -> Option<String>;

    /// Name of this generator (for logging).
    fn name(&self) -> &str;
}

/// Deterministic built-in questions, cycled by question number.
const TEMPLATE_QUESTIONS: &[&str] = &[
    "When do you notice the problem: while accelerating, braking, idling, or driving over bumps?",
    "Have you noticed any unusual sounds, smells, or warning lights? Please describe them.",
    "Does the issue change with vehicle speed or engine temperature?",
];

/// Fallback generator with a fixed question list.
pub struct TemplateQuestionGenerator;

#[async_trait]
impl QuestionGenerator for TemplateQuestionGenerator {
    async fn generate(
        &self,
        _candidates: &[RankedProblem],
        _transcript: &[TranscriptEntry],
        question_number: u8,
    ) -> Option<String> {
        let index = (question_number.max(1) as usize - 1).min(TEMPLATE_QUESTIONS.len() - 1);
        Some(TEMPLATE_QUESTIONS[index].to_string())
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Configuration for the external question-generation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionServiceConfig {
    /// Base URL of the generation service.
    #[serde(default = "default_url")]
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether the external service is enabled.
    #[serde(default)]
    pub enabled: bool,
}

fn default_url() -> String {
    "http://localhost:8090".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for QuestionServiceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    candidates: &'a [RankedProblem],
    transcript: &'a [TranscriptEntry],
    question_number: u8,
}

#[derive(Deserialize)]
struct GenerateResponse {
    question: Option<String>,
}

/// Client for an external question-generation service.
///
/// Any failure (connection, timeout, bad payload, empty question) degrades
/// to `None` so the session falls back to templates instead of stalling
/// the conversation.
pub struct HttpQuestionGenerator {
    client: reqwest::Client,
    config: QuestionServiceConfig,
}

impl HttpQuestionGenerator {
    pub fn new(config: QuestionServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }
}

#[async_trait]
impl QuestionGenerator for HttpQuestionGenerator {
    async fn generate(
        &self,
        candidates: &[RankedProblem],
        transcript: &[TranscriptEntry],
        question_number: u8,
    ) -> Option<String> {
        if !self.config.enabled {
            return None;
        }

        let url = format!("{}/generate", self.config.url.trim_end_matches('/'));
        let body = GenerateRequest {
            candidates,
            transcript,
            question_number,
        };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "question service unreachable");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "question service returned an error");
            return None;
        }

        let parsed: GenerateResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "question service payload unparseable");
                return None;
            }
        };

        match parsed.question {
            Some(q) if !q.trim().is_empty() => Some(q.trim().to_string()),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
