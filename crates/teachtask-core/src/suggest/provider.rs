//! Chat-completion providers behind a narrow trait.

use crate::config::ProviderConfig;
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request timeout for provider HTTP calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The prompt exceeded the model's context window. The only error that
    /// moves a request on to the next provider.
    #[error("model context length exceeded: {0}")]
    TokenLimit(String),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TokenLimit(_))
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TokenLimit(_) => ErrorCode::ProviderTokenLimit,
            Self::Request(_) | Self::Decode(_) => ErrorCode::ProviderFailed,
        }
    }
}

/// Map a provider's error text onto the error taxonomy.
#[must_use]
pub fn classify(message: String) -> ProviderError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("token limit")
        || lowered.contains("context length")
        || lowered.contains("context_length")
    {
        ProviderError::TokenLimit(message)
    } else {
        ProviderError::Request(message)
    }
}

pub trait ChatProvider: Send + Sync {
    /// Key reported back as the suggestion's `model`.
    fn name(&self) -> &str;

    /// Run one chat completion and return the assistant text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::TokenLimit`] when the context is too long,
    /// other variants for any other failure.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// OpenAI-compatible `POST {endpoint}/chat/completions` client.
#[derive(Debug, Clone)]
pub struct HttpChatProvider {
    config: ProviderConfig,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl HttpChatProvider {
    /// Build a provider, reading the API key from `config.api_key_env` if set.
    #[must_use]
    pub fn from_config(config: ProviderConfig) -> Self {
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());
        Self {
            config,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

impl ChatProvider for HttpChatProvider {
    fn name(&self) -> &str {
        &self.config.key
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let url = self.url();
        let body = CompletionBody {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        let mut request = ureq::post(&url)
            .timeout(self.timeout)
            .set("User-Agent", "teachtask");
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        debug!(provider = %self.config.key, model = %self.config.model, "requesting completion");
        let response = match request.send_json(&body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let detail = response.into_string().unwrap_or_default();
                return Err(classify(format!("HTTP {status} from {url}: {detail}")));
            }
            Err(err) => return Err(classify(format!("{url}: {err}"))),
        };

        let completion: Completion = response
            .into_json()
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Decode("response has no message content".to_string()))
    }
}
