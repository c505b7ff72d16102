//! AI suggestions: prompt building, provider fallback and response parsing.
//!
//! Providers are tried in configured order. A [`ProviderError::TokenLimit`]
//! moves on to the next provider; any other error ends the request. Failures
//! never escape as `Err`: they come back as an unsuccessful
//! [`SuggestionResponse`] carrying a user-facing message.

pub mod parse;
pub mod prompt;
pub mod provider;

use crate::config::ProviderConfig;
use crate::error::ErrorCode;
use crate::model::{Item, Variant};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

pub use parse::{ParsedSuggestion, parse};
pub use provider::{ChatMessage, ChatProvider, HttpChatProvider, ProviderError};

/// Message shown when no provider produced a suggestion.
pub const FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error while generating a suggestion. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub tasks: Vec<Item>,
    #[serde(default)]
    pub todos: Vec<Item>,
    pub context: Variant,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

impl Default for SuggestionRequest {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            todos: Vec::new(),
            context: Variant::Task,
            custom_prompt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the request failed; rendered through the CLI error envelope.
    #[serde(skip)]
    pub failure: Option<ErrorCode>,
}

impl SuggestionResponse {
    fn ok(suggestion: &str, model: &str) -> Self {
        Self {
            success: true,
            suggestion: Some(suggestion.trim().to_string()),
            model: Some(model.to_string()),
            error: None,
            failure: None,
        }
    }

    fn failed(code: ErrorCode) -> Self {
        Self {
            success: false,
            suggestion: None,
            model: None,
            error: Some(FAILURE_MESSAGE.to_string()),
            failure: Some(code),
        }
    }

    /// Error code for an unsuccessful response.
    #[must_use]
    pub fn failure_code(&self) -> ErrorCode {
        self.failure.unwrap_or(ErrorCode::ProviderFailed)
    }

    /// Structured fields of a successful suggestion.
    #[must_use]
    pub fn parsed(&self) -> Option<ParsedSuggestion> {
        self.suggestion.as_deref().map(parse)
    }
}

/// Ordered provider chain.
pub struct SuggestionEngine {
    providers: Vec<Box<dyn ChatProvider>>,
}

impl SuggestionEngine {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn ChatProvider>>) -> Self {
        Self { providers }
    }

    /// HTTP providers built from config, in config order.
    #[must_use]
    pub fn from_configs(configs: &[ProviderConfig]) -> Self {
        Self::new(
            configs
                .iter()
                .cloned()
                .map(|config| Box::new(HttpChatProvider::from_config(config)) as Box<dyn ChatProvider>)
                .collect(),
        )
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    pub fn generate(&self, request: &SuggestionRequest) -> SuggestionResponse {
        let messages = match prompt::build_messages(request) {
            Ok(messages) => messages,
            Err(err) => {
                error!(error = %err, "failed to build suggestion prompt");
                return SuggestionResponse::failed(ErrorCode::InternalUnexpected);
            }
        };

        let mut last_error = None;
        for provider in &self.providers {
            match provider.complete(&messages) {
                Ok(text) => {
                    info!(provider = provider.name(), context = %request.context, "suggestion generated");
                    return SuggestionResponse::ok(&text, provider.name());
                }
                Err(err) if err.is_retryable() => {
                    warn!(provider = provider.name(), error = %err, "token limit hit, trying next provider");
                    last_error = Some(err);
                }
                Err(err) => {
                    error!(provider = provider.name(), error = %err, "suggestion request failed");
                    return SuggestionResponse::failed(err.code());
                }
            }
        }

        error!(
            providers = self.providers.len(),
            "no provider could generate a suggestion"
        );
        let code = last_error
            .as_ref()
            .map_or(ErrorCode::ProviderFailed, ProviderError::code);
        SuggestionResponse::failed(code)
    }
}
