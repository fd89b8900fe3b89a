//! Gemini text generation client
//!
//! ## Stack
//! - `async-openai` against Gemini's OpenAI-compatible endpoint
//! - a `reqwest` client with the configured request timeout
//! - no client-side backoff: one `generate` call is one HTTP request, retries
//!   belong to `RetryPolicy`

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, FinishReason,
    },
    Client,
};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::debug;

use crate::config::Config;
use crate::error::{FaultKind, RemoteFault, SetupError};

/// Anything that turns an instruction into text.
///
/// `Ok(None)` means the endpoint answered without any text.
#[allow(async_fn_in_trait)]
pub trait TextGeneration {
    async fn generate(&self, instruction: &str) -> Result<Option<String>, RemoteFault>;
}

/// Gemini client
pub struct GeminiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl GeminiClient {
    /// Build the client once from the startup configuration
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.gemini_api_key.expose())
            .with_api_base(&config.gemini_api_base_url);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| SetupError::HttpClient {
                service: "gemini",
                timeout: config.request_timeout(),
                source,
            })?;

        Ok(Self {
            client: Client::with_config(openai_config)
                .with_http_client(http)
                .with_backoff(single_attempt()),
            model_name: config.gemini_model_name.clone(),
            temperature: config.gemini_temperature,
        })
    }
}

/// Backoff that gives up after the first failed request
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

impl TextGeneration for GeminiClient {
    async fn generate(&self, instruction: &str) -> Result<Option<String>, RemoteFault> {
        debug!("Calling generation API, model: {}", self.model_name);
        debug!("Instruction length: {} chars", instruction.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(instruction)
            .build()
            .map_err(fault_from_openai)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .build()
            .map_err(fault_from_openai)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(fault_from_openai)?;

        debug!("Generation API call succeeded");

        let Some(choice) = response.choices.first() else {
            return Ok(None);
        };

        if matches!(choice.finish_reason, Some(FinishReason::ContentFilter)) {
            return Err(RemoteFault::new(
                FaultKind::Blocked,
                "finish_reason=content_filter",
            ));
        }

        Ok(choice.message.content.clone())
    }
}

/// Keep what structure the error offers; the text goes to the classifier only
fn fault_from_openai(err: OpenAIError) -> RemoteFault {
    match &err {
        OpenAIError::Reqwest(e) => {
            let mut fault = RemoteFault::from_reqwest(e);
            fault.description = err.to_string();
            fault
        }
        _ => RemoteFault::from_description(err.to_string()),
    }
}
