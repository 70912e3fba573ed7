//! OpenAI chat-completions provider for machine translation
//!
//! Each text is sent as one chat completion with a system prompt that tells
//! the model to keep `⟦ANCHOR_n⟧` tokens exactly where they are.
//!
//! # Authentication
//!
//! The API key comes from configuration (`OPENAI_API_KEY`), see
//! [`crate::config::Config`].

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, language_name, validate_locale};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// System prompt for translating one IDML paragraph into `target_locale`.
pub fn system_prompt(target_locale: &str) -> String {
    let language = language_name(target_locale);
    format!(
        "You are a translation engine. Translate the user text to {language}. \
The user text is a full paragraph from an IDML layout file, possibly spanning multiple sentences and lines, \
with special layout tokens of the form ⟦ANCHOR_n⟧. \
Preserve any placeholders, variables, leading blank spaces or special tokens exactly as they appear. \
Preserve tokens of the form ⟦ANCHOR_n⟧ exactly: do not change, remove, duplicate or reorder them, \
and do not move text across these tokens. \
Preserve line breaks, internal whitespace, capitalization and punctuation, \
except where you must change them for natural {language}. \
Aim for natural, fluent {language} suitable for print; translate short or awkward fragments \
so they read naturally in context. Reply with the translation only."
    )
}

/// OpenAI chat-completions provider
#[derive(Clone)]
pub struct OpenAiTranslator {
    api_key: String,
    model: String,
    client: reqwest::Client,
    /// API root, without the `/chat/completions` suffix
    base_url: String,
}

impl OpenAiTranslator {
    /// Create a provider for `model`
    ///
    /// Fails with `ConfigError` when the API key is blank.
    pub fn new(api_key: String, model: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for OpenAiTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiTranslator")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let prompt = system_prompt(target_locale);
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
        };

        debug!(model = %self.model, chars = text.len(), "sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "openai translation failed");
            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("OpenAI client error ({}): {}", status, body))
            } else {
                MtError::TranslationError(format!("OpenAI server error ({}): {}", status, body))
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse OpenAI response: {}", e))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid OpenAI response: missing 'choices[0].message.content'".to_string(),
                )
            })
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
