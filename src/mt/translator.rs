//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the IDML pipeline can run against OpenAI, a mock, or any other backend
//! without being coupled to one of them.
//!
//! # Example
//!
//! ```ignore
//! use idml_mt::mt::{MachineTranslator, OpenAiTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAiTranslator::new("sk-...".to_string(), "gpt-4o".to_string())?;
//!
//!     let result = provider.translate("Roll the die⟦ANCHOR_0⟧", "en", "pl").await?;
//!     println!("{}", result); // "Rzuć kością⟦ANCHOR_0⟧"
//!
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations handle the actual translation work, whether through an
/// API (OpenAI) or deterministic logic (Mock). Texts handed to a provider are
/// whole paragraphs that may contain `⟦ANCHOR_n⟧` tokens; a provider is
/// expected to keep them, but callers validate the result anyway.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "pl", "pl-PL")
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Name of this provider, used in logs
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `pl-PL` → `pl`
/// - `zh-Hans` → `zh`
/// - `EN` → `en`
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Accepts ASCII alphanumerics, hyphens and underscores.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// English name of a language, for prompts. Unknown codes are returned as given.
pub fn language_name(locale: &str) -> String {
    let name = match normalize_locale(locale).as_str() {
        "cs" => "Czech",
        "da" => "Danish",
        "de" => "German",
        "en" => "English",
        "es" => "Spanish",
        "fi" => "Finnish",
        "fr" => "French",
        "hu" => "Hungarian",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "nl" => "Dutch",
        "no" | "nb" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "sk" => "Slovak",
        "sv" => "Swedish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "zh" => "Chinese",
        _ => return locale.to_string(),
    };
    name.to_string()
}
