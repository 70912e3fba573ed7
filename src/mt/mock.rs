//! Mock Machine Translator for testing
//!
//! A deterministic, API-free translator for exercising the IDML pipeline
//! without API keys or network access. It is also what `idml-mt --mock` runs.
//!
//! # Example
//!
//! ```ignore
//! use idml_mt::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello⟦ANCHOR_0⟧", "en", "pl").await.unwrap();
//!     assert_eq!(result, "hello⟦ANCHOR_0⟧_pl");
//! }
//! ```

use crate::anchor::locate_anchors;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_pl"
    /// Anchor tokens pass through untouched
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of whitespace-separated words
    /// (simulates translators that move anchors around)
    Reorder,

    /// Remove every anchor token (simulates a translator that eats them)
    DropAnchors,

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self { mode, delay_ms: 0 }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self { mode, delay_ms }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => Ok(text.split_whitespace().rev().collect::<Vec<_>>().join(" ")),
            MockMode::DropAnchors => {
                let mut stripped = String::with_capacity(text.len());
                let mut last = 0;
                for anchor in locate_anchors(text) {
                    stripped.push_str(&text[last..anchor.start]);
                    last = anchor.end;
                }
                stripped.push_str(&text[last..]);
                Ok(stripped)
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        self.apply_delay().await;
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::count_anchors;

    // ========== Suffix Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "pl").await.unwrap();
        assert_eq!(result, "hello_pl");
    }

    #[tokio::test]
    async fn test_suffix_preserves_anchor_tokens() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let text = "text⟦ANCHOR_0⟧more⟦ANCHOR_1⟧end";
        let result = mock.translate(text, "en", "pl").await.unwrap();
        assert_eq!(result, "text⟦ANCHOR_0⟧more⟦ANCHOR_1⟧end_pl");
        assert_eq!(count_anchors(&result), 2);
    }

    // ========== Mapping Mode Tests ==========

    #[tokio::test]
    async fn test_mapping_with_fallback() {
        let mut map = HashMap::new();
        map.insert(
            ("before⟦ANCHOR_0⟧after".to_string(), "pl".to_string()),
            "przed⟦ANCHOR_0⟧po".to_string(),
        );

        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(
            mock.translate("before⟦ANCHOR_0⟧after", "en", "pl").await.unwrap(),
            "przed⟦ANCHOR_0⟧po"
        );
        assert_eq!(
            mock.translate("unknown", "en", "pl").await.unwrap(),
            "unknown_pl"
        );
    }

    // ========== Reorder Mode Tests ==========

    #[tokio::test]
    async fn test_reorder_moves_anchors() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock
            .translate("⟦ANCHOR_0⟧ sent by ⟦ANCHOR_1⟧", "en", "ja")
            .await
            .unwrap();
        assert_eq!(result, "⟦ANCHOR_1⟧ by sent ⟦ANCHOR_0⟧");
    }

    // ========== DropAnchors Mode Tests ==========

    #[tokio::test]
    async fn test_drop_anchors() {
        let mock = MockTranslator::new(MockMode::DropAnchors);
        let result = mock
            .translate("text⟦ANCHOR_0⟧more⟦ANCHOR_1⟧end", "en", "pl")
            .await
            .unwrap();
        assert_eq!(result, "textmoreend");
    }

    // ========== Error Mode Tests ==========

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("API rate limit".to_string()));
        match mock.translate("hello", "en", "pl").await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API rate limit"),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    // ========== NoOp Mode Tests ==========

    #[tokio::test]
    async fn test_noop_mode() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let text = "  keep ⟦ANCHOR_0⟧ me  ";
        assert_eq!(mock.translate(text, "en", "pl").await.unwrap(), text);
    }

    // ========== Delay Tests ==========

    #[tokio::test]
    async fn test_with_delay() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 10);
        let start = std::time::Instant::now();
        mock.translate("hello", "en", "pl").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(
            MockTranslator::new(MockMode::NoOp).provider_name(),
            "Mock Translator"
        );
    }
}
