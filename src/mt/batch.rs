//! Batch translation of extracted paragraphs.
//!
//! Every unit is translated on its own, with at most `concurrency` requests in
//! flight. A failed unit falls back to its source text so a single provider
//! error never aborts a document.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::anchor::count_anchors;
use crate::location::TranslationUnit;
use crate::mt::translator::MachineTranslator;

/// Locales and fan-out for [`translate_units`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOptions {
    pub source_locale: String,
    pub target_locale: String,
    /// Maximum number of concurrent requests, at least 1.
    pub concurrency: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        TranslationOptions {
            source_locale: "en".to_string(),
            target_locale: "pl".to_string(),
            concurrency: 8,
        }
    }
}

/// Split `text` into leading whitespace, core and trailing whitespace.
pub fn split_edge_whitespace(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len().max(core_start);
    (
        &text[..core_start],
        &text[core_start..core_end],
        &text[core_end..],
    )
}

/// Keep the source's edge whitespace around the translated core.
pub fn restore_edge_whitespace(source: &str, translated: &str) -> String {
    let (leading, _, trailing) = split_edge_whitespace(source);
    let (_, core, _) = split_edge_whitespace(translated);
    format!("{}{}{}", leading, core, trailing)
}

/// Translate `units` and return the paragraph id → text map.
///
/// Every unit gets an entry: units whose translation failed map to their
/// source text, which reinjection treats as unchanged.
pub async fn translate_units(
    translator: &dyn MachineTranslator,
    units: &[TranslationUnit],
    options: &TranslationOptions,
) -> HashMap<String, String> {
    if units.is_empty() {
        return HashMap::new();
    }

    info!(
        provider = translator.provider_name(),
        units = units.len(),
        source = %options.source_locale,
        target = %options.target_locale,
        "translating units"
    );

    let translated: Vec<(String, String)> = stream::iter(units)
        .map(|unit| translate_unit(translator, unit, options))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    translated.into_iter().collect()
}

async fn translate_unit(
    translator: &dyn MachineTranslator,
    unit: &TranslationUnit,
    options: &TranslationOptions,
) -> (String, String) {
    let result = translator
        .translate(&unit.source, &options.source_locale, &options.target_locale)
        .await;

    match result {
        Ok(translated) => {
            let text = restore_edge_whitespace(&unit.source, &translated);
            let expected = count_anchors(&unit.source);
            let actual = count_anchors(&text);
            if expected != actual {
                warn!(id = %unit.id, expected, actual, "translator changed the anchor count");
            }
            (unit.id.clone(), text)
        }
        Err(e) => {
            error!(id = %unit.id, error = %e, "translation failed for unit, using source text");
            (unit.id.clone(), unit.source.clone())
        }
    }
}
