//! Machine Translation Module
//!
//! Providers behind the [`MachineTranslator`] trait and the batch driver that
//! turns extracted paragraphs into a translation map.
//!
//! # Overview
//!
//! 1. **MT Trait** - generic async trait for translation backends
//! 2. **Providers** - OpenAI chat completions and a deterministic mock
//! 3. **Batch driver** - per-unit translation with bounded concurrency,
//!    edge whitespace preservation and fallback to the source text
//!
//! # Example
//!
//! ```ignore
//! use idml_mt::mt::{MockMode, MockTranslator, TranslationOptions, translate_units};
//!
//! let translator = MockTranslator::new(MockMode::Suffix);
//! let map = translate_units(&translator, &units, &TranslationOptions::default()).await;
//! ```
pub mod batch;
pub mod error;
pub mod mock;
pub mod openai;
pub mod translator;

pub use batch::{TranslationOptions, restore_edge_whitespace, translate_units};
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use openai::OpenAiTranslator;
pub use translator::{MachineTranslator, language_name, normalize_locale, validate_locale};
