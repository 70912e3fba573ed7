//! Machine translation for InDesign IDML stories.
//!
//! Each paragraph (`ParagraphStyleRange`) of a story is flattened into one
//! string in which every inline object (images, breaks, hyperlinks, anchored
//! frames) is replaced by an `⟦ANCHOR_n⟧` token. The string is translated as a
//! whole, then split at its anchor tokens and written back into the
//! paragraph's `Content` runs, leaving the inline objects where they were. A
//! translation whose anchor count does not match is rejected and the
//! paragraph is kept as it was.
//!
//! # Example
//!
//! ```ignore
//! use idml_mt::mt::{MockMode, MockTranslator, TranslationOptions};
//! use idml_mt::{TranslateIdml, ZipIdmlRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = ZipIdmlRepository::new(false);
//!     let translator = MockTranslator::new(MockMode::Suffix);
//!
//!     let outcome = TranslateIdml::new(&repository, &translator, TranslationOptions::default())
//!         .execute("rulebook.idml".as_ref())
//!         .await?;
//!
//!     println!("wrote {}", outcome.output_path.display());
//!     Ok(())
//! }
//! ```

pub mod anchor;
pub mod config;
pub mod error;
pub mod idml;
pub mod location;
pub mod mt;
pub mod parser;
pub mod pipeline;
pub mod projection;
pub mod reinjection;
pub mod story;
pub mod tags;
pub mod tree;
pub mod walker;


// Re-export main types for convenient access
pub use anchor::{count_anchors, format_anchor, locate_anchors};
pub use config::Config;
pub use error::{Error, Result};
pub use idml::ZipIdmlRepository;
pub use location::{TextLocation, TranslationUnit, paragraph_id};
pub use parser::parse_story;
pub use pipeline::{
    InjectedStories, StoryRepository, TranslateIdml, TranslationOutcome, extract_all_units,
    inject_all_translations,
};
pub use projection::{Projection, extract_units, project_paragraph};
pub use reinjection::{Injection, InjectionReport, StructuralMismatch, inject_translations};
pub use story::{Story, extract_story_units, inject_story};
pub use tags::TagSet;
pub use tree::{Element, NodeId, NodeKind, StoryTree, Text};
pub use walker::{paragraphs, walk_elements};
