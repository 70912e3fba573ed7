//! Paragraph addressing and translation units.

use crate::tree::NodeId;

/// Position of one paragraph inside a story.
///
/// The `path` is positional (child indices from the story root), so it is
/// only meaningful against the tree it was computed from, or a tree parsed
/// from the same markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLocation {
    pub story_id: String,
    pub path: Vec<usize>,
    /// `story_id:dotted.path`, the key translations are looked up under.
    pub paragraph_id: String,
    /// The paragraph element in the tree the walk ran over.
    pub node: NodeId,
}

impl TextLocation {
    pub fn new(story_id: &str, path: &[usize], node: NodeId) -> Self {
        TextLocation {
            story_id: story_id.to_string(),
            path: path.to_vec(),
            paragraph_id: paragraph_id(story_id, path),
            node,
        }
    }

    pub fn id(&self) -> &str {
        &self.paragraph_id
    }
}

/// Build the paragraph id for a story and path, e.g. `u1a2:1.3.5`.
pub fn paragraph_id(story_id: &str, path: &[usize]) -> String {
    let dotted = path
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".");
    format!("{}:{}", story_id, dotted)
}

/// The flattened text of one paragraph, ready for translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub id: String,
    /// Paragraph text with `⟦ANCHOR_n⟧` standing in for inline objects.
    pub source: String,
    pub location: TextLocation,
}

impl TranslationUnit {
    pub fn new(source: String, location: TextLocation) -> Self {
        TranslationUnit {
            id: location.paragraph_id.clone(),
            source,
            location,
        }
    }
}
