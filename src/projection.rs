//! Projection: flatten paragraphs into translatable strings.
//!
//! Text is taken only from content runs. Structural containers are walked
//! through transparently. Any other element is an inline object: it becomes
//! one `⟦ANCHOR_n⟧` token and its subtree is not entered, so text nested in an
//! inline object is never offered for translation.
//!
//! Markup sitting directly in a content run, such as the `<?ACE 18?>` page
//! number instruction, is an inline object too. Markup anywhere else is
//! ignored.

use crate::anchor::format_anchor;
use crate::location::TranslationUnit;
use crate::tags::TagSet;
use crate::tree::{NodeId, NodeKind, StoryTree};
use crate::walker::paragraphs;

/// The flattened form of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Paragraph text with anchor tokens.
    pub text: String,
    /// Inline objects in document order; `inline_objects[n]` is `⟦ANCHOR_n⟧`.
    pub inline_objects: Vec<NodeId>,
}

impl Projection {
    pub fn anchor_count(&self) -> usize {
        self.inline_objects.len()
    }

    /// Empty or whitespace-only projections are not translated.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Flatten the subtree rooted at `paragraph`.
pub fn project_paragraph(tree: &StoryTree, paragraph: NodeId, tags: &TagSet) -> Projection {
    let mut projection = Projection {
        text: String::new(),
        inline_objects: Vec::new(),
    };
    project_node(tree, paragraph, tags, &mut projection);
    projection
}

fn project_node(tree: &StoryTree, id: NodeId, tags: &TagSet, out: &mut Projection) {
    match tree.kind(id) {
        NodeKind::Text(text) => {
            if in_content_run(tree, id, tags) {
                out.text.push_str(text.value());
            }
        }
        NodeKind::Element(element) if tags.is_structural(&element.name) => {
            for &child in tree.children(id) {
                project_node(tree, child, tags, out);
            }
        }
        NodeKind::Element(_) => push_anchor(id, out),
        NodeKind::Markup(_) if in_content_run(tree, id, tags) => push_anchor(id, out),
        NodeKind::Document | NodeKind::Markup(_) => {}
    }
}

fn push_anchor(id: NodeId, out: &mut Projection) {
    out.text.push_str(&format_anchor(out.inline_objects.len()));
    out.inline_objects.push(id);
}

fn in_content_run(tree: &StoryTree, id: NodeId, tags: &TagSet) -> bool {
    tree.parent(id)
        .and_then(|parent| tree.tag(parent))
        .is_some_and(|tag| tags.is_content(tag))
}

/// Extract one translation unit per non-blank paragraph of a story.
///
/// A paragraph holding only inline objects still yields a unit, since its
/// projection is made of anchor tokens.
pub fn extract_units(tree: &StoryTree, story_id: &str, tags: &TagSet) -> Vec<TranslationUnit> {
    paragraphs(tree, story_id, tags)
        .into_iter()
        .filter_map(|location| {
            let projection = project_paragraph(tree, location.node, tags);
            if projection.is_blank() {
                return None;
            }
            Some(TranslationUnit::new(projection.text, location))
        })
        .collect()
}
