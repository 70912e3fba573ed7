//! Pre-order traversal shared by extraction and reinjection.
//!
//! Both passes find paragraphs through [`paragraphs`], so a paragraph id
//! recorded during extraction names the same element during reinjection as
//! long as the tree was parsed from the same markup.

use crate::location::TextLocation;
use crate::tags::TagSet;
use crate::tree::{Element, NodeId, NodeKind, StoryTree};

/// Visit every element below `root` in document order.
///
/// The callback receives the element id, the element, and its path: the child
/// indices leading from `root` to it. Every child of every node is counted,
/// including text and markup, so indices match the markup's child order.
pub fn walk_elements<F>(tree: &StoryTree, root: NodeId, visit: &mut F)
where
    F: FnMut(NodeId, &Element, &[usize]),
{
    let mut path = Vec::new();
    walk_node(tree, root, &mut path, visit);
}

fn walk_node<F>(tree: &StoryTree, id: NodeId, path: &mut Vec<usize>, visit: &mut F)
where
    F: FnMut(NodeId, &Element, &[usize]),
{
    if let NodeKind::Element(element) = tree.kind(id) {
        visit(id, element, path);
    }

    for (index, &child) in tree.children(id).iter().enumerate() {
        path.push(index);
        walk_node(tree, child, path, visit);
        path.pop();
    }
}

/// Locations of all paragraph boundaries in `tree`, in document order.
pub fn paragraphs(tree: &StoryTree, story_id: &str, tags: &TagSet) -> Vec<TextLocation> {
    let mut found = Vec::new();
    walk_elements(tree, tree.root(), &mut |id, element, path| {
        if tags.is_paragraph(&element.name) {
            found.push(TextLocation::new(story_id, path, id));
        }
    });
    found
}
