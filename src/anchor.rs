//! Anchor Token System for keeping inline objects in place during machine translation
//!
//! Inline objects (images, breaks, cross-references) cannot be sent to a translator,
//! so each one is replaced in the flattened paragraph text by an anchor token. The
//! translator is asked to leave the tokens alone; after translation the tokens split
//! the translated text back into the regions between inline objects.
//!
//! Format: ⟦ANCHOR_{index}⟧ where index counts inline objects in the paragraph (0-indexed)
//! Examples: ⟦ANCHOR_0⟧, ⟦ANCHOR_1⟧, ⟦ANCHOR_12⟧

use regex::Regex;
use std::sync::LazyLock;

pub const ANCHOR_PREFIX: &str = "⟦ANCHOR_";
pub const ANCHOR_SUFFIX: &str = "⟧";

static ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"⟦ANCHOR_(\d+)⟧").expect("anchor token pattern is a valid regex")
});

/// Format the anchor token for the inline object at `index`
pub fn format_anchor(index: usize) -> String {
    format!("{}{}{}", ANCHOR_PREFIX, index, ANCHOR_SUFFIX)
}

/// An anchor token found in a (translated) text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAnchor {
    /// Index written in the token. Can exceed `usize` bounds in garbage input,
    /// in which case it is `None`.
    pub index: Option<usize>,
    /// Byte offset where the token starts
    pub start: usize,
    /// Byte offset just past the token
    pub end: usize,
}

/// Locate all anchor tokens in `text`, in order of appearance
///
/// Any text matching the token grammar counts, whatever its number: the
/// caller compares the count with the number of inline objects it expects.
///
/// # Example
/// ```ignore
/// let located = locate_anchors("⟦ANCHOR_1⟧ は ⟦ANCHOR_0⟧");
/// assert_eq!(located.len(), 2);
/// assert_eq!(located[0].index, Some(1));
/// ```
pub fn locate_anchors(text: &str) -> Vec<LocatedAnchor> {
    ANCHOR_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(LocatedAnchor {
                index: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Count anchor tokens in `text`
pub fn count_anchors(text: &str) -> usize {
    ANCHOR_PATTERN.find_iter(text).count()
}

/// Split `text` at the located anchors into `anchors.len() + 1` segments
///
/// Segment 0 is the text before the first anchor, segment `i` the text between
/// anchor `i-1` and anchor `i`, and the last segment the text after the last
/// anchor. Segments may be empty.
pub fn split_segments<'a>(text: &'a str, anchors: &[LocatedAnchor]) -> Vec<&'a str> {
    let mut segments = Vec::with_capacity(anchors.len() + 1);
    let mut last = 0;
    for anchor in anchors {
        segments.push(&text[last..anchor.start]);
        last = anchor.end;
    }
    segments.push(&text[last..]);
    segments
}

/// Detect whether anchors appear in an order other than ⟦ANCHOR_0⟧, ⟦ANCHOR_1⟧, ...
///
/// Reordering is reported but not rejected: segments are always assigned by
/// order of appearance.
pub fn is_reordered(anchors: &[LocatedAnchor]) -> bool {
    anchors
        .iter()
        .enumerate()
        .any(|(position, anchor)| anchor.index != Some(position))
}
