//! Reinjection: write translated paragraph strings back into a story tree.
//!
//! The translated string is split at its anchor tokens into one segment per
//! region, where a region is the stretch of content between two inline
//! objects. The first text slot of each region receives the segment, later
//! slots of the same region are emptied. Inline objects are never touched,
//! including markup that sits inside a content run.
//!
//! A paragraph whose translation carries a different number of anchors than
//! the paragraph has inline objects is left exactly as it was and reported as
//! a [`StructuralMismatch`].

use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::anchor::{is_reordered, locate_anchors, split_segments};
use crate::projection::project_paragraph;
use crate::tags::TagSet;
use crate::tree::{NodeId, NodeKind, StoryTree, Text};
use crate::walker::paragraphs;

/// A translation that was rejected because its anchors do not line up with
/// the paragraph's inline objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralMismatch {
    pub story_id: String,
    pub paragraph_id: String,
    /// Inline objects in the paragraph.
    pub expected: usize,
    /// Anchor tokens in the translation.
    pub actual: usize,
}

impl std::fmt::Display for StructuralMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "anchor placeholder count mismatch in {}: expected {}, found {}",
            self.paragraph_id, self.expected, self.actual
        )
    }
}

/// Outcome of reinjecting one story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Paragraphs whose content runs were rewritten.
    pub applied: usize,
    /// Paragraphs whose translation equals their source.
    pub unchanged: usize,
    pub mismatches: Vec<StructuralMismatch>,
}

/// A reinjected tree and what happened to it.
#[derive(Debug, Clone)]
pub struct Injection {
    pub tree: StoryTree,
    pub report: InjectionReport,
}

/// Apply `translations` (paragraph id → translated text) to a copy of `source`.
///
/// Paragraphs without an entry are left alone. The input tree is not modified.
pub fn inject_translations(
    source: &StoryTree,
    story_id: &str,
    translations: &HashMap<String, String>,
    tags: &TagSet,
) -> Injection {
    let mut tree = source.clone();
    let mut report = InjectionReport::default();

    for location in paragraphs(source, story_id, tags) {
        let Some(translated) = translations.get(location.id()) else {
            continue;
        };

        match inject_paragraph(&mut tree, location.node, translated, tags) {
            ParagraphOutcome::Applied => report.applied += 1,
            ParagraphOutcome::Unchanged => report.unchanged += 1,
            ParagraphOutcome::Mismatch { expected, actual } => {
                error!(
                    story_id,
                    id = location.id(),
                    expected,
                    actual,
                    "anchor placeholder count mismatch, paragraph left untranslated"
                );
                report.mismatches.push(StructuralMismatch {
                    story_id: story_id.to_string(),
                    paragraph_id: location.paragraph_id.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    debug!(
        story_id,
        applied = report.applied,
        unchanged = report.unchanged,
        mismatches = report.mismatches.len(),
        "story reinjection done"
    );

    Injection { tree, report }
}

#[derive(Debug, PartialEq, Eq)]
enum ParagraphOutcome {
    Applied,
    Unchanged,
    Mismatch { expected: usize, actual: usize },
}

fn inject_paragraph(
    tree: &mut StoryTree,
    paragraph: NodeId,
    translated: &str,
    tags: &TagSet,
) -> ParagraphOutcome {
    let projection = project_paragraph(tree, paragraph, tags);
    let anchors = locate_anchors(translated);

    if anchors.len() != projection.anchor_count() {
        return ParagraphOutcome::Mismatch {
            expected: projection.anchor_count(),
            actual: anchors.len(),
        };
    }

    if translated == projection.text {
        return ParagraphOutcome::Unchanged;
    }

    if is_reordered(&anchors) {
        warn!(
            paragraph = paragraph.0,
            "anchors reordered by translator, segments follow order of appearance"
        );
    }

    let segments = split_segments(translated, &anchors);
    let mut filled = vec![false; segments.len()];
    let mut runs: Vec<(NodeId, Vec<&str>)> = Vec::new();

    for (run, region) in content_regions(tree, paragraph, tags) {
        let segment = match filled.get_mut(region) {
            Some(done) if !*done => {
                *done = true;
                segments[region]
            }
            _ => "",
        };
        match runs.iter().position(|(id, _)| *id == run) {
            Some(index) => runs[index].1.push(segment),
            None => runs.push((run, vec![segment])),
        }
    }

    for (run, slots) in runs {
        replace_run_text(tree, run, &slots);
    }

    for (region, segment) in segments.iter().enumerate() {
        if !filled[region] && !segment.is_empty() {
            warn!(
                paragraph = paragraph.0,
                region, "no content run to receive translated segment, segment dropped"
            );
        }
    }

    ParagraphOutcome::Applied
}

/// Text slots of a paragraph in document order, each paired with its region:
/// the number of inline objects that precede it.
///
/// A content run has one slot at its start and one after each of its
/// non-text children, so a run holding `<?ACE 18?>` has two slots in
/// consecutive regions. A run may therefore appear more than once.
pub fn content_regions(tree: &StoryTree, paragraph: NodeId, tags: &TagSet) -> Vec<(NodeId, usize)> {
    let mut regions = Vec::new();
    let mut region = 0;
    collect_regions(tree, paragraph, tags, &mut region, &mut regions);
    regions
}

fn collect_regions(
    tree: &StoryTree,
    id: NodeId,
    tags: &TagSet,
    region: &mut usize,
    out: &mut Vec<(NodeId, usize)>,
) {
    let NodeKind::Element(element) = tree.kind(id) else {
        return;
    };

    if !tags.is_structural(&element.name) {
        *region += 1;
        return;
    }

    if !tags.is_content(&element.name) {
        for &child in tree.children(id) {
            collect_regions(tree, child, tags, region, out);
        }
        return;
    }

    out.push((id, *region));
    for &child in tree.children(id) {
        match tree.kind(child) {
            NodeKind::Text(_) => continue,
            NodeKind::Markup(_) => *region += 1,
            _ => collect_regions(tree, child, tags, region, out),
        }
        out.push((id, *region));
    }
}

/// Rewrite the character data of a content run.
///
/// Text children are dropped. Every other child keeps its position, and
/// `slots[0]` goes before the first of them, `slots[n]` right after the n-th.
fn replace_run_text(tree: &mut StoryTree, run: NodeId, slots: &[&str]) {
    let kept: Vec<NodeId> = tree
        .children(run)
        .iter()
        .copied()
        .filter(|&child| !matches!(tree.kind(child), NodeKind::Text(_)))
        .collect();

    let mut slots = slots.iter();
    let mut children = Vec::with_capacity(kept.len() * 2 + 1);
    push_text(tree, run, slots.next().copied(), &mut children);
    for child in kept {
        children.push(child);
        push_text(tree, run, slots.next().copied(), &mut children);
    }
    tree.set_children(run, children);
}

fn push_text(tree: &mut StoryTree, run: NodeId, segment: Option<&str>, children: &mut Vec<NodeId>) {
    if let Some(segment) = segment.filter(|s| !s.is_empty()) {
        children.push(tree.alloc(NodeKind::Text(Text::new(segment)), Some(run)));
    }
}
