//! One IDML story: an id plus its raw markup.

use std::collections::HashMap;

use crate::error::Result;
use crate::location::TranslationUnit;
use crate::parser::parse_story;
use crate::projection::extract_units;
use crate::reinjection::{InjectionReport, inject_translations};
use crate::tags::TagSet;

/// A story fragment as stored in the archive (`Stories/Story_<id>.xml`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: String,
    pub xml: String,
}

impl Story {
    pub fn new(id: impl Into<String>, xml: impl Into<String>) -> Self {
        Story {
            id: id.into(),
            xml: xml.into(),
        }
    }
}

/// Parse a story and extract its translation units.
pub fn extract_story_units(story: &Story, tags: &TagSet) -> Result<Vec<TranslationUnit>> {
    let tree = parse_story(&story.id, &story.xml)?;
    Ok(extract_units(&tree, &story.id, tags))
}

/// Parse a story, apply `translations` and serialize the result.
///
/// The returned story has the same id. Its markup equals the input markup
/// when nothing was applied.
pub fn inject_story(
    story: &Story,
    translations: &HashMap<String, String>,
    tags: &TagSet,
) -> Result<(Story, InjectionReport)> {
    let tree = parse_story(&story.id, &story.xml)?;
    let injection = inject_translations(&tree, &story.id, translations, tags);
    let updated = Story {
        id: story.id.clone(),
        xml: injection.tree.to_xml(),
    };
    Ok((updated, injection.report))
}
