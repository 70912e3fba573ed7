//! Document-level orchestration: extract every story, translate the whole
//! batch, inject story by story, save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::location::TranslationUnit;
use crate::mt::{MachineTranslator, TranslationOptions, translate_units};
use crate::reinjection::StructuralMismatch;
use crate::story::{Story, extract_story_units, inject_story};
use crate::tags::TagSet;

/// Source and sink of a document's stories.
pub trait StoryRepository {
    /// Load every story of the document at `path`, sorted by id.
    fn load_stories(&self, path: &Path) -> Result<Vec<Story>>;

    /// Write `stories` into a copy of the document at `original` and return
    /// the path of the copy.
    fn save_stories(&self, original: &Path, stories: &[Story]) -> Result<PathBuf>;
}

/// Extract the translation units of every story, in story order.
pub fn extract_all_units(stories: &[Story], tags: &TagSet) -> Result<Vec<TranslationUnit>> {
    let mut units = Vec::new();
    for story in stories {
        let story_units = extract_story_units(story, tags)?;
        debug!(story_id = %story.id, units = story_units.len(), "extracted story");
        units.extend(story_units);
    }
    Ok(units)
}

/// Stories after reinjection.
#[derive(Debug, Clone, Default)]
pub struct InjectedStories {
    /// Every input story, rewritten or not, in input order.
    pub stories: Vec<Story>,
    /// Stories whose markup differs from the input.
    pub updated: usize,
    /// Paragraphs rewritten across all stories.
    pub applied: usize,
    pub mismatches: Vec<StructuralMismatch>,
}

/// Apply a translation map to every story.
pub fn inject_all_translations(
    stories: &[Story],
    translations: &HashMap<String, String>,
    tags: &TagSet,
) -> Result<InjectedStories> {
    let mut result = InjectedStories::default();

    for story in stories {
        let (injected, report) = inject_story(story, translations, tags)?;
        if injected.xml != story.xml {
            result.updated += 1;
            debug!(story_id = %story.id, applied = report.applied, "story updated");
        }
        result.applied += report.applied;
        result.mismatches.extend(report.mismatches);
        result.stories.push(injected);
    }

    Ok(result)
}

/// Summary of one [`TranslateIdml::execute`] run.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub output_path: PathBuf,
    pub stories: usize,
    pub units: usize,
    pub translations: usize,
    pub updated_stories: usize,
    pub applied: usize,
    pub mismatches: Vec<StructuralMismatch>,
}

/// Translate a whole document: load, extract, translate, inject, save.
pub struct TranslateIdml<'a> {
    repository: &'a dyn StoryRepository,
    translator: &'a dyn MachineTranslator,
    options: TranslationOptions,
    tags: TagSet,
}

impl<'a> TranslateIdml<'a> {
    pub fn new(
        repository: &'a dyn StoryRepository,
        translator: &'a dyn MachineTranslator,
        options: TranslationOptions,
    ) -> Self {
        TranslateIdml {
            repository,
            translator,
            options,
            tags: TagSet::default(),
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub async fn execute(&self, path: &Path) -> Result<TranslationOutcome> {
        info!(path = %path.display(), "starting idml translation");

        let stories = self.repository.load_stories(path)?;
        debug!(count = stories.len(), "loaded stories");

        let units = extract_all_units(&stories, &self.tags)?;
        debug!(count = units.len(), "extracted translation units");

        let translations = translate_units(self.translator, &units, &self.options).await;
        debug!(count = translations.len(), "received translations");

        let injected = inject_all_translations(&stories, &translations, &self.tags)?;
        debug!(
            updated = injected.updated,
            applied = injected.applied,
            "injected translations into stories"
        );
        if !injected.mismatches.is_empty() {
            warn!(
                count = injected.mismatches.len(),
                "paragraphs left untranslated because of anchor mismatches"
            );
        }

        let output_path = self.repository.save_stories(path, &injected.stories)?;
        info!(output = %output_path.display(), "finished idml translation");

        Ok(TranslationOutcome {
            output_path,
            stories: stories.len(),
            units: units.len(),
            translations: translations.len(),
            updated_stories: injected.updated,
            applied: injected.applied,
            mismatches: injected.mismatches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stories() -> Vec<Story> {
        vec![
            Story::new(
                "a",
                "<Story><ParagraphStyleRange><Content>one</Content></ParagraphStyleRange></Story>",
            ),
            Story::new(
                "b",
                "<Story><ParagraphStyleRange><Content>two</Content><Br/><Content>three</Content></ParagraphStyleRange></Story>",
            ),
        ]
    }

    #[test]
    fn test_extract_all_units_in_story_order() {
        let units = extract_all_units(&stories(), &TagSet::default()).unwrap();
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a:0.0", "b:0.0"]);
        assert_eq!(units[1].source, "two⟦ANCHOR_0⟧three");
    }

    #[test]
    fn test_inject_all_counts_updates_and_mismatches() {
        let mut map = HashMap::new();
        map.insert("a:0.0".to_string(), "jeden".to_string());
        map.insert("b:0.0".to_string(), "dwa trzy".to_string());

        let injected = inject_all_translations(&stories(), &map, &TagSet::default()).unwrap();
        assert_eq!(injected.stories.len(), 2);
        assert_eq!(injected.updated, 1);
        assert_eq!(injected.applied, 1);
        assert_eq!(injected.mismatches.len(), 1);
        assert_eq!(injected.mismatches[0].paragraph_id, "b:0.0");
        assert_eq!(injected.stories[1], stories()[1]);
    }

    #[test]
    fn test_malformed_story_aborts() {
        let broken = vec![Story::new("x", "<Story>")];
        assert!(extract_all_units(&broken, &TagSet::default()).is_err());
        assert!(inject_all_translations(&broken, &HashMap::new(), &TagSet::default()).is_err());
    }
}
