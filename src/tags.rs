/// Tag names that give a story its paragraph structure.
///
/// The three structural tags are transparent to projection: traversal goes
/// through them without emitting anything. Every other element found inside a
/// paragraph is an inline object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    /// Paragraph boundary and paragraph-range container.
    pub paragraph: String,
    /// Character-range container.
    pub character_range: String,
    /// Content run: the only element whose direct text is translatable.
    pub content: String,
}

impl Default for TagSet {
    /// IDML story tags.
    fn default() -> Self {
        TagSet {
            paragraph: "ParagraphStyleRange".to_string(),
            character_range: "CharacterStyleRange".to_string(),
            content: "Content".to_string(),
        }
    }
}

impl TagSet {
    pub fn is_paragraph(&self, tag: &str) -> bool {
        tag == self.paragraph
    }

    pub fn is_content(&self, tag: &str) -> bool {
        tag == self.content
    }

    pub fn is_structural(&self, tag: &str) -> bool {
        tag == self.paragraph || tag == self.character_range || tag == self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idml_defaults() {
        let tags = TagSet::default();
        assert!(tags.is_paragraph("ParagraphStyleRange"));
        assert!(tags.is_content("Content"));
        assert!(tags.is_structural("CharacterStyleRange"));
        assert!(!tags.is_structural("Br"));
        assert!(!tags.is_structural("HyperlinkTextSource"));
    }

    #[test]
    fn test_custom_tags() {
        let tags = TagSet {
            paragraph: "p".to_string(),
            character_range: "span".to_string(),
            content: "t".to_string(),
        };
        assert!(tags.is_paragraph("p"));
        assert!(!tags.is_paragraph("ParagraphStyleRange"));
        assert!(tags.is_structural("span"));
    }
}
