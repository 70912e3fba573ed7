use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::tree::{Element, NodeId, NodeKind, StoryTree, Text};

/// Parse story markup into a [`StoryTree`].
///
/// The parse is lossless: [`StoryTree::to_xml`] on the result returns the
/// input unchanged. Any reader error, or an element left open at end of input,
/// is reported as [`Error::MalformedSource`] for `story_id`.
pub fn parse_story(story_id: &str, xml: &str) -> Result<StoryTree> {
    let mut reader = Reader::from_str(xml);
    let mut tree = StoryTree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::malformed(story_id, format!("{} (at byte {})", e, reader.error_position()))
        })?;
        let parent = stack.last().copied().unwrap_or(tree.root());

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let inner = String::from_utf8_lossy(&e).into_owned();
                let element = Element::from_raw(name, inner.clone(), Some(inner));
                let id = tree.append(parent, NodeKind::Element(element));
                stack.push(id);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let inner = String::from_utf8_lossy(&e).into_owned();
                tree.append(parent, NodeKind::Element(Element::from_raw(name, inner, None)));
            }
            Event::End(e) => {
                if stack.len() == 1 {
                    return Err(Error::malformed(
                        story_id,
                        format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                    ));
                }
                let end = String::from_utf8_lossy(&e).into_owned();
                if let Some(id) = stack.pop()
                    && let NodeKind::Element(element) = tree.kind_mut(id)
                {
                    element.close(end);
                }
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(&e);
                push_text(&mut tree, parent, &raw, &raw);
            }
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(&e);
                let raw = format!("&{};", name);
                let value = resolve_entity(&name).unwrap_or_else(|| raw.clone());
                push_text(&mut tree, parent, &raw, &value);
            }
            Event::CData(e) => {
                let markup = format!("<![CDATA[{}]]>", String::from_utf8_lossy(&e));
                tree.append(parent, NodeKind::Markup(markup));
            }
            Event::Comment(e) => {
                let markup = format!("<!--{}-->", String::from_utf8_lossy(&e));
                tree.append(parent, NodeKind::Markup(markup));
            }
            Event::Decl(e) => {
                let markup = format!("<?{}?>", String::from_utf8_lossy(&e));
                tree.append(parent, NodeKind::Markup(markup));
            }
            Event::PI(e) => {
                let markup = format!("<?{}?>", String::from_utf8_lossy(&e));
                tree.append(parent, NodeKind::Markup(markup));
            }
            Event::DocType(e) => {
                let markup = format!("<!DOCTYPE {}>", String::from_utf8_lossy(&e));
                tree.append(parent, NodeKind::Markup(markup));
            }
            Event::Eof => break,
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack
            .last()
            .and_then(|&id| tree.tag(id))
            .unwrap_or_default()
            .to_string();
        return Err(Error::malformed(
            story_id,
            format!("unexpected end of input: <{}> is not closed", open),
        ));
    }

    Ok(tree)
}

/// Append character data to `parent`, merging with a preceding text node so
/// that `a &amp; b` stays one node.
fn push_text(tree: &mut StoryTree, parent: NodeId, raw: &str, value: &str) {
    let last = tree.children(parent).last().copied();
    if let Some(last) = last
        && let NodeKind::Text(text) = tree.kind_mut(last)
    {
        text.append(raw, value);
        return;
    }
    tree.append(
        parent,
        NodeKind::Text(Text::from_parts(raw.to_string(), value.to_string())),
    );
}

/// Resolve a predefined entity or character reference. Unknown entities
/// resolve to `None` and are kept literally by the caller.
fn resolve_entity(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let codepoint = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(codepoint).map(String::from);
    }

    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "apos" => "'",
        "quot" => "\"",
        _ => return None,
    };
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<idPkg:Story xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="18.0">
	<Story Self="u1a2" AppliedTOCStyle="n" TrackChanges="false">
		<StoryPreference OpticalMarginAlignment="false" />
		<ParagraphStyleRange AppliedParagraphStyle="ParagraphStyle/$ID/NormalParagraphStyle">
			<CharacterStyleRange AppliedCharacterStyle="CharacterStyle/$ID/[No character style]">
				<Content>Roll the dice &amp; move&#x2028;on</Content>
				<Br />
				<Content>Draw a card<?ACE 7?></Content>
			</CharacterStyleRange>
		</ParagraphStyleRange>
	</Story>
	<!-- generated -->
</idPkg:Story>
"#;

    #[test]
    fn test_roundtrip_is_lossless() {
        let tree = parse_story("u1a2", STORY).unwrap();
        assert_eq!(tree.to_xml(), STORY);
    }

    #[test]
    fn test_entities_are_decoded_in_values() {
        let tree = parse_story("u1a2", "<Content>a &amp; b &lt;&#65;&#x42;&gt;</Content>").unwrap();
        let content = tree.children(tree.root())[0];
        let text = tree.children(content)[0];

        assert_eq!(tree.children(content).len(), 1, "text and refs merge into one node");
        assert_eq!(tree.text(text).unwrap().value(), "a & b <AB>");
        assert_eq!(tree.text(text).unwrap().raw(), "a &amp; b &lt;&#65;&#x42;&gt;");
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        let tree = parse_story("s", "<Content>x&nbsp;y</Content>").unwrap();
        let content = tree.children(tree.root())[0];
        assert_eq!(tree.text_content(content), "x&nbsp;y");
        assert_eq!(tree.to_xml(), "<Content>x&nbsp;y</Content>");
    }

    #[test]
    fn test_self_closing_and_markup_nodes() {
        let tree = parse_story("s", "<P><Br Self=\"b1\"/><!--c--><![CDATA[<raw>]]></P>").unwrap();
        let p = tree.children(tree.root())[0];
        let children = tree.children(p);

        assert_eq!(children.len(), 3);
        assert!(tree.element(children[0]).unwrap().is_self_closing());
        assert_eq!(tree.tag(children[0]), Some("Br"));
        assert!(matches!(tree.kind(children[1]), NodeKind::Markup(m) if m == "<!--c-->"));
        assert!(matches!(tree.kind(children[2]), NodeKind::Markup(m) if m == "<![CDATA[<raw>]]>"));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let first = parse_story("s", STORY).unwrap();
        let second = parse_story("s", STORY).unwrap();
        assert_eq!(first.node_count(), second.node_count());
        for index in 0..first.node_count() as u32 {
            assert_eq!(first.kind(NodeId(index)), second.kind(NodeId(index)));
        }
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        let result = parse_story("broken", "<Story><Content>oops</Story>");
        match result {
            Err(Error::MalformedSource { story_id, .. }) => assert_eq!(story_id, "broken"),
            other => panic!("Expected MalformedSource, got {:?}", other.map(|t| t.to_xml())),
        }
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        match parse_story("open", "<Story><Content>text") {
            Err(Error::MalformedSource { message, .. }) => assert!(message.contains("Content")),
            other => panic!("Expected MalformedSource, got {:?}", other.map(|t| t.to_xml())),
        }
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity("#x2029").as_deref(), Some("\u{2029}"));
        assert_eq!(resolve_entity("#10").as_deref(), Some("\n"));
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(resolve_entity("#xZZ"), None);
    }
}
