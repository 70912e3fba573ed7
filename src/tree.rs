//! Arena-backed document tree for story markup.
//!
//! Every node lives in a single vector and is addressed by a [`NodeId`].
//! Parsing assigns ids in document order, so parsing the same markup twice
//! yields the same ids. Elements keep the raw text of their start tag and text
//! nodes keep their escaped form, which makes [`StoryTree::to_xml`] reproduce
//! untouched regions byte for byte.

use quick_xml::escape::partial_escape;

/// Unique identifier for a node in a [`StoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An element: tag name plus the raw markup needed to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written (`ParagraphStyleRange`, `idPkg:Story`).
    pub name: String,
    /// Everything between `<` and `>` (or `/>`) of the start tag.
    start_inner: String,
    /// Name as written in the closing tag, `None` for `<Tag/>`.
    end_inner: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Element {
            start_inner: name.clone(),
            end_inner: Some(name.clone()),
            name,
        }
    }

    pub(crate) fn from_raw(name: String, start_inner: String, end_inner: Option<String>) -> Self {
        Element {
            name,
            start_inner,
            end_inner,
        }
    }

    pub(crate) fn close(&mut self, end_inner: String) {
        self.end_inner = Some(end_inner);
    }

    pub fn is_self_closing(&self) -> bool {
        self.end_inner.is_none()
    }

    /// The raw start tag, e.g. `<Content>` or `<Br Self="u1"/>`.
    pub fn start_tag(&self) -> String {
        match self.end_inner {
            Some(_) => format!("<{}>", self.start_inner),
            None => format!("<{}/>", self.start_inner),
        }
    }
}

/// A run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Escaped form, exactly as it appeared in the source.
    raw: String,
    /// Decoded value.
    value: String,
}

impl Text {
    /// Create a text node from a decoded value, escaping it for output.
    pub fn new(value: &str) -> Self {
        Text {
            raw: partial_escape(value).into_owned(),
            value: value.to_string(),
        }
    }

    pub(crate) fn from_parts(raw: String, value: String) -> Self {
        Text { raw, value }
    }

    pub(crate) fn append(&mut self, raw: &str, value: &str) {
        self.raw.push_str(raw);
        self.value.push_str(value);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The story root. Never an element, never a paragraph.
    Document,
    Element(Element),
    Text(Text),
    /// Comments, processing instructions, CDATA, declarations. Written back verbatim.
    Markup(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed story.
#[derive(Debug, Clone)]
pub struct StoryTree {
    nodes: Vec<Node>,
}

impl Default for StoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryTree {
    /// Create a tree holding only the document root.
    pub fn new() -> Self {
        StoryTree {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes allocated in the arena, including the root and any
    /// detached nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&Text> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Allocate a node and append it to `parent`'s children.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind, Some(parent));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Allocate a node with a parent link but without attaching it.
    pub fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Replace the child list of `id`. Dropped children stay in the arena, detached.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let previous = std::mem::take(&mut self.nodes[id.index()].children);
        for child in previous {
            if !children.contains(&child) {
                self.nodes[child.index()].parent = None;
            }
        }
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes[id.index()].children = children;
    }

    /// Concatenated decoded text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text.value()),
            NodeKind::Element(_) | NodeKind::Document => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            NodeKind::Markup(_) => {}
        }
    }

    /// Serialize the whole tree.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), &mut out);
        out
    }

    /// Serialize one subtree.
    pub fn node_to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Element(element) => {
                let children = self.children(id);
                match &element.end_inner {
                    None if children.is_empty() => {
                        out.push('<');
                        out.push_str(&element.start_inner);
                        out.push_str("/>");
                    }
                    end => {
                        // A self-closing element that gained children is written
                        // with an explicit closing tag.
                        out.push('<');
                        out.push_str(&element.start_inner);
                        out.push('>');
                        for &child in children {
                            self.write_node(child, out);
                        }
                        out.push_str("</");
                        out.push_str(end.as_deref().unwrap_or(element.name.as_str()));
                        out.push('>');
                    }
                }
            }
            NodeKind::Text(text) => out.push_str(&text.raw),
            NodeKind::Markup(raw) => out.push_str(raw),
        }
    }
}
