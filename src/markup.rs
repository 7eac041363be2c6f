//! Inline node tree produced by view evaluation, and its HTML serialization.
//!
//! Text nodes hold raw (unescaped) text; escaping happens exactly once, when
//! the tree is written out. Elements can only be built from the fixed
//! [`InlineTag`] vocabulary, so feed data never turns into markup.

use std::fmt::Write as _;

use crate::escape::push_encoded;

/// The only tags a view can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InlineTag {
    Span,
    Strong,
    Em,
    I,
    B,
    Time,
    Abbr,
    /// Hyperlinks are only created by the URL post-processor.
    A,
}

impl InlineTag {
    pub fn name(self) -> &'static str {
        match self {
            InlineTag::Span => "span",
            InlineTag::Strong => "strong",
            InlineTag::Em => "em",
            InlineTag::I => "i",
            InlineTag::B => "b",
            InlineTag::Time => "time",
            InlineTag::Abbr => "abbr",
            InlineTag::A => "a",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: InlineTag,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: InlineTag) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn empty() -> Self {
        Node::Text(String::new())
    }

    /// Concatenated text of this node and its descendants, like DOM `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.is_empty())
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => push_encoded(out, text),
            Node::Element(element) => {
                let name = element.tag.name();
                let _ = write!(out, "<{name}");
                for (key, value) in &element.attrs {
                    let _ = write!(out, " {key}=\"");
                    push_encoded(out, value);
                    out.push('"');
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{name}>");
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

/// One rendered line of a view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub nodes: Vec<Node>,
}

impl Paragraph {
    pub fn push(&mut self, node: Node) {
        if !node.is_empty_text() {
            self.nodes.push(node);
        }
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    pub fn write_html(&self, out: &mut String) {
        out.push_str("<p>");
        for node in &self.nodes {
            node.write_html(out);
        }
        out.push_str("</p>");
    }
}

/// All paragraphs rendered for one calendar event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Article {
    pub paragraphs: Vec<Paragraph>,
}

impl Article {
    pub fn write_html(&self, out: &mut String) {
        out.push_str("<article>");
        for paragraph in &self.paragraphs {
            paragraph.write_html(out);
        }
        out.push_str("</article>");
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}
