//! Markup node tree consumed by the converter.
//!
//! Any parser (scraper, html5ever, a hand-built fixture) can produce this
//! structure. The converter only needs document-ordered children, a tag name
//! and an attribute map per element.

use indexmap::IndexMap;

/// Ordered attribute map of an element
pub type Attributes = IndexMap<String, String>;

/// An element node: tag name, attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lower-case tag name, e.g. `"blockquote"`
    pub tag_name: String,

    /// Attributes with lower-case names, in source order
    pub attributes: Attributes,

    /// Child nodes
    pub children: Vec<Node>,
}

/// A node of a parsed markup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with children
    Element(Element),
    /// Raw text run, whitespace not yet collapsed
    Text(String),
    /// Comment, never rendered
    Comment(String),
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element {
            tag_name: tag_name.to_lowercase(),
            attributes: Attributes::new(),
            children: Vec::new(),
        })
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let attributes = attrs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();

        Node::Element(Element {
            tag_name: tag_name.to_lowercase(),
            attributes,
            children: Vec::new(),
        })
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Node::Comment(content.to_string())
    }

    /// Builder-style variant of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// The element payload, if any
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get the tag name (lowercase); `None` for text and comments
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.as_element()?.attr(name)
    }

    /// Check whether the `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.as_element().is_some_and(|e| e.has_class(class))
    }

    /// Get all child nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            _ => &[],
        }
    }

    /// Add a child node. Text and comment nodes have no children; the call
    /// is ignored for them.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(element) = self {
            element.children.push(child);
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Comment(_) => String::new(),
            Node::Element(element) => element
                .children
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }
}

impl Element {
    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value.as_str());
        }
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether the whitespace-separated `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}
