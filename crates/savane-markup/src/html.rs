//! HTML parsing support.
//!
//! This module converts `scraper` trees into the [`Node`] structure used by
//! the converter, so a page can be scraped with CSS selectors and the
//! children of any element handed to [`crate::convert`].

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;
use crate::service::{convert, DEFAULT_MAX_DEPTH};
use crate::{MarkupError, Result};

/// Parse an HTML fragment into the sequence of its top-level nodes.
///
/// Elements nested deeper than [`DEFAULT_MAX_DEPTH`] are rejected with
/// [`MarkupError::TooDeeplyNested`].
///
/// # Example
///
/// ```rust
/// use savane_markup::{convert, parse_fragment};
///
/// let nodes = parse_fragment("<p>Hello <em>World</em></p>").unwrap();
/// assert_eq!(convert(&nodes, "").unwrap(), "Hello **World**");
/// ```
pub fn parse_fragment(html: &str) -> Result<Vec<Node>> {
    let document = Html::parse_fragment(html);
    child_nodes(document.root_element())
}

/// Parse an HTML fragment and convert it to Markdown in one step
pub fn convert_html(html: &str, base_url: &str) -> Result<String> {
    convert(&parse_fragment(html)?, base_url)
}

/// Convert a scraper ElementRef to our Node structure
pub fn from_element(element: ElementRef) -> Result<Node> {
    element_at(element, 0)
}

/// Convert the children of a scraper element, in document order
pub fn child_nodes(element: ElementRef) -> Result<Vec<Node>> {
    children_at(element, 0)
}

fn element_at(element: ElementRef, depth: usize) -> Result<Node> {
    if depth >= DEFAULT_MAX_DEPTH {
        return Err(MarkupError::TooDeeplyNested {
            limit: DEFAULT_MAX_DEPTH,
        });
    }

    let tag = element.value().name();
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();

    let mut node = Node::element_with_attrs(tag, attrs);
    for child in children_at(element, depth + 1)? {
        node.add_child(child);
    }
    Ok(node)
}

/// `depth` counts the elements enclosing `element`'s children
fn children_at(element: ElementRef, depth: usize) -> Result<Vec<Node>> {
    element
        .children()
        .filter_map(|child| match child.value() {
            ScraperNode::Text(text) => Some(Ok(Node::text(&text.text))),
            ScraperNode::Comment(comment) => Some(Ok(Node::comment(&comment.comment))),
            ScraperNode::Element(_) => ElementRef::wrap(child).map(|e| element_at(e, depth)),
            _ => None,
        })
        .collect()
}
