//! # savane-markup
//!
//! Convert the markup of scraped issue-tracker pages to Markdown.
//!
//! Savane renders comment bodies as a small HTML vocabulary: paragraphs,
//! line breaks, lists, links, emphasis and `blockquote.verbatim` blocks.
//! This crate walks a parsed [`Node`] tree of such markup and produces
//! Markdown that can be posted as an issue or comment on another platform.
//!
//! ## Design
//!
//! The converter accepts a parser-agnostic node tree. With the default
//! `html` feature, [`parse_fragment`] builds that tree with `scraper`.
//!
//! - Every relative link and image target is resolved against a base URL.
//! - Source whitespace is collapsed the way a browser would: at most one
//!   space between inline tokens, none where the markup was tight.
//! - Unknown tags never lose content; they are logged and passed through.
//!
//! ## Example
//!
//! ```rust
//! use savane_markup::{convert, Node};
//!
//! let mut p = Node::element("p");
//! p.add_child(Node::text("See "));
//! let mut a = Node::element_with_attrs("a", vec![("href", "/bugs/?42")]);
//! a.add_child(Node::text("bug #42"));
//! p.add_child(a);
//!
//! let markdown = convert(&[p], "https://savannah.nongnu.org").unwrap();
//! assert_eq!(markdown, "See [bug #42](https://savannah.nongnu.org/bugs/?42)");
//! ```

mod convert;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod service;
mod utilities;

pub use convert::{Conversion, ListKind};
#[cfg(feature = "html")]
pub use html::{convert_html, from_element, parse_fragment};
pub use node::{Attributes, Element, Node};
pub use service::{convert, ConvertOptions, ListContext, MarkupConverter, DEFAULT_MAX_DEPTH};
pub use utilities::{absolutize, collapse_whitespace};

/// Error type for markup conversion
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Input too deeply nested (limit {limit})")]
    TooDeeplyNested { limit: usize },
}

pub type Result<T> = std::result::Result<T, MarkupError>;
