//! MarkupConverter - the main entry point for node to Markdown conversion.

use crate::convert::{render, Conversion};
use crate::node::Node;
use crate::Result;

/// Default nesting limit for [`ConvertOptions::max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How list kinds are tracked across nested lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListContext {
    /// One list kind for the whole conversion, overwritten by every `ul`/`ol`
    /// and never restored. Items of an outer list that follow a nested list
    /// of the other kind get the nested list's marker.
    #[default]
    Shared,
    /// A stack of list kinds; nested items are indented under their parent.
    Scoped,
}

/// Options for MarkupConverter
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Prefix used to make relative `href`/`src` targets absolute
    pub base_url: String,

    /// List kind tracking
    pub list_context: ListContext,

    /// Maximum element nesting before conversion gives up; 0 admits text only
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            list_context: ListContext::Shared,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Converts markup node sequences to Markdown.
///
/// The converter holds only options, so one instance can be shared between
/// threads and reused for any number of conversions.
#[derive(Debug, Clone, Default)]
pub struct MarkupConverter {
    options: ConvertOptions,
}

impl MarkupConverter {
    /// Create a MarkupConverter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MarkupConverter with custom options
    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Create a MarkupConverter resolving links against `base_url`
    pub fn for_base_url(base_url: &str) -> Self {
        Self::with_options(ConvertOptions {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Convert the children of a content container to Markdown
    pub fn convert(&self, nodes: &[Node]) -> Result<String> {
        self.convert_with_report(nodes).map(|c| c.markdown)
    }

    /// Convert the children of `container` to Markdown
    pub fn convert_children(&self, container: &Node) -> Result<String> {
        self.convert(container.children())
    }

    /// Convert and also report which tags had no rendering rule
    pub fn convert_with_report(&self, nodes: &[Node]) -> Result<Conversion> {
        render(nodes, &self.options)
    }

    /// Get the current options
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ConvertOptions {
        &mut self.options
    }
}

/// Convert `nodes` to Markdown with default options and the given base URL
pub fn convert(nodes: &[Node], base_url: &str) -> Result<String> {
    MarkupConverter::for_base_url(base_url).convert(nodes)
}
