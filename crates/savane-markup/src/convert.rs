//! Render a markup node tree as Markdown text.
//!
//! The walk is a recursive descent over document-ordered children with a
//! single mutable [`RenderState`] threaded through every call. Inline
//! whitespace is never copied from the source; instead the state remembers
//! whether a space is owed before the next inline token.

use std::collections::BTreeSet;

use tracing::warn;

use crate::node::{Element, Node};
use crate::service::{ConvertOptions, ListContext};
use crate::utilities::{
    absolutize, collapse_whitespace, is_html_whitespace, trim_inline_whitespace_end,
};
use crate::{MarkupError, Result};

/// Marker style for list items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `<ul>`, rendered with `- `
    Unordered,
    /// `<ol>`, rendered with `1. ` for every item
    Ordered,
}

impl ListKind {
    /// Line-leading marker for an item of this list kind
    pub fn marker(self) -> &'static str {
        match self {
            ListKind::Unordered => "- ",
            ListKind::Ordered => "1. ",
        }
    }
}

/// Whitespace owed before the next inline token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Separator {
    /// Block boundary: source whitespace is swallowed
    #[default]
    None,
    /// A space is owed
    Space,
    /// Tight after a token: a space is owed only if the next token starts
    /// with whitespace in the source
    Empty,
}

/// Result of a conversion, including diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversion {
    /// The rendered Markdown, trimmed
    pub markdown: String,
    /// Tags that had no rendering rule and were passed through, sorted
    pub unknown_tags: Vec<String>,
}

/// Render `nodes` with a fresh state
pub(crate) fn render(nodes: &[Node], options: &ConvertOptions) -> Result<Conversion> {
    let mut state = RenderState::new(options);
    state.render_children(nodes)?;
    Ok(state.finish())
}

/// Inline content rendered into its own buffer, plus its whitespace edges
struct Span {
    content: String,
    leading: bool,
    trailing: bool,
}

impl Span {
    fn separator_after(&self) -> Separator {
        if self.trailing {
            Separator::Space
        } else {
            Separator::Empty
        }
    }
}

struct RenderState<'a> {
    options: &'a ConvertOptions,
    output: String,
    separator: Separator,
    /// Enclosing list kinds. Holds at most one entry in shared mode.
    lists: Vec<ListKind>,
    depth: usize,
    /// Nothing but indentation or a list marker on the current line
    fresh_line: bool,
    /// The current buffer started with source whitespace
    leading_whitespace: bool,
    in_emphasis: bool,
    unknown_tags: BTreeSet<String>,
}

impl<'a> RenderState<'a> {
    fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            output: String::new(),
            separator: Separator::None,
            lists: Vec::new(),
            depth: 0,
            fresh_line: true,
            leading_whitespace: false,
            in_emphasis: false,
            unknown_tags: BTreeSet::new(),
        }
    }

    fn finish(self) -> Conversion {
        Conversion {
            markdown: self.output.trim().to_string(),
            unknown_tags: self.unknown_tags.into_iter().collect(),
        }
    }

    fn render_children(&mut self, children: &[Node]) -> Result<()> {
        children.iter().try_for_each(|child| self.render_node(child))
    }

    fn render_node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Element(element) => self.render_element(element),
            Node::Text(text) => {
                self.render_text(text);
                Ok(())
            }
            Node::Comment(_) => Ok(()),
        }
    }

    /// Elements nested deeper than `max_depth` abort the conversion.
    fn render_element(&mut self, element: &Element) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(MarkupError::TooDeeplyNested {
                limit: self.options.max_depth,
            });
        }

        self.depth += 1;
        let result = self.render_tag(element);
        self.depth -= 1;
        result
    }

    fn render_tag(&mut self, element: &Element) -> Result<()> {
        match element.tag_name.as_str() {
            "p" => self.render_paragraph(element),
            "br" => {
                self.line_break();
                Ok(())
            }
            "hr" => {
                self.separator = Separator::None;
                Ok(())
            }
            "blockquote" => self.render_blockquote(element),
            "ul" => self.render_list(ListKind::Unordered, element),
            "ol" => self.render_list(ListKind::Ordered, element),
            "li" => self.render_list_item(element),
            "img" => self.render_image(element),
            "a" => self.render_link(element),
            "em" | "strong" => self.render_emphasis(element),
            tag => {
                if self.unknown_tags.insert(tag.to_string()) {
                    warn!(tag, "Unexpected element tag '{}', keeping its content", tag);
                }
                self.render_children(&element.children)
            }
        }
    }

    fn render_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        let leading = raw.starts_with(is_html_whitespace);
        let trailing = raw.ends_with(is_html_whitespace);
        let trimmed = raw.trim_matches(is_html_whitespace);

        if self.output.is_empty() && self.separator == Separator::None && leading {
            self.leading_whitespace = true;
        }

        if trimmed.is_empty() {
            if self.separator == Separator::Empty {
                self.separator = Separator::Space;
            }
            return;
        }

        self.push_separator(leading);
        self.push_inline(&collapse_whitespace(trimmed));
        self.separator = if trailing {
            Separator::Space
        } else {
            Separator::Empty
        };
    }

    fn render_paragraph(&mut self, element: &Element) -> Result<()> {
        self.begin_line();
        self.render_children(&element.children)?;
        self.line_break();
        Ok(())
    }

    fn render_blockquote(&mut self, element: &Element) -> Result<()> {
        if element.has_class("verbatim") {
            self.begin_line();
            self.output.push_str("```");
            self.line_break();
            self.render_children(&element.children)?;
            self.end_line();
            self.output.push_str("```");
            self.line_break();
        } else {
            self.render_children(&element.children)?;
        }
        self.separator = Separator::None;
        Ok(())
    }

    fn render_list(&mut self, kind: ListKind, element: &Element) -> Result<()> {
        let result = match self.options.list_context {
            ListContext::Shared => {
                self.lists.clear();
                self.lists.push(kind);
                self.render_children(&element.children)
            }
            ListContext::Scoped => {
                self.lists.push(kind);
                let result = self.render_children(&element.children);
                self.lists.pop();
                result
            }
        };
        self.separator = Separator::None;
        result
    }

    fn render_list_item(&mut self, element: &Element) -> Result<()> {
        self.begin_line();

        let (current, enclosing) = match self.lists.split_last() {
            Some((current, enclosing)) => (*current, enclosing),
            None => (ListKind::Unordered, &[][..]),
        };
        for kind in enclosing {
            let width = kind.marker().len();
            self.output.extend(std::iter::repeat(' ').take(width));
        }
        self.output.push_str(current.marker());
        self.fresh_line = true;

        self.render_children(&element.children)?;
        self.end_line();
        Ok(())
    }

    fn render_image(&mut self, element: &Element) -> Result<()> {
        let alt = element.attr("alt").unwrap_or("image");
        let src = absolutize(&self.options.base_url, element.attr("src").unwrap_or(""));

        self.push_separator(false);
        self.push_inline(&format!("![{}]({})", alt, src));
        self.separator = Separator::Empty;
        self.render_children(&element.children)
    }

    fn render_link(&mut self, element: &Element) -> Result<()> {
        let href = element
            .attr("href")
            .map(|href| absolutize(&self.options.base_url, href))
            .unwrap_or_else(|| "#".to_string());

        // Link text must stay on one line
        let span = self.render_span(&element.children)?;
        self.push_separator(span.leading);
        let text = collapse_whitespace(span.content.trim_matches(is_html_whitespace));
        self.push_inline(&format!("[{}]({})", text, href));
        self.separator = span.separator_after();
        Ok(())
    }

    fn render_emphasis(&mut self, element: &Element) -> Result<()> {
        // Markers are not nested; an inner span only contributes its text.
        if self.in_emphasis {
            return self.render_children(&element.children);
        }

        self.in_emphasis = true;
        let span = self.render_span(&element.children);
        self.in_emphasis = false;
        let span = span?;

        let content = collapse_whitespace(span.content.trim_matches(is_html_whitespace));
        if content.is_empty() {
            if (span.leading || span.trailing) && self.separator == Separator::Empty {
                self.separator = Separator::Space;
            }
            return Ok(());
        }

        self.push_separator(span.leading);
        self.push_inline(&format!("**{}**", content));
        self.separator = span.separator_after();
        Ok(())
    }

    /// Render `children` into a separate buffer, starting at a boundary.
    fn render_span(&mut self, children: &[Node]) -> Result<Span> {
        let output = std::mem::take(&mut self.output);
        let separator = std::mem::replace(&mut self.separator, Separator::None);
        let fresh_line = std::mem::replace(&mut self.fresh_line, true);
        let leading = std::mem::replace(&mut self.leading_whitespace, false);

        let result = self.render_children(children);

        let span = Span {
            content: std::mem::replace(&mut self.output, output),
            leading: std::mem::replace(&mut self.leading_whitespace, leading),
            trailing: self.separator == Separator::Space,
        };
        self.separator = separator;
        self.fresh_line = fresh_line;

        result.map(|()| span)
    }

    fn push_separator(&mut self, leading: bool) {
        let owed = match self.separator {
            Separator::Space => true,
            Separator::Empty => leading,
            Separator::None => false,
        };
        if owed {
            self.output.push(' ');
        }
    }

    fn push_inline(&mut self, text: &str) {
        self.output.push_str(text);
        self.fresh_line = false;
    }

    /// Forced line break: always emits a newline.
    fn line_break(&mut self) {
        trim_inline_whitespace_end(&mut self.output);
        self.output.push('\n');
        self.fresh_line = true;
        self.separator = Separator::None;
    }

    /// Close the current line unless it is already closed.
    fn end_line(&mut self) {
        trim_inline_whitespace_end(&mut self.output);
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.fresh_line = true;
        self.separator = Separator::None;
    }

    /// Make sure block content starts on its own line. A line holding only a
    /// list marker counts as fresh.
    fn begin_line(&mut self) {
        if !self.fresh_line {
            self.end_line();
        }
        self.separator = Separator::None;
    }
}
