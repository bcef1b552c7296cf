//! # savane-import
//!
//! Turn tracker data into [`savane_core::Tracker`] records.
//!
//! Two sources are supported:
//!
//! - Savane web pages: the paged browse listing ([`parse_list_page`]) and
//!   individual item pages ([`parse_item_page`]). Comment bodies are
//!   converted to Markdown with `savane-markup`.
//! - SourceForge project exports ([`import_sourceforge`]), whose ticket text
//!   is already Markdown.

mod page;
mod sourceforge;

pub use page::{item_page_url, list_page_url, parse_item_page, parse_list_page, LIST_CHUNK_SIZE};
pub use sourceforge::{cleanup, import_sourceforge, singularize};

use savane_markup::MarkupError;

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Item form not found on page")]
    MissingForm,

    #[error("Required field '{0}' not found on page")]
    MissingField(&'static str),

    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Markup conversion failed: {0}")]
    Markup(#[from] MarkupError),

    #[error("Invalid SourceForge export: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
