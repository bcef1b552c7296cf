//! savane-core - tracker records and issue text
//!
//! This crate holds the data shared by the importers and the exporter of the
//! migration tool. It has no knowledge of HTML or HTTP.
//!
//! # Architecture
//!
//! ```text
//! Savane item pages ──scrape──▶ ┌──────────┐
//!                               │          │ ──▶ trackers_*.json
//!                               │ Tracker  │
//! SourceForge export ─────────▶ │          │ ──▶ GitHub issue title/body/labels
//!                               └──────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use savane_core::{issue_title, Tracker, TrackerKind};
//!
//! let mut tracker = Tracker::new(TrackerKind::Bug.singular(), 42);
//! tracker.summary = Some("Crash on start".to_string());
//!
//! assert_eq!(issue_title(&tracker), "[bug #42] Crash on start");
//! ```

mod model;
mod render;
mod status;

pub use model::{
    ItemList, MigrationStatus, Tracker, TrackerAttachment, TrackerComment, TrackerKind,
    UnknownTrackerKind,
};
pub use render::{issue_body, issue_title};
pub use status::{labels_for_resolution, map_sourceforge_status, Label, StatusMapping};
