//! Tracker records
//!
//! These are the records written to and read from the `trackers_*.json`
//! files. Tracker files from older releases carry an extra
//! `_json_type` key on every object; it is ignored when reading.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Item id → summary, as listed on the tracker browse pages
pub type ItemList = IndexMap<u32, String>;

/// The three Savane trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    #[default]
    Bug,
    Task,
    Patch,
}

impl TrackerKind {
    pub const ALL: [TrackerKind; 3] = [TrackerKind::Bug, TrackerKind::Task, TrackerKind::Patch];

    /// URL path segment of the tracker on a Savane instance
    pub fn path(self) -> &'static str {
        match self {
            TrackerKind::Bug => "bugs",
            TrackerKind::Task => "task",
            TrackerKind::Patch => "patch",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            TrackerKind::Bug => "bug",
            TrackerKind::Task => "task",
            TrackerKind::Patch => "patch",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            TrackerKind::Bug => "bugs",
            TrackerKind::Task => "tasks",
            TrackerKind::Patch => "patches",
        }
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// Error returned when a tracker name is not one of bug, task or patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrackerKind(pub String);

impl fmt::Display for UnknownTrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tracker '{}'", self.0)
    }
}

impl std::error::Error for UnknownTrackerKind {}

impl FromStr for TrackerKind {
    type Err = UnknownTrackerKind;

    /// Accepts singular and plural forms, e.g. `bug` and `bugs`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        TrackerKind::ALL
            .into_iter()
            .find(|kind| lower == kind.singular() || lower == kind.plural())
            .ok_or_else(|| UnknownTrackerKind(s.to_string()))
    }
}

/// Whether a record has been pushed to the destination yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    #[default]
    Pending,
    Done,
}

/// A comment, or the original description, of a tracker item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerComment {
    pub author: Option<String>,
    pub time: Option<String>,
    pub text: Option<String>,
    pub migration_status: MigrationStatus,
}

/// A link to a file attached to a tracker item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerAttachment {
    pub text: String,
    pub url: String,
}

/// A tracker item with its description, comments and attachments
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracker {
    /// Singular tracker name, e.g. `bug` or `feature-request`
    #[serde(rename = "type")]
    pub item_type: String,
    pub item_id: u32,
    pub summary: Option<String>,
    pub originator_name: Option<String>,
    pub originator_email: Option<String>,
    pub severity: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<String>,
    pub status_id: Option<String>,
    pub resolution_id: Option<String>,
    pub assigned_to: Option<String>,
    pub programmer_hardware: Option<String>,
    pub device_type: Option<String>,
    pub url: Option<String>,
    pub description: Option<TrackerComment>,
    pub comments: Vec<TrackerComment>,
    pub attachments: Vec<TrackerAttachment>,
    pub migration_id: Option<u64>,
    pub migration_status: MigrationStatus,
}

impl Tracker {
    pub fn new(item_type: &str, item_id: u32) -> Self {
        Self {
            item_type: item_type.to_string(),
            item_id,
            ..Default::default()
        }
    }

    /// Closed items are closed on the destination after export
    pub fn is_closed(&self) -> bool {
        self.status_id.as_deref() == Some("Closed")
    }
}

impl TrackerComment {
    pub fn new(author: Option<String>, time: Option<String>, text: Option<String>) -> Self {
        Self {
            author,
            time,
            text,
            migration_status: MigrationStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_names() {
        assert_eq!(TrackerKind::Bug.path(), "bugs");
        assert_eq!(TrackerKind::Task.path(), "task");
        assert_eq!(TrackerKind::Patch.plural(), "patches");
        assert_eq!(TrackerKind::Patch.to_string(), "patch");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("bugs".parse::<TrackerKind>(), Ok(TrackerKind::Bug));
        assert_eq!("Task".parse::<TrackerKind>(), Ok(TrackerKind::Task));
        assert_eq!("patches".parse::<TrackerKind>(), Ok(TrackerKind::Patch));
        assert!("support".parse::<TrackerKind>().is_err());
    }

    #[test]
    fn test_is_closed() {
        let mut tracker = Tracker::new("bug", 1);
        assert!(!tracker.is_closed());
        tracker.status_id = Some("Closed".to_string());
        assert!(tracker.is_closed());
    }

    #[test]
    fn test_reads_tagged_tracker_file() {
        let json = r#"{
            "_json_type": "Tracker",
            "type": "bug",
            "item_id": 42,
            "summary": "Crash on start",
            "status_id": "Open",
            "resolution_id": "None",
            "url": "https://savannah.nongnu.org/bugs/?42",
            "description": {
                "_json_type": "TrackerComment",
                "author": "Jane",
                "time": "2021-01-02",
                "text": "It crashes."
            },
            "comments": [],
            "attachments": [
                {"_json_type": "TrackerAttachment", "text": "log.txt", "url": "https://x/log.txt"}
            ]
        }"#;

        let tracker: Tracker = serde_json::from_str(json).unwrap();
        assert_eq!(tracker.item_type, "bug");
        assert_eq!(tracker.item_id, 42);
        assert_eq!(tracker.migration_status, MigrationStatus::Pending);
        let description = tracker.description.unwrap();
        assert_eq!(description.author.as_deref(), Some("Jane"));
        assert_eq!(tracker.attachments[0].text, "log.txt");
    }

    #[test]
    fn test_item_list_keeps_order() {
        let list: ItemList = serde_json::from_str(r#"{"3": "c", "1": "a"}"#).unwrap();
        let ids: Vec<u32> = list.keys().copied().collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
