//! Files kept in the project directory between migration steps.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use savane_core::{ItemList, Tracker, TrackerKind};

/// The directory holding one project's lists, pages and tracker files
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    /// Open the store at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory '{}'", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list_path(&self, kind: TrackerKind) -> PathBuf {
        self.root.join(format!("list_{}.json", kind.plural()))
    }

    pub fn page_path(&self, kind: TrackerKind, item_id: u32) -> PathBuf {
        self.root
            .join(format!("page_{}_{}.html", kind.singular(), item_id))
    }

    /// Tracker file for a plural tracker name, e.g. `bugs`
    pub fn trackers_path(&self, plural: &str) -> PathBuf {
        self.root.join(format!("trackers_{}.json", plural))
    }

    pub fn read_item_list(&self, kind: TrackerKind) -> Result<ItemList> {
        read_json(&self.list_path(kind))
    }

    /// Write the item list sorted by id
    pub fn write_item_list(&self, kind: TrackerKind, items: &ItemList) -> Result<()> {
        let mut sorted = items.clone();
        sorted.sort_keys();
        write_json(&self.list_path(kind), &sorted)
    }

    pub fn has_page(&self, kind: TrackerKind, item_id: u32) -> bool {
        self.page_path(kind, item_id).is_file()
    }

    pub fn read_page(&self, kind: TrackerKind, item_id: u32) -> Result<String> {
        let path = self.page_path(kind, item_id);
        info!("Reading page '{}'...", path.display());
        fs::read_to_string(&path).with_context(|| format!("Failed to read '{}'", path.display()))
    }

    pub fn write_page(&self, kind: TrackerKind, item_id: u32, html: &str) -> Result<()> {
        let path = self.page_path(kind, item_id);
        fs::write(&path, html).with_context(|| format!("Failed to write '{}'", path.display()))
    }

    pub fn read_trackers(&self, plural: &str) -> Result<Vec<Tracker>> {
        read_json(&self.trackers_path(plural))
    }

    pub fn write_trackers(&self, plural: &str, trackers: &[Tracker]) -> Result<()> {
        write_json(&self.trackers_path(plural), trackers)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Reading '{}'...", path.display());
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    info!("Writing '{}'...", path.display());
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write '{}'", path.display()))
}
