//! The migration steps behind each subcommand.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use savane_core::{
    issue_body, issue_title, labels_for_resolution, ItemList, MigrationStatus, Tracker,
    TrackerKind,
};
use savane_import::{
    import_sourceforge, item_page_url, list_page_url, parse_item_page, parse_list_page,
    LIST_CHUNK_SIZE,
};
use savane_markup::{parse_fragment, ConvertOptions, ListContext, MarkupConverter};

use crate::github::IssueTracker;
use crate::http::SavaneSession;
use crate::store::ProjectStore;

/// Anything that can fetch a page by URL
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl PageSource for SavaneSession {
    fn fetch(&self, url: &str) -> Result<String> {
        self.get(url)
    }
}

/// Walk the browse pages of a tracker and write the item list.
pub fn list_tracker(
    source: &dyn PageSource,
    store: &ProjectStore,
    instance: &str,
    project: &str,
    kind: TrackerKind,
) -> Result<ItemList> {
    info!("Browsing {} at '{}/projects/{}'...", kind.plural(), instance, project);

    let mut items = ItemList::new();
    let mut offset = 0;
    loop {
        let url = list_page_url(instance, project, kind, offset);
        let rows = parse_list_page(&source.fetch(&url)?);
        if rows.is_empty() {
            break;
        }

        let before = items.len();
        items.extend(rows);
        if items.len() == before {
            // The instance keeps serving the last page
            break;
        }
        offset += LIST_CHUNK_SIZE;
    }

    info!("Found {} {}", items.len(), kind.plural());
    store.write_item_list(kind, &items)?;
    Ok(items)
}

/// Download every listed page that is not cached yet. Returns the number of
/// pages fetched.
pub fn download_tracker(
    source: &dyn PageSource,
    store: &ProjectStore,
    instance: &str,
    kind: TrackerKind,
) -> Result<usize> {
    let items = store.read_item_list(kind)?;
    info!("Downloading {} from '{}'...", kind.plural(), instance);

    let mut fetched = 0;
    for &item_id in items.keys() {
        if store.has_page(kind, item_id) {
            debug!("Page for {} #{} exists, skipping...", kind, item_id);
            continue;
        }

        let url = item_page_url(instance, kind, item_id);
        info!("Loading page '{}'...", url);
        let html = source.fetch(&url)?;
        store.write_page(kind, item_id, &html)?;
        fetched += 1;
    }
    Ok(fetched)
}

/// Parse the downloaded pages into the tracker file
pub fn import_tracker(
    store: &ProjectStore,
    instance: &str,
    kind: TrackerKind,
) -> Result<Vec<Tracker>> {
    let items = store.read_item_list(kind)?;

    let mut trackers = Vec::with_capacity(items.len());
    for &item_id in items.keys() {
        if !store.has_page(kind, item_id) {
            warn!(
                "Page '{}' missing, skipping...",
                store.page_path(kind, item_id).display()
            );
            continue;
        }

        let html = store.read_page(kind, item_id)?;
        let tracker = parse_item_page(instance, kind, &html)
            .with_context(|| format!("Failed to parse {} #{}", kind, item_id))?;
        trackers.push(tracker);
    }

    store.write_trackers(kind.plural(), &trackers)?;
    Ok(trackers)
}

/// Convert a SourceForge tracker export. The tracker file is named after the
/// export file, so `bugs.json` becomes `trackers_bugs.json`.
pub fn import_sourceforge_export(store: &ProjectStore, export: &Path) -> Result<Vec<Tracker>> {
    let plural = export
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("Invalid export file name '{}'", export.display()))?;

    info!("Reading '{}'...", export.display());
    let json = fs::read_to_string(export)
        .with_context(|| format!("Failed to read '{}'", export.display()))?;
    let trackers = import_sourceforge(&json)
        .with_context(|| format!("Failed to import '{}'", export.display()))?;

    store.write_trackers(plural, &trackers)?;
    Ok(trackers)
}

/// Print trackers and their comments
pub fn dump_trackers(trackers: &[Tracker], out: &mut dyn Write) -> Result<()> {
    for tracker in trackers {
        writeln!(out, "======")?;
        writeln!(out, "{}", tracker)?;
        for comment in &tracker.comments {
            writeln!(out, "------")?;
            writeln!(out, "{}", comment)?;
        }
    }
    Ok(())
}

/// Totals of one export run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub issues: usize,
    pub comments: usize,
    pub closed: usize,
    pub skipped: usize,
}

/// Export a tracker file.
///
/// Without a destination this is a dry run that only prints what would be
/// sent. Otherwise migration state is recorded on each tracker and the
/// file is saved after every item, so an interrupted run can be resumed
/// without creating duplicates.
pub fn export_tracker(
    store: &ProjectStore,
    plural: &str,
    mut destination: Option<&mut dyn IssueTracker>,
    out: &mut dyn Write,
) -> Result<ExportSummary> {
    let mut trackers = store.read_trackers(plural)?;
    let mut summary = ExportSummary::default();

    for index in 0..trackers.len() {
        let tracker = &mut trackers[index];
        if destination.is_some() && tracker.migration_status == MigrationStatus::Done {
            debug!("{} #{} already exported, skipping...", tracker.item_type, tracker.item_id);
            summary.skipped += 1;
            continue;
        }

        let result = export_one(tracker, destination.as_deref_mut(), out, &mut summary);

        // Save even on failure so a created issue is reused next time
        if destination.is_some() {
            store.write_trackers(plural, &trackers)?;
        }
        result?;
    }

    info!(
        "Exported {} issues with {} comments, {} closed, {} skipped",
        summary.issues, summary.comments, summary.closed, summary.skipped
    );
    Ok(summary)
}

fn export_one(
    tracker: &mut Tracker,
    mut destination: Option<&mut (dyn IssueTracker + '_)>,
    out: &mut dyn Write,
    summary: &mut ExportSummary,
) -> Result<()> {
    let title = issue_title(tracker);
    let body = issue_body(tracker);
    let labels: Vec<&str> = labels_for_resolution(tracker.resolution_id.as_deref())
        .into_iter()
        .map(|label| label.as_str())
        .collect();

    writeln!(out, "======")?;
    writeln!(out, "{}", title)?;
    writeln!(out, "======")?;
    writeln!(out, "{}", body)?;
    writeln!(out, "!Labels [{}]", labels.join(", "))?;

    let issue = match (destination.as_deref_mut(), tracker.migration_id) {
        (Some(_), Some(number)) => Some(number),
        (Some(github), None) => {
            let number = github.create_issue(&title, &body, &labels)?;
            tracker.migration_id = Some(number);
            Some(number)
        }
        (None, _) => None,
    };
    summary.issues += 1;

    for comment in &mut tracker.comments {
        if issue.is_some() && comment.migration_status == MigrationStatus::Done {
            continue;
        }
        writeln!(out, "------")?;
        writeln!(out, "{}", comment)?;
        if let (Some(github), Some(number)) = (destination.as_deref_mut(), issue) {
            github.create_comment(number, &comment.to_string())?;
            comment.migration_status = MigrationStatus::Done;
        }
        summary.comments += 1;
    }

    if tracker.is_closed() {
        writeln!(out, "!Closed")?;
        if let (Some(github), Some(number)) = (destination.as_deref_mut(), issue) {
            github.close_issue(number)?;
        }
        summary.closed += 1;
    }

    if issue.is_some() {
        tracker.migration_status = MigrationStatus::Done;
    }
    Ok(())
}

/// Convert an HTML fragment file and return the Markdown
pub fn convert_file(path: &Path, base_url: &str, scoped_lists: bool) -> Result<String> {
    let html =
        fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))?;

    let converter = MarkupConverter::with_options(ConvertOptions {
        base_url: base_url.to_string(),
        list_context: if scoped_lists {
            ListContext::Scoped
        } else {
            ListContext::Shared
        },
        ..Default::default()
    });
    let conversion = converter.convert_with_report(&parse_fragment(&html)?)?;
    if !conversion.unknown_tags.is_empty() {
        warn!("Passed through unknown tags: {}", conversion.unknown_tags.join(", "));
    }
    Ok(conversion.markdown)
}
