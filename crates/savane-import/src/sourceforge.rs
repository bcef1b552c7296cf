//! SourceForge project export import.
//!
//! A project export holds one JSON file per tracker (`bugs.json`,
//! `feature-requests.json`, ...). Ticket text is already Markdown, but
//! SourceForge escapes characters that need no escaping.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use savane_core::{map_sourceforge_status, Tracker, TrackerAttachment, TrackerComment};

use crate::Result;

const SOURCEFORGE_URL: &str = "https://sourceforge.net";

static ESCAPED_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([-+*_{}()])").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct Export {
    tracker_config: TrackerConfig,
    #[serde(default)]
    tickets: Vec<Ticket>,
}

#[derive(Debug, Deserialize)]
struct TrackerConfig {
    options: TrackerOptions,
}

#[derive(Debug, Deserialize)]
struct TrackerOptions {
    /// Project-relative tracker path, e.g. `/p/avrdude/bugs/`
    url: String,
    mount_point: String,
}

#[derive(Debug, Deserialize)]
struct Ticket {
    ticket_num: u32,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: String,
    reported_by: Option<String>,
    created_date: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    discussion_thread: DiscussionThread,
}

#[derive(Debug, Default, Deserialize)]
struct DiscussionThread {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    text: String,
    author: Option<String>,
    timestamp: Option<String>,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    path: String,
    url: String,
}

/// Convert one SourceForge tracker export into tracker records
pub fn import_sourceforge(json: &str) -> Result<Vec<Tracker>> {
    let export: Export = serde_json::from_str(json)?;
    let options = &export.tracker_config.options;
    let url_base = format!("{}{}", SOURCEFORGE_URL, options.url);
    let item_type = singularize(&options.mount_point);

    info!(
        tracker = %options.mount_point,
        tickets = export.tickets.len(),
        "Importing SourceForge tracker"
    );

    let trackers = export
        .tickets
        .into_iter()
        .map(|ticket| convert_ticket(ticket, &item_type, &url_base))
        .collect();
    Ok(trackers)
}

fn convert_ticket(ticket: Ticket, item_type: &str, url_base: &str) -> Tracker {
    let status = map_sourceforge_status(&ticket.status);

    let mut tracker = Tracker::new(item_type, ticket.ticket_num);
    tracker.url = Some(format!("{}{}/", url_base, ticket.ticket_num));
    tracker.summary = Some(cleanup(&ticket.summary));
    tracker.status_id = Some(status.status.to_string());
    tracker.resolution_id = Some(status.resolution.to_string());
    tracker.originator_name = ticket.reported_by;
    tracker.description = Some(TrackerComment::new(
        None,
        ticket.created_date,
        Some(cleanup(&ticket.description)),
    ));

    for post in ticket.discussion_thread.posts {
        if !post.text.is_empty() {
            let text = cleanup(&post.text);
            tracker
                .comments
                .push(TrackerComment::new(post.author, post.timestamp, Some(text)));
        }
        tracker
            .attachments
            .extend(post.attachments.into_iter().map(|attachment| TrackerAttachment {
                text: file_name(&attachment.path).to_string(),
                url: attachment.url,
            }));
    }

    debug!(
        item_id = tracker.item_id,
        comments = tracker.comments.len(),
        attachments = tracker.attachments.len(),
        "Converted ticket"
    );
    tracker
}

/// Singular form of a tracker mount point, e.g. `patches` → `patch`
pub fn singularize(mount_point: &str) -> String {
    for suffix in ["ches", "shes", "xes", "sses"] {
        if mount_point.ends_with(suffix) {
            return mount_point[..mount_point.len() - 2].to_string();
        }
    }
    mount_point
        .strip_suffix('s')
        .unwrap_or(mount_point)
        .to_string()
}

/// Undo SourceForge's HTML entity and Markdown punctuation escaping
pub fn cleanup(text: &str) -> String {
    let text = text.replace("&lt;", "<").replace("&gt;", ">");
    ESCAPED_PUNCTUATION.replace_all(&text, "$1").into_owned()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
