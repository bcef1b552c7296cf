//! Plain-text rendering of tracker records
//!
//! `Display` output is used for dumps; [`issue_title`] and [`issue_body`]
//! build the text of the issue created on the destination.

use std::fmt;

use crate::model::{Tracker, TrackerAttachment, TrackerComment};

impl fmt::Display for TrackerComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if let Some(author) = non_empty(&self.author) {
            out.push_str(author);
            out.push('\n');
        }
        if let Some(time) = non_empty(&self.time) {
            out.push_str(time);
            out.push('\n');
        }
        if let Some(text) = non_empty(&self.text) {
            out.push('\n');
            out.push_str(text);
            out.push('\n');
        }
        f.write_str(out.trim())
    }
}

impl fmt::Display for TrackerAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]({})", self.text, self.url)
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("Summary", &self.summary),
            ("Originator Name", &self.originator_name),
            ("Originator Email", &self.originator_email),
            ("Severity", &self.severity),
            ("Priority", &self.priority),
            ("Category ID", &self.category_id),
            ("Status", &self.status_id),
            ("Resolution", &self.resolution_id),
            ("Assigned to", &self.assigned_to),
            ("Programmer hardware", &self.programmer_hardware),
            ("Device type", &self.device_type),
        ];

        let mut out = String::new();
        for (name, value) in fields {
            if let Some(value) = non_empty(value) {
                out.push_str(&format!("{}: {}\n", name, value));
            }
        }

        if let Some(text) = self.description.as_ref().and_then(|d| non_empty(&d.text)) {
            out.push_str(&format!("\n{}\n\n", text));
        }

        for attachment in &self.attachments {
            out.push_str(&format!("{}\n", attachment));
        }

        f.write_str(out.trim())
    }
}

/// Title of the destination issue, e.g. `[bug #42] Crash on start`
pub fn issue_title(tracker: &Tracker) -> String {
    format!(
        "[{} #{}] {}",
        tracker.item_type,
        tracker.item_id,
        tracker.summary.as_deref().unwrap_or_default()
    )
}

/// Body of the destination issue: header lines, description, attachment
/// links and a pointer back to the original item.
pub fn issue_body(tracker: &Tracker) -> String {
    let mut body = String::new();

    if let Some(name) = non_empty(&tracker.originator_name) {
        match non_empty(&tracker.originator_email) {
            Some(email) => body.push_str(&format!("{} <{}>\n", name, email)),
            None => body.push_str(&format!("{}\n", name)),
        }
    }
    if let Some(time) = tracker.description.as_ref().and_then(|d| non_empty(&d.time)) {
        body.push_str(&format!("{}\n", time));
    }
    if let Some(hardware) = non_empty(&tracker.programmer_hardware) {
        body.push_str(&format!("Programmer hardware: {}\n", hardware));
    }
    if let Some(device) = non_empty(&tracker.device_type) {
        body.push_str(&format!("Device type: {}\n", device));
    }

    let description = tracker
        .description
        .as_ref()
        .and_then(|d| non_empty(&d.text))
        .unwrap_or_default();
    body.push_str(&format!("\n{}\n", description));

    if !tracker.attachments.is_empty() {
        body.push('\n');
        for attachment in &tracker.attachments {
            body.push_str(&format!("{}\n", attachment));
        }
    }

    if let Some(url) = non_empty(&tracker.url) {
        body.push_str(&format!("\nThis issue was migrated from {}", url));
    }

    body
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackerKind;
    use pretty_assertions::assert_eq;

    fn sample() -> Tracker {
        let mut tracker = Tracker::new(TrackerKind::Bug.singular(), 42);
        tracker.summary = Some("Crash on start".to_string());
        tracker.originator_name = Some("Jane Doe".to_string());
        tracker.originator_email = Some("jane@example.org".to_string());
        tracker.status_id = Some("Open".to_string());
        tracker.programmer_hardware = Some("USBasp".to_string());
        tracker.url = Some("https://savannah.nongnu.org/bugs/?42".to_string());
        tracker.description = Some(TrackerComment::new(
            Some("Jane Doe".to_string()),
            Some("Mon 04 Jan 2021".to_string()),
            Some("It **crashes**.".to_string()),
        ));
        tracker.attachments.push(TrackerAttachment {
            text: "log.txt".to_string(),
            url: "https://savannah.nongnu.org/bugs/download.php?file_id=1".to_string(),
        });
        tracker
    }

    #[test]
    fn test_comment_display() {
        let comment = TrackerComment::new(
            Some("joerg".to_string()),
            Some("Tue 05 Jan 2021".to_string()),
            Some("Fixed in r123.".to_string()),
        );
        assert_eq!(comment.to_string(), "joerg\nTue 05 Jan 2021\n\nFixed in r123.");
    }

    #[test]
    fn test_comment_display_without_author() {
        let comment = TrackerComment::new(None, None, Some("text".to_string()));
        assert_eq!(comment.to_string(), "text");
    }

    #[test]
    fn test_attachment_display() {
        let attachment = TrackerAttachment {
            text: "patch.diff".to_string(),
            url: "https://x/patch.diff".to_string(),
        };
        assert_eq!(attachment.to_string(), "[patch.diff](https://x/patch.diff)");
    }

    #[test]
    fn test_tracker_display() {
        assert_eq!(
            sample().to_string(),
            "Summary: Crash on start\n\
             Originator Name: Jane Doe\n\
             Originator Email: jane@example.org\n\
             Status: Open\n\
             Programmer hardware: USBasp\n\
             \n\
             It **crashes**.\n\
             \n\
             [log.txt](https://savannah.nongnu.org/bugs/download.php?file_id=1)"
        );
    }

    #[test]
    fn test_issue_title() {
        assert_eq!(issue_title(&sample()), "[bug #42] Crash on start");
    }

    #[test]
    fn test_issue_body() {
        assert_eq!(
            issue_body(&sample()),
            "Jane Doe <jane@example.org>\n\
             Mon 04 Jan 2021\n\
             Programmer hardware: USBasp\n\
             \n\
             It **crashes**.\n\
             \n\
             [log.txt](https://savannah.nongnu.org/bugs/download.php?file_id=1)\n\
             \n\
             This issue was migrated from https://savannah.nongnu.org/bugs/?42"
        );
    }

    #[test]
    fn test_issue_body_without_description() {
        let tracker = Tracker::new(TrackerKind::Task.singular(), 7);
        assert_eq!(issue_body(&tracker), "\n\n");
    }
}
