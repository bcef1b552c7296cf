//! Status and resolution vocabularies
//!
//! SourceForge tickets carry a single status word; Savane splits it into a
//! status and a resolution. GitHub has neither, so resolutions become labels.

/// Savane status/resolution pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub status: &'static str,
    pub resolution: &'static str,
}

impl StatusMapping {
    const fn new(status: &'static str, resolution: &'static str) -> Self {
        Self { status, resolution }
    }
}

/// Map a SourceForge ticket status to a Savane status and resolution.
///
/// Unknown statuses map to an open item without resolution.
pub fn map_sourceforge_status(status: &str) -> StatusMapping {
    match status {
        "closed" | "closed-fixed" => StatusMapping::new("Closed", "Fixed"),
        "wont-fix" | "closed-wont-fix" => StatusMapping::new("Closed", "Wont Fix"),
        "closed-invalid" => StatusMapping::new("Closed", "Invalid"),
        "closed-works-for-me" => StatusMapping::new("Closed", "Works For Me"),
        "closed-duplicate" => StatusMapping::new("Closed", "Duplicate"),
        "pending" => StatusMapping::new("Open", "In Progress"),
        _ => StatusMapping::new("Open", "None"),
    }
}

/// GitHub labels used for migrated issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Bug,
    Question,
    Wontfix,
    Invalid,
    Duplicate,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Bug,
        Label::Question,
        Label::Wontfix,
        Label::Invalid,
        Label::Duplicate,
    ];

    /// Name of the label on GitHub
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Bug => "bug",
            Label::Question => "question",
            Label::Wontfix => "wontfix",
            Label::Invalid => "invalid",
            Label::Duplicate => "duplicate",
        }
    }
}

/// Labels for a Savane resolution
pub fn labels_for_resolution(resolution: Option<&str>) -> Vec<Label> {
    let label = match resolution {
        Some("Need Info") => Label::Question,
        Some("Confirmed" | "Fixed" | "In Progress") => Label::Bug,
        Some("Wont Fix") => Label::Wontfix,
        Some("Works For Me" | "Invalid") => Label::Invalid,
        Some("Duplicate") => Label::Duplicate,
        _ => return Vec::new(),
    };
    vec![label]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sourceforge_closed_statuses() {
        assert_eq!(map_sourceforge_status("closed"), StatusMapping::new("Closed", "Fixed"));
        assert_eq!(
            map_sourceforge_status("closed-wont-fix"),
            StatusMapping::new("Closed", "Wont Fix")
        );
        assert_eq!(
            map_sourceforge_status("wont-fix"),
            StatusMapping::new("Closed", "Wont Fix")
        );
        assert_eq!(
            map_sourceforge_status("closed-works-for-me").resolution,
            "Works For Me"
        );
        assert_eq!(map_sourceforge_status("closed-duplicate").resolution, "Duplicate");
    }

    #[test]
    fn test_sourceforge_open_statuses() {
        for status in ["open", "unread", "accepted", "something-new"] {
            assert_eq!(map_sourceforge_status(status), StatusMapping::new("Open", "None"));
        }
        assert_eq!(
            map_sourceforge_status("pending"),
            StatusMapping::new("Open", "In Progress")
        );
    }

    #[test]
    fn test_labels_for_resolution() {
        assert_eq!(labels_for_resolution(Some("Need Info")), vec![Label::Question]);
        assert_eq!(labels_for_resolution(Some("In Progress")), vec![Label::Bug]);
        assert_eq!(labels_for_resolution(Some("Works For Me")), vec![Label::Invalid]);
        assert_eq!(labels_for_resolution(Some("Duplicate")), vec![Label::Duplicate]);
        assert!(labels_for_resolution(Some("None")).is_empty());
        assert!(labels_for_resolution(None).is_empty());
    }

    #[test]
    fn test_label_names() {
        let names: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["bug", "question", "wontfix", "invalid", "duplicate"]);
    }
}
