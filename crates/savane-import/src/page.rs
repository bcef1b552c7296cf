//! Savane tracker page scraping.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node as ScraperNode, Selector};
use tracing::{debug, warn};

use savane_core::{Tracker, TrackerAttachment, TrackerComment, TrackerKind};
use savane_markup::html::child_nodes;
use savane_markup::{absolutize, MarkupConverter};

use crate::{ImportError, Result};

/// Rows requested per browse page
pub const LIST_CHUNK_SIZE: usize = 50;

static BROWSE_TABLE: Lazy<Selector> = Lazy::new(|| selector("table.box"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static ITEM_FORM: Lazy<Selector> = Lazy::new(|| selector(r#"form[name="item_form"]"#));
static INPUT: Lazy<Selector> = Lazy::new(|| selector("input"));
static SELECT: Lazy<Selector> = Lazy::new(|| selector("select"));
static OPTION: Lazy<Selector> = Lazy::new(|| selector("option"));
static DISCUSSION: Lazy<Selector> = Lazy::new(|| selector("div#hidsubpartcontentdiscussion"));
static TRACKER_COMMENT: Lazy<Selector> = Lazy::new(|| selector("div.tracker_comment"));
static ATTACHED: Lazy<Selector> = Lazy::new(|| selector("div#hidsubpartcontentattached"));

/// `?123` style item links on browse pages
static ITEM_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?(\d+)").expect("valid regex"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// URL of one browse page listing items of every status
pub fn list_page_url(instance: &str, project: &str, kind: TrackerKind, offset: usize) -> String {
    format!(
        "{}/{}/?group={}&func=browse&set=custom&status_id=0&offset={}&chunksz={}#results",
        instance,
        kind.path(),
        project,
        offset,
        LIST_CHUNK_SIZE
    )
}

/// URL of a single item page
pub fn item_page_url(instance: &str, kind: TrackerKind, item_id: u32) -> String {
    format!("{}/{}/?{}", instance, kind.path(), item_id)
}

/// Parse a browse page into `(item id, summary)` pairs.
///
/// An empty result means the listing is exhausted: either the results table
/// is missing or it holds only its header row.
pub fn parse_list_page(html: &str) -> Vec<(u32, String)> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&BROWSE_TABLE).next() else {
        return Vec::new();
    };

    let rows: Vec<ElementRef> = table.select(&ROW).collect();
    if rows.len() <= 1 {
        return Vec::new();
    }

    let mut items = Vec::new();
    for row in rows {
        let cells = cells(row);
        let Some(anchor) = cells.get(1).and_then(|cell| cell.select(&ANCHOR).next()) else {
            continue;
        };

        let href = anchor.value().attr("href").unwrap_or_default();
        match ITEM_HREF.captures(href).and_then(|c| c[1].parse::<u32>().ok()) {
            Some(id) => items.push((id, text_of(anchor))),
            None => warn!(href, "Skipping row with unexpected item link"),
        }
    }
    items
}

/// Parse an item page into a [`Tracker`].
///
/// Comment bodies and attachment names are converted to Markdown with
/// links resolved against `instance`. The page lists comments newest first;
/// the oldest one is the item description.
pub fn parse_item_page(instance: &str, kind: TrackerKind, html: &str) -> Result<Tracker> {
    let document = Html::parse_document(html);
    let form = document
        .select(&ITEM_FORM)
        .next()
        .ok_or(ImportError::MissingForm)?;

    let item_id = input_field(form, "item_id").ok_or(ImportError::MissingField("item_id"))?;
    let item_id = item_id
        .trim()
        .parse::<u32>()
        .map_err(|_| ImportError::InvalidItemId(item_id.clone()))?;

    let mut tracker = Tracker::new(kind.singular(), item_id);
    tracker.summary = input_field(form, "summary");
    tracker.originator_name = input_field(form, "originator_name");
    tracker.originator_email = input_field(form, "originator_email");
    tracker.severity = select_field(form, "severity");
    tracker.priority = select_field(form, "priority");
    tracker.category_id = select_field(form, "category_id");
    tracker.status_id = select_field(form, "status_id");
    tracker.resolution_id = select_field(form, "resolution_id");
    tracker.assigned_to = select_field(form, "assigned_to");
    tracker.programmer_hardware = input_field(form, "custom_tf1");
    tracker.device_type = input_field(form, "custom_tf2");
    tracker.url = Some(item_page_url(instance, kind, item_id));

    let converter = MarkupConverter::for_base_url(instance);

    let mut comments = parse_comments(&document, &converter)?;
    comments.reverse();
    if !comments.is_empty() {
        tracker.description = Some(comments.remove(0));
    }
    tracker.comments = comments;

    let mut attachments = parse_attachments(&document, instance, &converter)?;
    attachments.reverse();
    tracker.attachments = attachments;

    debug!(
        item_id,
        comments = tracker.comments.len(),
        attachments = tracker.attachments.len(),
        "Parsed item page"
    );
    Ok(tracker)
}

fn parse_comments(document: &Html, converter: &MarkupConverter) -> Result<Vec<TrackerComment>> {
    let Some(table) = document
        .select(&DISCUSSION)
        .next()
        .and_then(|div| div.select(&TABLE).next())
    else {
        return Ok(Vec::new());
    };

    let mut comments = Vec::new();
    for row in table.select(&ROW) {
        let Some(body) = row.select(&TRACKER_COMMENT).next() else {
            continue;
        };

        let cells = cells(row);
        let time = cells
            .first()
            .and_then(|cell| cell.select(&ANCHOR).next())
            .map(text_of)
            .and_then(|stamp| stamp.split(',').next().map(|s| s.trim().to_string()));
        let author = cells.get(1).map(|cell| match cell.select(&ANCHOR).next() {
            Some(anchor) => text_of(anchor),
            None => text_of(*cell),
        });
        let text = converter.convert(&child_nodes(body)?)?;

        comments.push(TrackerComment::new(author, time, Some(text)));
    }
    Ok(comments)
}

fn parse_attachments(
    document: &Html,
    instance: &str,
    converter: &MarkupConverter,
) -> Result<Vec<TrackerAttachment>> {
    let Some(div) = document.select(&ATTACHED).next() else {
        return Ok(Vec::new());
    };

    let mut attachments = Vec::new();
    for anchor in div.select(&ANCHOR).filter(|a| is_file_link(*a)) {
        let text = converter.convert(&child_nodes(anchor)?)?;
        let url = absolutize(instance, anchor.value().attr("href").unwrap_or("#"));
        attachments.push(TrackerAttachment { text, url });
    }
    Ok(attachments)
}

/// File links are marked with a `<!-- file -->` comment inside the anchor
fn is_file_link(anchor: ElementRef) -> bool {
    anchor.children().any(|child| match child.value() {
        ScraperNode::Comment(comment) => comment.comment.trim() == "file",
        _ => false,
    })
}

fn input_field(form: ElementRef, name: &str) -> Option<String> {
    form.select(&INPUT)
        .find(|input| input.value().attr("name") == Some(name))
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

fn select_field(form: ElementRef, name: &str) -> Option<String> {
    form.select(&SELECT)
        .find(|select| select.value().attr("name") == Some(name))?
        .select(&OPTION)
        .find(|option| option.value().attr("selected").is_some())
        .map(text_of)
}

/// Direct `td` children of a row
fn cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .collect()
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use savane_markup::MarkupError;

    const INSTANCE: &str = "https://savannah.nongnu.org";

    const LIST_PAGE: &str = r#"<html><body>
        <table class="box">
          <tr><th>#</th><th>Summary</th><th>Status</th></tr>
          <tr><td><a href="?61001">#61001</a></td><td><a href="?61001">Crash when writing fuses</a></td><td>Open</td></tr>
          <tr><td><a href="?60998">#60998</a></td><td><a href="?60998"> Typo in manual </a></td><td>Closed</td></tr>
          <tr><td>?</td><td><a href="/users/x">not an item</a></td><td></td></tr>
        </table>
        </body></html>"#;

    const ITEM_PAGE: &str = r##"<html><body>
        <form action="/bugs/index.php" method="post" name="item_form">
          <input type="hidden" name="item_id" value="61001" />
          <input type="text" name="summary" value="Crash when writing fuses" />
          <input type="hidden" name="originator_name" value="Jane Doe" />
          <input type="text" name="custom_tf1" value="USBasp" />
          <input type="text" name="custom_tf2" value="ATmega328P" />
          <select name="severity">
            <option value="1">1 - Wish</option>
            <option value="3" selected="selected">3 - Normal</option>
          </select>
          <select name="status_id">
            <option value="1">Open</option>
            <option value="3" selected="selected">Closed</option>
          </select>
          <select name="resolution_id">
            <option value="1" selected="selected">Fixed</option>
          </select>
        </form>
        <div id="hidsubpartcontentdiscussion"><table class="box">
          <tr><td class="boxitem"><a name="comment1" href="#comment1">Tue 05 Jan 2021 09:00:00 AM UTC, comment #1:</a>
            <div class="tracker_comment">Fixed in <a href="/svn/?r=1442">r1442</a>.</div></td>
            <td class="boxitemextra"><a href="/users/joerg">Joerg Wunsch</a></td></tr>
          <tr><td class="boxitem"><a name="comment0" href="#comment0">Mon 04 Jan 2021 08:00:00 AM UTC, original submission:</a>
            <div class="tracker_comment"><p>It <em>crashes</em>:</p>
              <blockquote class="verbatim"><p>avrdude: error</p></blockquote></div></td>
            <td class="boxitemextra">Anonymous</td></tr>
        </table></div>
        <div id="hidsubpartcontentattached">
          <a href="/bugs/download.php?file_id=2"><!-- file -->file #2: fix.patch</a>
          <a href="/users/jane">Jane</a>
          <a href="/bugs/download.php?file_id=1"><!-- file -->file #1: log.txt</a>
        </div>
        </body></html>"##;

    #[test]
    fn test_list_page_url() {
        assert_eq!(
            list_page_url(INSTANCE, "avrdude", TrackerKind::Bug, 50),
            "https://savannah.nongnu.org/bugs/?group=avrdude&func=browse&set=custom&status_id=0&offset=50&chunksz=50#results"
        );
    }

    #[test]
    fn test_item_page_url() {
        assert_eq!(
            item_page_url(INSTANCE, TrackerKind::Patch, 9),
            "https://savannah.nongnu.org/patch/?9"
        );
    }

    #[test]
    fn test_parse_list_page() {
        let items = parse_list_page(LIST_PAGE);
        assert_eq!(
            items,
            vec![
                (61001, "Crash when writing fuses".to_string()),
                (60998, "Typo in manual".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_list_page_exhausted() {
        assert!(parse_list_page("<html><body><p>No matching items</p></body></html>").is_empty());
        assert!(parse_list_page(
            r#"<table class="box"><tr><th>#</th><th>Summary</th></tr></table>"#
        )
        .is_empty());
    }

    #[test]
    fn test_parse_item_page_fields() {
        let tracker = parse_item_page(INSTANCE, TrackerKind::Bug, ITEM_PAGE).unwrap();
        assert_eq!(tracker.item_type, "bug");
        assert_eq!(tracker.item_id, 61001);
        assert_eq!(tracker.summary.as_deref(), Some("Crash when writing fuses"));
        assert_eq!(tracker.originator_name.as_deref(), Some("Jane Doe"));
        assert_eq!(tracker.originator_email, None);
        assert_eq!(tracker.severity.as_deref(), Some("3 - Normal"));
        assert_eq!(tracker.status_id.as_deref(), Some("Closed"));
        assert_eq!(tracker.resolution_id.as_deref(), Some("Fixed"));
        assert_eq!(tracker.priority, None);
        assert_eq!(tracker.programmer_hardware.as_deref(), Some("USBasp"));
        assert_eq!(tracker.device_type.as_deref(), Some("ATmega328P"));
        assert_eq!(
            tracker.url.as_deref(),
            Some("https://savannah.nongnu.org/bugs/?61001")
        );
        assert!(tracker.is_closed());
    }

    #[test]
    fn test_parse_item_page_comments() {
        let tracker = parse_item_page(INSTANCE, TrackerKind::Bug, ITEM_PAGE).unwrap();

        let description = tracker.description.unwrap();
        assert_eq!(description.author.as_deref(), Some("Anonymous"));
        assert_eq!(description.time.as_deref(), Some("Mon 04 Jan 2021 08:00:00 AM UTC"));
        assert_eq!(
            description.text.as_deref(),
            Some("It **crashes**:\n```\navrdude: error\n```")
        );

        assert_eq!(tracker.comments.len(), 1);
        let comment = &tracker.comments[0];
        assert_eq!(comment.author.as_deref(), Some("Joerg Wunsch"));
        assert_eq!(comment.time.as_deref(), Some("Tue 05 Jan 2021 09:00:00 AM UTC"));
        assert_eq!(
            comment.text.as_deref(),
            Some("Fixed in [r1442](https://savannah.nongnu.org/svn/?r=1442).")
        );
    }

    #[test]
    fn test_parse_item_page_attachments() {
        let tracker = parse_item_page(INSTANCE, TrackerKind::Bug, ITEM_PAGE).unwrap();
        let attachments: Vec<String> = tracker.attachments.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            attachments,
            vec![
                "[file #1: log.txt](https://savannah.nongnu.org/bugs/download.php?file_id=1)",
                "[file #2: fix.patch](https://savannah.nongnu.org/bugs/download.php?file_id=2)",
            ]
        );
    }

    #[test]
    fn test_parse_item_page_deeply_nested_comment() {
        let depth = savane_markup::DEFAULT_MAX_DEPTH * 4;
        let body = format!("{}deep{}", "<span>".repeat(depth), "</span>".repeat(depth));
        let html = ITEM_PAGE.replace(r#"Fixed in <a href="/svn/?r=1442">r1442</a>."#, &body);
        let result = parse_item_page(INSTANCE, TrackerKind::Bug, &html);
        assert!(matches!(
            result,
            Err(ImportError::Markup(MarkupError::TooDeeplyNested { .. }))
        ));
    }

    #[test]
    fn test_parse_item_page_without_form() {
        let result = parse_item_page(INSTANCE, TrackerKind::Bug, "<html><body></body></html>");
        assert!(matches!(result, Err(ImportError::MissingForm)));
    }

    #[test]
    fn test_parse_item_page_bad_id() {
        let html = r#"<form name="item_form"><input name="item_id" value="abc"></form>"#;
        let result = parse_item_page(INSTANCE, TrackerKind::Task, html);
        assert!(matches!(result, Err(ImportError::InvalidItemId(id)) if id == "abc"));
    }
}
