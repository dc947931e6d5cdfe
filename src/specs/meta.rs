// src/specs/meta.rs
//! Chart-level metadata: publication date, adjacent editions, display title.
//!
//! Where it lives on the page:
//! - `<time datetime="2015-11-28">` in the chart header: this edition's date.
//! - `<a title="Previous Week" href="/charts/hot-100/2015-11-21">` and the
//!   matching `Next Week` anchor: adjacent editions, date is the last path segment.
//! - Newer layouts carry `data-previous-chart-date` / `data-chart-next-date`
//!   on the chart container instead; those are read when the anchors are absent.
//! - `<title>The Hot 100 Chart | Billboard</title>`: display title, site suffix dropped.

use chrono::NaiveDate;
use tracing::warn;

use crate::calendar::parse_day;
use crate::core::html::{attr_ci, class_block, find_ci, find_tag_ci, slice_between_ci, strip_tags, tag_end};
use crate::core::sanitize::{decode_entities, normalize_ws};

const PREVIOUS_LABEL: &str = "Previous Week";
const NEXT_LABEL: &str = "Next Week";
const PREVIOUS_DATA_ATTR: &str = "data-previous-chart-date";
const NEXT_DATA_ATTR: &str = "data-chart-next-date";
const TITLE_SEPARATOR: &str = " | ";
const HEADER_CLASS: &str = "chart-data-header";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartMeta {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub previous_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
}

pub fn extract(doc: &str) -> ChartMeta {
    ChartMeta {
        title: chart_title(doc),
        date: publication_date(doc),
        previous_date: nav_date(doc, PREVIOUS_LABEL).or_else(|| data_attr_date(doc, PREVIOUS_DATA_ATTR)),
        next_date: nav_date(doc, NEXT_LABEL).or_else(|| data_attr_date(doc, NEXT_DATA_ATTR)),
    }
}

/// `YYYY-MM-DD` at the start of a marker value; tolerates `2015-11-28T00:00:00`.
fn marker_day(raw: &str, what: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10).unwrap_or(raw);
    match parse_day(head) {
        Ok(d) => Some(d),
        Err(_) => {
            warn!("ignoring unreadable {what} date marker {raw:?}");
            None
        }
    }
}

/// The chart header's `<time>`; other timestamps on the page (site header,
/// articles) only count when the header has none.
fn publication_date(doc: &str) -> Option<NaiveDate> {
    class_block(doc, HEADER_CLASS)
        .and_then(first_time_marker)
        .or_else(|| first_time_marker(doc))
        .and_then(|raw| marker_day(raw, "publication"))
}

fn first_time_marker(doc: &str) -> Option<&str> {
    let lt = find_tag_ci(doc, "time", 0)?;
    let tag = &doc[lt..tag_end(doc, lt)?];
    attr_ci(tag, "datetime")
}

/// Date from the first anchor whose `title` is `label`.
fn nav_date(doc: &str, label: &str) -> Option<NaiveDate> {
    let mut pos = 0usize;
    while let Some(lt) = find_tag_ci(doc, "a", pos) {
        let end = tag_end(doc, lt)?;
        let tag = &doc[lt..end];
        pos = end;
        if !attr_ci(tag, "title").is_some_and(|t| t.trim().eq_ignore_ascii_case(label)) {
            continue;
        }
        let href = attr_ci(tag, "href")?;
        let path = href.split(['?', '#']).next().unwrap_or(href);
        let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
        return marker_day(last, label);
    }
    None
}

/// First opening tag carrying `attr`. Mentions of the attribute name in text
/// or scripts are passed over.
fn data_attr_date(doc: &str, attr: &str) -> Option<NaiveDate> {
    let needle = format!("{attr}=");
    let mut pos = 0usize;
    while let Some(hit) = find_ci(doc, &needle, pos) {
        pos = hit + needle.len();
        let Some(lt) = doc[..hit].rfind('<') else { continue };
        if doc[lt..hit].contains('>') {
            continue;
        }
        let Some(end) = tag_end(doc, lt) else { continue };
        let Some(raw) = attr_ci(&doc[lt..end], attr) else { continue };
        if raw.trim().is_empty() {
            return None;
        }
        return marker_day(raw, attr);
    }
    None
}

fn chart_title(doc: &str) -> Option<String> {
    let inner = slice_between_ci(doc, "<title", "</title>")?;
    let text = normalize_ws(&decode_entities(&strip_tags(inner)));
    let title = text.split(TITLE_SEPARATOR).next().unwrap_or("").trim();
    (!title.is_empty()).then(|| s!(title))
}
