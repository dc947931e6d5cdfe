// src/chart.rs
//! The public data objects: [`ChartData`] (one edition) and [`ChartEntry`]
//! (one ranked row), plus the fetch-and-parse pipeline that builds them.
//!
//! Both are read-only once built. A different week is a different `ChartData`.

use std::fmt;
use std::ops::Index;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calendar::{self, RequestDate};
use crate::config::FetchOptions;
use crate::config::consts::{LABEL_WIDTH, STAT_WIDTH, UNDATED_LABEL};
use crate::core::net::{HttpFetcher, PageFetcher};
use crate::error::{ChartError, Result};
use crate::progress::Progress;
use crate::specs::{entries, meta};

/// History for one entry. Charts either track all three numbers or none,
/// so they travel together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stats {
    pub peak: u32,
    /// `0` when the entry was not on the previous edition.
    pub last: u32,
    pub weeks: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EntryRecord", from = "EntryRecord")]
pub struct ChartEntry {
    title: String,
    artist: String,
    rank: u32,
    stats: Option<Stats>,
}

impl ChartEntry {
    pub(crate) fn new(title: String, artist: String, rank: u32, stats: Option<Stats>) -> Self {
        Self { title, artist, rank, stats }
    }

    /// Empty on artist-only charts.
    pub fn title(&self) -> &str { &self.title }
    pub fn artist(&self) -> &str { &self.artist }
    pub fn rank(&self) -> u32 { self.rank }
    pub fn stats(&self) -> Option<Stats> { self.stats }
    pub fn peak_pos(&self) -> Option<u32> { self.stats.map(|s| s.peak) }
    pub fn last_pos(&self) -> Option<u32> { self.stats.map(|s| s.last) }
    pub fn weeks(&self) -> Option<u32> { self.stats.map(|s| s.weeks) }

    /// A debut: tracked chart, absent from last week's edition.
    pub fn is_new(&self) -> bool {
        self.last_pos() == Some(0)
    }
}

/// `'Title' by Artist`, or just `Artist` on artist-only charts.
impl fmt::Display for ChartEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            f.pad(&self.artist)
        } else {
            f.pad(&format!("'{}' by {}", self.title, self.artist))
        }
    }
}

/// Wire shape of an entry. `isNew` is written for consumers but recomputed
/// on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    title: String,
    artist: String,
    rank: u32,
    peak_pos: Option<u32>,
    last_pos: Option<u32>,
    weeks: Option<u32>,
    #[serde(default)]
    is_new: bool,
}

impl From<ChartEntry> for EntryRecord {
    fn from(e: ChartEntry) -> Self {
        let is_new = e.is_new();
        Self {
            title: e.title,
            artist: e.artist,
            rank: e.rank,
            peak_pos: e.stats.map(|s| s.peak),
            last_pos: e.stats.map(|s| s.last),
            weeks: e.stats.map(|s| s.weeks),
            is_new,
        }
    }
}

impl From<EntryRecord> for ChartEntry {
    fn from(r: EntryRecord) -> Self {
        // a partial triple cannot be represented; treat it as untracked and
        // let ChartData's stats check reject the chart
        let stats = match (r.peak_pos, r.last_pos, r.weeks) {
            (Some(peak), Some(last), Some(weeks)) => Some(Stats { peak, last, weeks }),
            _ => None,
        };
        Self { title: r.title, artist: r.artist, rank: r.rank, stats }
    }
}

/// One edition of a named chart.
///
/// Equality compares the chart itself; how many page rows were dropped on
/// the way in does not take part.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ChartRecord")]
pub struct ChartData {
    name: String,
    title: Option<String>,
    date: Option<NaiveDate>,
    previous_date: Option<NaiveDate>,
    next_date: Option<NaiveDate>,
    entries: Vec<ChartEntry>,
    #[serde(skip)]
    skipped: usize,
}

impl PartialEq for ChartData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.title == other.title
            && self.date == other.date
            && self.previous_date == other.previous_date
            && self.next_date == other.next_date
            && self.entries == other.entries
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartRecord {
    name: String,
    #[serde(default)]
    title: Option<String>,
    date: Option<NaiveDate>,
    previous_date: Option<NaiveDate>,
    #[serde(default)]
    next_date: Option<NaiveDate>,
    entries: Vec<EntryRecord>,
}

impl TryFrom<ChartRecord> for ChartData {
    type Error = ChartError;

    fn try_from(r: ChartRecord) -> Result<Self> {
        // partial triples would silently turn into untracked entries
        if r.entries.iter().any(|e| {
            let n = [e.peak_pos, e.last_pos, e.weeks].iter().filter(|v| v.is_some()).count();
            n != 0 && n != 3
        }) {
            return Err(ChartError::MixedStats { chart: r.name });
        }
        let mut entries: Vec<ChartEntry> = r.entries.into_iter().map(ChartEntry::from).collect();
        entries::validate_ranks(&r.name, &entries)?;
        entries::validate_stats(&r.name, &entries)?;
        entries.sort_by_key(ChartEntry::rank);
        Ok(Self {
            name: r.name,
            title: r.title,
            date: r.date,
            previous_date: r.previous_date,
            next_date: r.next_date,
            entries,
            skipped: 0,
        })
    }
}

impl ChartData {
    /// Fetch and parse chart `name` over HTTP with default options.
    ///
    /// `date` accepts `"YYYY-MM-DD"`, a `chrono::NaiveDate`, an `Option` of
    /// either, or [`RequestDate::Latest`]. Dates between editions round up to
    /// the next edition.
    pub fn create(name: &str, date: impl Into<RequestDate>) -> Result<Self> {
        let fetcher = HttpFetcher::new(FetchOptions::default());
        Self::fetch_with(&fetcher, name, date, None)
    }

    /// The full pipeline with an injected fetcher: resolve the date, fetch
    /// once, read metadata, parse entries, validate.
    pub fn fetch_with<F: PageFetcher + ?Sized>(
        fetcher: &F,
        name: &str,
        date: impl Into<RequestDate>,
        progress: Option<&mut dyn Progress>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChartError::NotFound(s!(name)));
        }
        let requested = date.into();
        let resolved = calendar::resolve(name, &requested)?;

        let markup = fetcher.fetch(name, resolved)?;
        debug!("{name} ({resolved}): fetched {} bytes", markup.len());

        let chart = Self::from_markup(name, &markup, progress)?;
        if let (Some(want), Some(got)) = (resolved.day(), chart.date) {
            if want != got {
                debug!("{name}: asked for {want}, page is dated {got}");
            }
        }
        info!("{name}: loaded {} entries ({})", chart.len(), chart.date_label());
        Ok(chart)
    }

    /// Build from a page that has already been fetched.
    pub fn from_markup(name: &str, markup: &str, progress: Option<&mut dyn Progress>) -> Result<Self> {
        let meta = meta::extract(markup);
        let parsed = entries::parse(name, markup, progress)?;
        debug!("{name}: profile {:?}, {} of {} rows kept", parsed.profile, parsed.entries.len(), parsed.seen);
        if parsed.skipped > 0 {
            warn!("{name}: {} malformed row(s) skipped", parsed.skipped);
        }
        Ok(Self {
            name: s!(name),
            title: meta.title,
            date: meta.date,
            previous_date: meta.previous_date,
            next_date: meta.next_date,
            entries: parsed.entries,
            skipped: parsed.skipped,
        })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn title(&self) -> Option<&str> { self.title.as_deref() }
    /// Publication date; `None` for evergreen charts.
    pub fn date(&self) -> Option<NaiveDate> { self.date }
    pub fn previous_date(&self) -> Option<NaiveDate> { self.previous_date }
    pub fn next_date(&self) -> Option<NaiveDate> { self.next_date }
    pub fn entries(&self) -> &[ChartEntry] { &self.entries }
    /// Page rows dropped as malformed while parsing; `0` for charts read from JSON.
    pub fn skipped(&self) -> usize { self.skipped }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn get(&self, index: usize) -> Option<&ChartEntry> { self.entries.get(index) }
    pub fn iter(&self) -> std::slice::Iter<'_, ChartEntry> { self.entries.iter() }

    /// Entry holding `rank` (1-based).
    pub fn entry_at_rank(&self, rank: u32) -> Option<&ChartEntry> {
        let idx = (rank as usize).checked_sub(1)?;
        self.entries.get(idx).filter(|e| e.rank == rank)
    }

    pub fn has_stats(&self) -> bool {
        self.entries.first().is_some_and(|e| e.stats.is_some())
    }

    fn date_label(&self) -> String {
        self.date.map_or_else(|| s!(UNDATED_LABEL), |d| d.to_string())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Inverse of [`to_json`](Self::to_json); rejects documents that break
    /// rank or stats invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Index<usize> for ChartData {
    type Output = ChartEntry;
    fn index(&self, index: usize) -> &ChartEntry { &self.entries[index] }
}

impl<'a> IntoIterator for &'a ChartData {
    type Item = &'a ChartEntry;
    type IntoIter = std::slice::Iter<'a, ChartEntry>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

fn stat_cell(v: Option<u32>) -> String {
    v.map_or_else(|| s!("-"), |n| n.to_string())
}

/// Fixed-width table. Byte-stable for a given edition; golden files depend on it.
///
/// ```text
/// hot-100 -- 2015-11-28
///   1. 'Hello' by Adele                                                1    1    4
/// ```
impl fmt::Display for ChartData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} -- {}", self.name, self.date_label())?;
        for e in &self.entries {
            writeln!(
                f,
                "{:>3}. {:<lw$} {:>sw$} {:>sw$} {:>sw$}",
                e.rank,
                e,
                stat_cell(e.peak_pos()),
                stat_cell(e.last_pos()),
                stat_cell(e.weeks()),
                lw = LABEL_WIDTH,
                sw = STAT_WIDTH,
            )?;
        }
        Ok(())
    }
}
