// src/specs/entries.rs
//! Ranked rows of a chart page.
//!
//! Row layout (one `<article class="chart-row">` per entry, document order = rank order):
//! ```text
//! <article class="chart-row chart-row--1">
//!   <span class="chart-row__current-week">1</span>          rank (optional)
//!   <h2 class="chart-row__song">Hello</h2>                  title (optional)
//!   <a class="chart-row__artist">Adele</a>                  artist
//!   <div class="chart-row__stats">                          stats block (optional)
//!     <div class="chart-row__last-week">     .. <span class="chart-row__value">1</span></div>
//!     <div class="chart-row__top-spot">      .. <span class="chart-row__value">1</span></div>
//!     <div class="chart-row__weeks-on-chart">.. <span class="chart-row__value">4</span></div>
//!   </div>
//! </article>
//! ```
//!
//! What a page supports is decided once, from all rows together, as a
//! [`ChartProfile`]. Every row is then read under that profile. A row that
//! cannot satisfy it is skipped and reported; it never changes the profile.

use tracing::warn;

use crate::chart::{ChartEntry, Stats};
use crate::config::consts::MIN_USABLE_RATIO;
use crate::core::html::{class_block, class_blocks, class_text};
use crate::core::sanitize::parse_count;
use crate::error::{ChartError, Result};
use crate::progress::{NullProgress, Progress, SkipReason};

const ROW: &str = "chart-row";
const SONG: &str = "chart-row__song";
const ARTIST: &str = "chart-row__artist";
const RANK: &str = "chart-row__current-week";
const STATS: &str = "chart-row__stats";
const PEAK: &str = "chart-row__top-spot";
const LAST: &str = "chart-row__last-week";
const WEEKS: &str = "chart-row__weeks-on-chart";
const VALUE: &str = "chart-row__value";

const NOT_CHARTED_MARKERS: &[&str] = &["", "-", "--", "NEW", "RE-ENTRY"];

/// Whether the chart tracks history (peak, last week, weeks on chart).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsProfile { Tracked, Untracked }

/// Whether entries are songs (title + artist) or artists only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleProfile { Titled, ArtistOnly }

/// Whether ranks are printed on the page or follow from row order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankSource { Explicit, Positional }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartProfile {
    pub stats: StatsProfile,
    pub titles: TitleProfile,
    pub ranks: RankSource,
}

/// Raw text pulled from one row, before any profile is applied.
#[derive(Debug, Default)]
struct RowFields {
    song: Option<String>,
    artist: Option<String>,
    rank: Option<String>,
    stats: Option<RawStats>,
}

#[derive(Debug, Default)]
struct RawStats {
    peak: Option<String>,
    last: Option<String>,
    weeks: Option<String>,
}

impl ChartProfile {
    /// Structural detection across the whole page. One row carrying a
    /// feature is enough to switch it on for all rows.
    fn detect(rows: &[RowFields]) -> Self {
        let any = |f: fn(&RowFields) -> bool| rows.iter().any(f);

        let titles = if any(|r| r.song.is_some()) && any(|r| r.artist.is_some()) {
            TitleProfile::Titled
        } else {
            TitleProfile::ArtistOnly
        };
        let stats = if any(|r| r.stats.is_some()) { StatsProfile::Tracked } else { StatsProfile::Untracked };
        let ranks = if any(|r| r.rank.is_some()) { RankSource::Explicit } else { RankSource::Positional };

        Self { stats, titles, ranks }
    }
}

pub struct ParsedEntries {
    pub profile: ChartProfile,
    /// Ordered by rank, ranks exactly `1..=entries.len()`.
    pub entries: Vec<ChartEntry>,
    /// Candidate rows found on the page.
    pub seen: usize,
    pub skipped: usize,
}

/// Read every ranked row of `doc`.
///
/// Fails with `EmptyChart` when nothing usable is left after skipping bad rows,
/// and with `MalformedChart` when the surviving ranks are not exactly `1..=n`.
pub fn parse(chart: &str, doc: &str, progress: Option<&mut dyn Progress>) -> Result<ParsedEntries> {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };

    let rows: Vec<RowFields> = class_blocks(doc, ROW).into_iter().map(read_row).collect();
    let seen = rows.len();
    progress.begin(seen);

    let profile = ChartProfile::detect(&rows);

    let mut entries: Vec<ChartEntry> = Vec::with_capacity(seen);
    let mut skipped = 0usize;
    for (i, row) in rows.into_iter().enumerate() {
        let position = i + 1;
        let next_rank = entries.len() as u32 + 1;
        match build_entry(&profile, row, next_rank) {
            Ok(entry) => {
                progress.entry_done(entry.rank());
                entries.push(entry);
            }
            Err(reason) => {
                warn!("{chart}: skipping row {position}: {reason}");
                skipped += 1;
                progress.entry_skipped(position, &reason);
            }
        }
    }
    progress.finish(entries.len(), skipped);

    let kept = entries.len();
    if kept == 0 || (kept as f64) < (seen as f64) * MIN_USABLE_RATIO {
        return Err(ChartError::EmptyChart { chart: s!(chart), kept, seen });
    }

    validate_ranks(chart, &entries)?;
    entries.sort_by_key(ChartEntry::rank);

    Ok(ParsedEntries { profile, entries, seen, skipped })
}

fn read_row(row: &str) -> RowFields {
    let stats = class_block(row, STATS).map(|block| RawStats {
        peak: stat_value(block, PEAK),
        last: stat_value(block, LAST),
        weeks: stat_value(block, WEEKS),
    });
    RowFields {
        song: class_text(row, SONG),
        artist: class_text(row, ARTIST),
        rank: class_text(row, RANK),
        stats,
    }
}

/// The value span sits inside the stat's own block, next to a label span.
fn stat_value(stats: &str, class: &str) -> Option<String> {
    class_block(stats, class).and_then(|b| class_text(b, VALUE))
}

fn build_entry(profile: &ChartProfile, row: RowFields, next_rank: u32) -> std::result::Result<ChartEntry, SkipReason> {
    let (title, artist) = match profile.titles {
        TitleProfile::Titled => (row.song.unwrap_or_default(), row.artist),
        // artist-only pages put the name in whichever slot they have
        TitleProfile::ArtistOnly => (s!(), row.artist.or(row.song)),
    };
    let artist = artist.ok_or(SkipReason::MissingArtist)?;

    let rank = match profile.ranks {
        RankSource::Positional => next_rank,
        RankSource::Explicit => {
            let raw = row.rank.unwrap_or_default();
            parse_count(&raw).filter(|r| *r > 0).ok_or(SkipReason::BadRank(raw))?
        }
    };

    let stats = match profile.stats {
        StatsProfile::Untracked => None,
        StatsProfile::Tracked => {
            let raw = row.stats.unwrap_or_default();
            let peak_raw = raw.peak.unwrap_or_default();
            let peak = parse_count(&peak_raw).filter(|p| *p > 0).ok_or(SkipReason::BadPeak(peak_raw))?;
            let weeks_raw = raw.weeks.unwrap_or_default();
            let weeks = parse_count(&weeks_raw).ok_or(SkipReason::BadWeeks(weeks_raw))?;
            let last = last_week(raw.last)?;
            Some(Stats { peak, last, weeks })
        }
    };

    Ok(ChartEntry::new(title, artist, rank, stats))
}

/// Last-week cell: a position, or one of the markers for "not on last
/// week's chart" (read as `0`). Anything else is a corrupted cell.
fn last_week(raw: Option<String>) -> std::result::Result<u32, SkipReason> {
    let Some(raw) = raw else { return Ok(0) };
    let t = raw.trim();
    if NOT_CHARTED_MARKERS.iter().any(|m| t.eq_ignore_ascii_case(m)) {
        return Ok(0);
    }
    parse_count(t).ok_or(SkipReason::BadLast(raw))
}

/// Ranks must be exactly `1..=n`, each once.
pub fn validate_ranks(chart: &str, entries: &[ChartEntry]) -> Result<()> {
    let ranks: Vec<u32> = entries.iter().map(ChartEntry::rank).collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    let contiguous = sorted.iter().enumerate().all(|(i, r)| *r as usize == i + 1);
    if contiguous {
        Ok(())
    } else {
        Err(ChartError::MalformedChart { chart: s!(chart), ranks })
    }
}

/// Stats must be present on every entry or on none.
pub fn validate_stats(chart: &str, entries: &[ChartEntry]) -> Result<()> {
    let with = entries.iter().filter(|e| e.stats().is_some()).count();
    if with == 0 || with == entries.len() {
        Ok(())
    } else {
        Err(ChartError::MixedStats { chart: s!(chart) })
    }
}
