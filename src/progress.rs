// src/progress.rs
use std::fmt;

/// Why a chart row was dropped during parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingArtist,
    BadRank(String),
    BadPeak(String),
    BadLast(String),
    BadWeeks(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingArtist => f.write_str("no artist text"),
            SkipReason::BadRank(raw) => write!(f, "unreadable rank {raw:?}"),
            SkipReason::BadPeak(raw) => write!(f, "unreadable peak position {raw:?}"),
            SkipReason::BadLast(raw) => write!(f, "unreadable last week position {raw:?}"),
            SkipReason::BadWeeks(raw) => write!(f, "unreadable weeks on chart {raw:?}"),
        }
    }
}

/// Lightweight reporting for one parse run. Skipped rows are surfaced here
/// (and logged); they never fail the parse on their own.
/// Callers implement whichever hooks they care about.
pub trait Progress {
    /// Called once with the number of candidate rows found on the page.
    fn begin(&mut self, _rows: usize) {}

    /// A row became an entry with this rank.
    fn entry_done(&mut self, _rank: u32) {}

    /// Row `position` (1-based, document order) was dropped.
    fn entry_skipped(&mut self, _position: usize, _reason: &SkipReason) {}

    /// Called at the end with the kept/skipped totals.
    fn finish(&mut self, _kept: usize, _skipped: usize) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Collects every skipped row; handy for tests and for callers that want to
/// inspect what was dropped after the fact.
#[derive(Debug, Default)]
pub struct SkipLog {
    pub skipped: Vec<(usize, SkipReason)>,
    pub kept: usize,
}

impl SkipLog {
    pub fn count(&self) -> usize { self.skipped.len() }
}

impl Progress for SkipLog {
    fn entry_skipped(&mut self, position: usize, reason: &SkipReason) {
        self.skipped.push((position, reason.clone()));
    }

    fn finish(&mut self, kept: usize, _skipped: usize) {
        self.kept = kept;
    }
}
