// src/calendar.rs
//! Publication calendars and date resolution.
//!
//! Charts publish once a week on a fixed weekday, but the weekday has changed
//! over a chart's history (the Hot 100 moved from Mondays to Saturdays in 1962).
//! A [`ChartCalendar`] is an ordered list of such eras. Resolving a requested
//! day means finding the first publication date on or after it, clamped to the
//! chart's first edition.
//!
//! Evergreen charts (all-time lists) have no editions at all; every request
//! for them resolves to [`ResolvedDate::Latest`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::debug;

use crate::config::consts::DATE_FORMAT;
use crate::error::{ChartError, Result};

/// What the caller asked for: the latest edition, or a calendar day given as
/// text (`YYYY-MM-DD`) or as a structured date.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum RequestDate {
    #[default]
    Latest,
    Text(String),
    Calendar(NaiveDate),
}

impl RequestDate {
    /// Normalize to a calendar day. Text and structured inputs for the same
    /// day produce the same value.
    pub fn to_day(&self) -> Result<Option<NaiveDate>> {
        match self {
            RequestDate::Latest => Ok(None),
            RequestDate::Calendar(d) => Ok(Some(*d)),
            RequestDate::Text(t) => parse_day(t).map(Some),
        }
    }
}

impl From<&str> for RequestDate {
    fn from(s: &str) -> Self { RequestDate::Text(s!(s)) }
}

impl From<String> for RequestDate {
    fn from(s: String) -> Self { RequestDate::Text(s) }
}

impl From<NaiveDate> for RequestDate {
    fn from(d: NaiveDate) -> Self { RequestDate::Calendar(d) }
}

impl<T: Into<RequestDate>> From<Option<T>> for RequestDate {
    fn from(o: Option<T>) -> Self {
        o.map_or(RequestDate::Latest, Into::into)
    }
}

/// Strict `YYYY-MM-DD`. chrono alone would accept `2015-1-5`; the site would not.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    let t = s.trim();
    let shape_ok = t.len() == 10
        && t.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(ChartError::InvalidDateFormat(s!(s)));
    }
    NaiveDate::parse_from_str(t, DATE_FORMAT).map_err(|_| ChartError::InvalidDateFormat(s!(s)))
}

/// The edition to ask the fetcher for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedDate {
    Latest,
    Edition(NaiveDate),
}

impl ResolvedDate {
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            ResolvedDate::Latest => None,
            ResolvedDate::Edition(d) => Some(*d),
        }
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedDate::Latest => f.write_str("latest"),
            ResolvedDate::Edition(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl FromStr for ResolvedDate {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(ResolvedDate::Latest);
        }
        parse_day(s).map(ResolvedDate::Edition)
    }
}

/// A stretch of history during which editions appear every 7 days starting
/// at `first`. `last` is the final edition of the era, if it ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Era {
    first: NaiveDate,
    last: Option<NaiveDate>,
}

impl Era {
    /// First edition of this era on or after `day`. With `clamp`, days before
    /// the era start at `first`; without it the weekly cadence extends backwards.
    fn next_on_or_after(&self, day: NaiveDate, clamp: bool) -> Option<NaiveDate> {
        let from = if clamp { day.max(self.first) } else { day };
        let offset = (self.first - from).num_days().rem_euclid(7) as u64;
        let cand = from.checked_add_days(Days::new(offset))?;
        match self.last {
            Some(last) if cand > last => None,
            _ => Some(cand),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartCalendar {
    eras: Vec<Era>,
    /// Requests before the first edition clamp to it. Off for guessed calendars.
    floored: bool,
}

impl ChartCalendar {
    /// Weekly on `weekday`, no known first edition.
    pub fn weekly(weekday: Weekday) -> Self {
        // Any past day with the right weekday works as the anchor.
        let base = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
        let shift = (weekday.num_days_from_monday() as i64
            - base.weekday().num_days_from_monday() as i64)
            .rem_euclid(7) as u64;
        let first = base.checked_add_days(Days::new(shift)).unwrap_or(base);
        Self { eras: vec![Era { first, last: None }], floored: false }
    }

    /// Build from `(first, last)` era bounds in `(y, m, d)` form, oldest first.
    /// Invalid dates are dropped.
    fn from_eras(bounds: &[((i32, u32, u32), Option<(i32, u32, u32)>)]) -> Self {
        let ymd = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d);
        let eras = bounds
            .iter()
            .filter_map(|&(first, last)| {
                Some(Era { first: ymd(first)?, last: last.and_then(ymd) })
            })
            .collect();
        Self { eras, floored: true }
    }

    pub fn first_edition(&self) -> Option<NaiveDate> {
        if self.floored { self.eras.first().map(|e| e.first) } else { None }
    }

    /// Round `day` up to the next publication date, or to the first edition
    /// when `day` predates the chart. `None` only for an empty calendar or
    /// dates past chrono's range.
    pub fn round_up(&self, day: NaiveDate) -> Option<NaiveDate> {
        let day = match self.first_edition() {
            Some(first) => day.max(first),
            None => day,
        };
        self.eras.iter().enumerate().find_map(|(i, era)| {
            if era.last.is_some_and(|last| day > last) {
                return None;
            }
            era.next_on_or_after(day, self.floored || i > 0)
        })
    }
}

/// How a chart publishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Weekly(ChartCalendar),
    Evergreen,
}

const EVERGREEN_PREFIX: &str = "greatest-";

/// Known publication history per chart name. Anything unknown is assumed to
/// publish on Saturdays with no known first edition.
pub fn chart_kind(name: &str) -> ChartKind {
    if name.starts_with(EVERGREEN_PREFIX) {
        return ChartKind::Evergreen;
    }
    ChartKind::Weekly(match name {
        "hot-100" => ChartCalendar::from_eras(&[
            ((1958, 8, 4), Some((1961, 12, 25))),
            ((1962, 1, 6), None),
        ]),
        "billboard-200" => ChartCalendar::from_eras(&[((1963, 8, 17), None)]),
        "artist-100" => ChartCalendar::from_eras(&[((2014, 7, 19), None)]),
        _ => ChartCalendar::weekly(Weekday::Sat),
    })
}

/// Map a request onto the edition to fetch for chart `name`.
pub fn resolve(name: &str, requested: &RequestDate) -> Result<ResolvedDate> {
    let day = requested.to_day()?;
    let resolved = match (chart_kind(name), day) {
        (_, None) => ResolvedDate::Latest,
        (ChartKind::Evergreen, Some(d)) => {
            debug!("{name} has no dated editions; ignoring requested date {d}");
            ResolvedDate::Latest
        }
        (ChartKind::Weekly(cal), Some(d)) => match cal.round_up(d) {
            Some(edition) => ResolvedDate::Edition(edition),
            None => ResolvedDate::Latest,
        },
    };
    debug!("{name}: requested {requested:?} resolved to {resolved}");
    Ok(resolved)
}
