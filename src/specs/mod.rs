// src/specs/mod.rs
//! # Page specs
//!
//! Knows *where the ground truth lives* in a chart page and how to read it
//! robustly. Pure functions over markup: no fetching, no caching, no output
//! formatting.
//!
//! - `meta` reads chart-level facts: publication date, previous/next edition
//!   dates, the chart's display title. Missing markers are normal (evergreen
//!   charts have no dates), so it never fails.
//! - `entries` reads the ranked rows. It decides a [`ChartProfile`] once per
//!   page and extracts every row under it, so capabilities such as
//!   peak/last/weeks are all-or-none across the edition.
//!
//! ## Typical call chain
//! ```text
//! ChartData::fetch_with → PageFetcher::fetch → specs::meta::extract
//!                                          ↘ specs::entries::parse
//! ```
//!
//! ## Conventions
//! - Case-insensitive tag and attribute matching via `core::html`.
//! - Class tokens are matched whole (`chart-row` never matches `chart-row__song`).
//! - Row problems are reported through `progress::Progress`, chart problems
//!   through `ChartError`.
pub mod entries;
pub mod meta;

pub use entries::{ChartProfile, ParsedEntries, RankSource, StatsProfile, TitleProfile};
pub use meta::ChartMeta;
