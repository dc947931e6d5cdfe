// src/lib.rs

#[macro_use]
pub mod macros;

pub mod calendar;
pub mod chart;
pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod progress;
pub mod specs;

#[cfg(feature = "cli")]
pub mod cli;

pub use calendar::{RequestDate, ResolvedDate};
pub use chart::{ChartData, ChartEntry, Stats};
pub use config::FetchOptions;
pub use core::{HttpFetcher, PageFetcher};
pub use error::{ChartError, Result};
pub use progress::{Progress, SkipLog, SkipReason};
