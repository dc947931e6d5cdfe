// src/log.rs
// Log setup for binaries. The library itself only emits `tracing` events;
// nothing is printed unless a subscriber is installed.

use std::fmt;
use std::io;
use std::sync::OnceLock;
use std::time::Instant;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// `[00:00:01.250]` since the first log line of the process.
struct Elapsed;

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", fmt_elapsed(start().elapsed().as_millis()))
    }
}

/// Filter used when `RUST_LOG` is unset. `-v` shows fetches and counts,
/// `-vv` shows date resolution and skipped rows in detail.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "chart_scrape=warn",
        1 => "chart_scrape=info",
        2 => "chart_scrape=debug",
        _ => "chart_scrape=trace,ureq=debug",
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `verbosity`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init(verbosity: u8) {
    start();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(Elapsed)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(0), "00:00:00.000");
        assert_eq!(fmt_elapsed(3_723_045), "01:02:03.045");
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_filter(0), "chart_scrape=warn");
        assert_eq!(default_filter(2), "chart_scrape=debug");
        assert!(default_filter(9).contains("trace"));
    }

    #[test]
    fn init_twice_is_fine() {
        init(0);
        init(3);
    }
}
