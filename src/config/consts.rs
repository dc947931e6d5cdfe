// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://www.billboard.com";
pub const CHARTS_PREFIX: &str = "/charts/";
pub const USER_AGENT: &str = concat!("chart_scrape/", env!("CARGO_PKG_VERSION"));
pub const TIMEOUT_SECS: u64 = 25;

// Retry (HttpFetcher only; the core never retries)
pub const MAX_RETRIES: u32 = 5;
pub const RETRY_DELAYS_MS: &[u64] = &[250, 500, 1_000, 2_000, 4_000];

// Parse
/// A chart where fewer than half the rows parse is treated as unusable.
pub const MIN_USABLE_RATIO: f64 = 0.5;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Text rendering
pub const LABEL_WIDTH: usize = 60;
pub const STAT_WIDTH: usize = 4;
pub const UNDATED_LABEL: &str = "current";
