// src/config/options.rs
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;

/// Settings for [`crate::core::net::HttpFetcher`].
///
/// Every field has a default, so a partial config document is enough:
/// `{"timeout_secs": 10}` deserializes to the defaults plus a 10 s timeout.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after the first one, for transient failures only.
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: s!(BASE_URL),
            timeout_secs: TIMEOUT_SECS,
            max_retries: MAX_RETRIES,
            user_agent: s!(USER_AGENT),
        }
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Delay before retry number `attempt` (0-based). Past the end of the
    /// table the last delay is reused.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let ms = RETRY_DELAYS_MS
            .get(attempt as usize)
            .or(RETRY_DELAYS_MS.last())
            .copied()
            .unwrap_or(0);
        Duration::from_millis(ms)
    }
}
