//! Configuration for the submission client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and timing settings for submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Retries after the first failed attempt (total attempts = 1 + this)
    pub max_retries: u32,

    /// Fixed wait between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Wait before the one-shot queue flush at application start
    /// (milliseconds)
    pub startup_flush_delay_ms: u64,

    /// Timeout for a single HTTP request (seconds)
    pub request_timeout_secs: u64,
}

impl SubmitConfig {
    /// Get the between-attempt delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get the startup flush delay as a Duration
    pub fn startup_flush_delay(&self) -> Duration {
        Duration::from_millis(self.startup_flush_delay_ms)
    }

    /// Get the per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries > 10 {
            return Err("max_retries above 10 would stall the participant".to_string());
        }
        Ok(())
    }
}

impl Default for SubmitConfig {
    /// Defaults: 3 retries, 1 second apart, 2 second startup flush delay
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1_000,
            startup_flush_delay_ms: 2_000,
            request_timeout_secs: 30,
        }
    }
}
