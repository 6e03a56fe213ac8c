use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the event_registration module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventRegistrationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Upper bound for `capacity` on create/update; 0 capacity means unlimited.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u32,
    #[serde(default = "default_featured_limit")]
    pub featured_limit: u32,
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: u32,
    /// Longest a register/cancel call waits for the per-event lock.
    #[serde(default = "default_lock_timeout", with = "humantime_serde")]
    pub lock_timeout: Duration,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff", with = "humantime_serde")]
    pub retry_backoff: Duration,
}

impl Default for EventRegistrationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_capacity: default_max_capacity(),
            featured_limit: default_featured_limit(),
            recommendation_limit: default_recommendation_limit(),
            lock_timeout: default_lock_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_capacity() -> u32 {
    1000
}

fn default_featured_limit() -> u32 {
    3
}

fn default_recommendation_limit() -> u32 {
    3
}

fn default_lock_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> Duration {
    Duration::from_millis(200)
}
