//! Counter documents backing the rate limiter and daily quota.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One throttle counter, keyed externally (per user+action window, or per
/// workspace+action day). Mutated only inside a store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDoc {
    pub count: u32,
    pub window_start: Timestamp,
    pub updated_at: Timestamp,
}

impl CounterDoc {
    /// Fresh counter opening a new window at `now`.
    pub fn start(now: Timestamp) -> Self {
        Self {
            count: 1,
            window_start: now,
            updated_at: now,
        }
    }

    /// The same window with one more admission recorded.
    pub fn incremented(&self, now: Timestamp) -> Self {
        Self {
            count: self.count + 1,
            window_start: self.window_start,
            updated_at: now,
        }
    }
}
