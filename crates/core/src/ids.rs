//! Time source and identifier minting.
//!
//! Version and snapshot ids embed the mint-time epoch milliseconds, so a
//! lexicographic sort of same-prefix ids is a time sort. The random
//! suffix keeps concurrent mints distinct. Both the clock and the mint
//! are injected so tests control time and can predict ids.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::Rng;

use crate::types::Timestamp;

/// Number of random characters appended to minted ids.
pub const ID_SUFFIX_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().expect("clock mutex poisoned") = to;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

// ---------------------------------------------------------------------------
// Id mint
// ---------------------------------------------------------------------------

/// Mints ids for the documents this pipeline writes.
#[derive(Clone)]
pub struct IdMint {
    clock: Arc<dyn Clock>,
}

impl IdMint {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// `ver_{page_id}_{millis}_{suffix}`
    pub fn page_version_id(&self, page_id: &str) -> String {
        format!(
            "ver_{page_id}_{}_{}",
            self.clock.now().timestamp_millis(),
            random_suffix()
        )
    }

    /// `snap_{millis}_{suffix}`
    pub fn site_snapshot_id(&self) -> String {
        format!(
            "snap_{}_{}",
            self.clock.now().timestamp_millis(),
            random_suffix()
        )
    }
}

fn random_suffix() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    suffix.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mint_at(millis: i64) -> IdMint {
        let start = Utc.timestamp_millis_opt(millis).unwrap();
        IdMint::new(Arc::new(ManualClock::new(start)))
    }

    #[test]
    fn version_id_embeds_page_and_millis() {
        let mint = mint_at(1_700_000_000_123);
        let id = mint.page_version_id("page_9");
        assert!(id.starts_with("ver_page_9_1700000000123_"));
        assert_eq!(id.len(), "ver_page_9_1700000000123_".len() + ID_SUFFIX_LEN);
    }

    #[test]
    fn snapshot_id_embeds_millis() {
        let mint = mint_at(1_700_000_000_000);
        assert!(mint.site_snapshot_id().starts_with("snap_1700000000000_"));
    }

    #[test]
    fn same_instant_mints_distinct_ids() {
        let mint = mint_at(1_700_000_000_000);
        let a = mint.site_snapshot_id();
        let b = mint.site_snapshot_id();
        assert_ne!(a, b);
    }

    #[test]
    fn later_mints_sort_after_earlier_ones() {
        let clock = Arc::new(ManualClock::new(
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        ));
        let mint = IdMint::new(clock.clone());
        let earlier = mint.site_snapshot_id();
        clock.advance(chrono::Duration::milliseconds(5));
        let later = mint.site_snapshot_id();
        assert!(later > earlier);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let start = Utc.timestamp_millis_opt(0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(30));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
