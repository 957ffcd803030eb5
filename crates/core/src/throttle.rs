//! Counter decision math for the rate limiter and daily quota.
//!
//! Everything here is pure. The store runs these decisions inside a
//! per-key counter transaction; this module never sees the storage.

use std::time::Duration;

use chrono::Days;

use crate::actions::PipelineAction;
use crate::model::counter::CounterDoc;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// What a counter transaction should do with the stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum CounterDecision {
    /// Persist this state and admit the request.
    Admit(CounterDoc),
    /// Leave the stored state untouched and refuse the request.
    Refuse,
}

/// Evaluate one sliding-window read. A missing or expired window starts a
/// fresh one; a live window under the limit increments; a full window
/// refuses without touching the stored count.
pub fn decide_window(
    existing: Option<&CounterDoc>,
    now: Timestamp,
    limit: u32,
    window: Duration,
) -> CounterDecision {
    let window_ms = window.as_millis() as i64;
    match existing {
        None => CounterDecision::Admit(CounterDoc::start(now)),
        Some(doc) if (now - doc.window_start).num_milliseconds() >= window_ms => {
            CounterDecision::Admit(CounterDoc::start(now))
        }
        Some(doc) if doc.count >= limit => CounterDecision::Refuse,
        Some(doc) => CounterDecision::Admit(doc.incremented(now)),
    }
}

/// Evaluate one daily-quota read. The key already embeds the UTC day, so
/// a counter never outlives its day; there is no expiry arm here.
pub fn decide_day(existing: Option<&CounterDoc>, now: Timestamp, limit: u32) -> CounterDecision {
    match existing {
        None => CounterDecision::Admit(CounterDoc::start(now)),
        Some(doc) if doc.count >= limit => CounterDecision::Refuse,
        Some(doc) => CounterDecision::Admit(doc.incremented(now)),
    }
}

/// Seconds until a refused window admits again: remaining window time,
/// rounded up, never below 1.
pub fn retry_after_secs(window_start: Timestamp, now: Timestamp, window: Duration) -> i64 {
    let window_ms = window.as_millis() as i64;
    let elapsed_ms = (now - window_start).num_milliseconds().max(0);
    let remaining_ms = (window_ms - elapsed_ms).max(0);
    ((remaining_ms + 999) / 1000).max(1)
}

// ---------------------------------------------------------------------------
// Day boundaries
// ---------------------------------------------------------------------------

/// Compact UTC day component used in quota keys, e.g. `20260822`.
pub fn utc_day_key(now: Timestamp) -> String {
    now.format("%Y%m%d").to_string()
}

/// The next UTC midnight strictly after `now`; quota counters reset there.
pub fn next_utc_midnight(now: Timestamp) -> Timestamp {
    let tomorrow = now.date_naive() + Days::new(1);
    tomorrow
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid wall-clock time")
        .and_utc()
}

// ---------------------------------------------------------------------------
// Counter keys
// ---------------------------------------------------------------------------

/// Counter key for the per-user sliding window.
pub fn rate_limit_key(workspace_id: &str, user_id: &str, action: PipelineAction) -> String {
    format!("rl:{workspace_id}:{user_id}:{}", action.as_str())
}

/// Counter key for the workspace daily quota. Embedding the day makes a
/// fresh day a fresh key, so reset needs no stored state.
pub fn quota_key(workspace_id: &str, action: PipelineAction, now: Timestamp) -> String {
    format!("q:{workspace_id}:{}:{}", action.as_str(), utc_day_key(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    const WINDOW: Duration = Duration::from_secs(60);

    // -- decide_window ------------------------------------------------------

    #[test]
    fn missing_counter_starts_fresh_window() {
        let decision = decide_window(None, at(0), 10, WINDOW);
        assert_eq!(
            decision,
            CounterDecision::Admit(CounterDoc::start(at(0)))
        );
    }

    #[test]
    fn live_window_increments() {
        let doc = CounterDoc::start(at(0));
        let decision = decide_window(Some(&doc), at(30), 10, WINDOW);
        match decision {
            CounterDecision::Admit(next) => {
                assert_eq!(next.count, 2);
                assert_eq!(next.window_start, at(0));
                assert_eq!(next.updated_at, at(30));
            }
            CounterDecision::Refuse => panic!("should admit under the limit"),
        }
    }

    #[test]
    fn full_window_refuses_without_increment() {
        let mut doc = CounterDoc::start(at(0));
        doc.count = 10;
        assert_eq!(
            decide_window(Some(&doc), at(30), 10, WINDOW),
            CounterDecision::Refuse
        );
    }

    #[test]
    fn expired_window_resets_even_when_full() {
        let mut doc = CounterDoc::start(at(0));
        doc.count = 10;
        let decision = decide_window(Some(&doc), at(60), 10, WINDOW);
        assert_eq!(
            decision,
            CounterDecision::Admit(CounterDoc::start(at(60)))
        );
    }

    #[test]
    fn eleventh_call_in_window_refused() {
        let mut doc: Option<CounterDoc> = None;
        for i in 0..10 {
            match decide_window(doc.as_ref(), at(i), 10, WINDOW) {
                CounterDecision::Admit(next) => doc = Some(next),
                CounterDecision::Refuse => panic!("call {i} should be admitted"),
            }
        }
        assert_eq!(
            decide_window(doc.as_ref(), at(10), 10, WINDOW),
            CounterDecision::Refuse
        );
    }

    // -- decide_day ---------------------------------------------------------

    #[test]
    fn day_counter_never_expires_within_its_key() {
        let mut doc = CounterDoc::start(at(0));
        doc.count = 500;
        // far beyond any window length, still refused
        assert_eq!(
            decide_day(Some(&doc), at(86_000), 500),
            CounterDecision::Refuse
        );
    }

    #[test]
    fn day_counter_under_limit_increments() {
        let doc = CounterDoc::start(at(0));
        match decide_day(Some(&doc), at(10), 500) {
            CounterDecision::Admit(next) => assert_eq!(next.count, 2),
            CounterDecision::Refuse => panic!("should admit under the limit"),
        }
    }

    // -- retry_after --------------------------------------------------------

    #[test]
    fn retry_after_rounds_up() {
        // 30.5s elapsed of 60 -> 29.5s remaining -> 30
        let start = at(0);
        let now = start + chrono::Duration::milliseconds(30_500);
        assert_eq!(retry_after_secs(start, now, WINDOW), 30);
    }

    #[test]
    fn retry_after_is_at_least_one() {
        let start = at(0);
        let now = start + chrono::Duration::milliseconds(59_999);
        assert_eq!(retry_after_secs(start, now, WINDOW), 1);
    }

    #[test]
    fn retry_after_never_exceeds_window() {
        assert_eq!(retry_after_secs(at(0), at(0), WINDOW), 60);
    }

    // -- day boundaries and keys --------------------------------------------

    #[test]
    fn day_key_formats_utc_date() {
        let now = Utc.with_ymd_and_hms(2026, 8, 22, 23, 59, 59).unwrap();
        assert_eq!(utc_day_key(now), "20260822");
    }

    #[test]
    fn next_midnight_is_start_of_next_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 22, 23, 59, 59).unwrap();
        let midnight = next_utc_midnight(now);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap());

        // exactly at midnight rolls to the day after
        let at_midnight = Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap();
        assert_eq!(
            next_utc_midnight(at_midnight),
            Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn counter_keys_isolate_tenant_user_and_action() {
        let now = Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap();
        assert_eq!(
            rate_limit_key("ws_1", "user_9", PipelineAction::Publish),
            "rl:ws_1:user_9:publish"
        );
        assert_eq!(
            quota_key("ws_1", PipelineAction::Rollback, now),
            "q:ws_1:rollback:20260822"
        );
    }
}
