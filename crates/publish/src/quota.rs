//! Workspace daily quota enforcement.
//!
//! One counter per (workspace, action, UTC day). The day lives in the
//! key, so counters reset at midnight UTC by construction. Actions with
//! no configured ceiling are exempt and never touch a counter.

use std::sync::Arc;

use serde::Serialize;

use folio_core::actions::{daily_quota, PipelineAction};
use folio_core::ids::Clock;
use folio_core::model::CounterDoc;
use folio_core::throttle::{decide_day, next_utc_midnight, quota_key, CounterDecision};
use folio_core::types::Timestamp;
use folio_store::CounterStore;

use crate::error::PipelineError;

/// Today's consumption after an admitted request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaReceipt {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub reset_at: Timestamp,
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy)]
pub enum QuotaOutcome {
    /// One unit consumed from today's allowance.
    Consumed(QuotaReceipt),
    /// The action has no daily ceiling.
    Exempt,
}

pub struct QuotaEnforcer {
    counters: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl QuotaEnforcer {
    pub fn new(counters: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { counters, clock }
    }

    /// Check the workspace's allowance for `action` and consume one unit.
    pub async fn check_and_consume(
        &self,
        workspace_id: &str,
        action: PipelineAction,
    ) -> Result<QuotaOutcome, PipelineError> {
        let Some(limit) = daily_quota(action) else {
            return Ok(QuotaOutcome::Exempt);
        };

        let now = self.clock.now();
        let key = quota_key(workspace_id, action, now);

        let decide =
            move |existing: Option<&CounterDoc>| decide_day(existing, now, limit);
        let txn = self.counters.counter_transaction(&key, &decide).await?;

        match txn.committed {
            Some(doc) => Ok(QuotaOutcome::Consumed(QuotaReceipt {
                limit,
                used: doc.count,
                remaining: limit.saturating_sub(doc.count),
                reset_at: next_utc_midnight(now),
            })),
            None => {
                let reset_at = next_utc_midnight(now);
                tracing::warn!(
                    workspace_id,
                    action = action.as_str(),
                    limit,
                    reset_at = %reset_at,
                    "Daily quota exhausted"
                );
                Err(PipelineError::QuotaExceeded {
                    action,
                    limit,
                    reset_at,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use folio_core::ids::ManualClock;
    use folio_store::MemoryStore;

    fn enforcer() -> (QuotaEnforcer, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::new());
        (
            QuotaEnforcer::new(store.clone(), clock.clone()),
            clock,
            store,
        )
    }

    #[tokio::test]
    async fn consumes_and_reports_remaining() {
        let (quota, _clock, _store) = enforcer();

        let outcome = quota
            .check_and_consume("ws_1", PipelineAction::Publish)
            .await
            .unwrap();
        let receipt = match outcome {
            QuotaOutcome::Consumed(r) => r,
            QuotaOutcome::Exempt => panic!("publish is not exempt"),
        };
        assert_eq!(receipt.limit, 500);
        assert_eq!(receipt.used, 1);
        assert_eq!(receipt.remaining, 499);
        assert_eq!(
            receipt.reset_at,
            Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn unpublish_is_exempt_and_writes_nothing() {
        let (quota, clock, store) = enforcer();

        let outcome = quota
            .check_and_consume("ws_1", PipelineAction::Unpublish)
            .await
            .unwrap();
        assert_matches!(outcome, QuotaOutcome::Exempt);
        let key = folio_core::throttle::quota_key(
            "ws_1",
            PipelineAction::Unpublish,
            clock.now(),
        );
        assert!(store.counter(&key).is_none());
    }

    #[tokio::test]
    async fn exhausted_quota_refuses_with_reset_time() {
        let (quota, _clock, _store) = enforcer();

        for _ in 0..100 {
            quota
                .check_and_consume("ws_1", PipelineAction::Rollback)
                .await
                .unwrap();
        }

        let err = quota
            .check_and_consume("ws_1", PipelineAction::Rollback)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            PipelineError::QuotaExceeded {
                action: PipelineAction::Rollback,
                limit: 100,
                reset_at,
            } if reset_at == Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn new_utc_day_starts_fresh() {
        let (quota, clock, _store) = enforcer();

        for _ in 0..100 {
            quota
                .check_and_consume("ws_1", PipelineAction::Rollback)
                .await
                .unwrap();
        }
        assert!(quota
            .check_and_consume("ws_1", PipelineAction::Rollback)
            .await
            .is_err());

        // midnight passes; the key changes, so the counter is fresh
        clock.advance(chrono::Duration::hours(12));
        let outcome = quota
            .check_and_consume("ws_1", PipelineAction::Rollback)
            .await
            .unwrap();
        assert_matches!(outcome, QuotaOutcome::Consumed(r) if r.used == 1);
    }

    #[tokio::test]
    async fn workspaces_have_independent_quotas() {
        let (quota, _clock, _store) = enforcer();

        for _ in 0..100 {
            quota
                .check_and_consume("ws_1", PipelineAction::Rollback)
                .await
                .unwrap();
        }
        assert!(quota
            .check_and_consume("ws_2", PipelineAction::Rollback)
            .await
            .is_ok());
    }
}
