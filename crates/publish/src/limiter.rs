//! Per-user sliding-window rate limiter.
//!
//! Counters live in the store, keyed per (workspace, user, action); the
//! window decision itself is pure ([`folio_core::throttle`]). Consuming
//! an admission and checking the limit are one counter transaction, so
//! concurrent requests cannot overshoot the limit.

use std::sync::Arc;

use serde::Serialize;

use folio_core::actions::{rate_limit_rule, PipelineAction};
use folio_core::ids::Clock;
use folio_core::model::CounterDoc;
use folio_core::throttle::{decide_window, rate_limit_key, retry_after_secs, CounterDecision};
use folio_store::CounterStore;

use crate::error::PipelineError;

/// What an admitted request has left in its window.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitReceipt {
    pub limit: u32,
    pub remaining: u32,
}

pub struct RateLimiter {
    counters: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(counters: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { counters, clock }
    }

    /// Check the caller's window for `action` and consume one admission.
    /// Refusals say how long to wait; they never mutate the counter.
    pub async fn check_and_consume(
        &self,
        workspace_id: &str,
        user_id: &str,
        action: PipelineAction,
    ) -> Result<RateLimitReceipt, PipelineError> {
        let rule = rate_limit_rule(action);
        let now = self.clock.now();
        let key = rate_limit_key(workspace_id, user_id, action);

        let decide = move |existing: Option<&CounterDoc>| {
            decide_window(existing, now, rule.limit, rule.window)
        };
        let txn = self.counters.counter_transaction(&key, &decide).await?;

        match txn.committed {
            Some(doc) => Ok(RateLimitReceipt {
                limit: rule.limit,
                remaining: rule.limit.saturating_sub(doc.count),
            }),
            None => {
                // A refusal implies a live window was observed.
                let window_start = txn
                    .before
                    .map(|doc| doc.window_start)
                    .unwrap_or(now);
                let retry_after = retry_after_secs(window_start, now, rule.window);
                tracing::warn!(
                    workspace_id,
                    user_id,
                    action = action.as_str(),
                    retry_after_secs = retry_after,
                    "Rate limit exceeded"
                );
                Err(PipelineError::RateLimited {
                    action,
                    limit: rule.limit,
                    retry_after_secs: retry_after,
                })
            }
        }
    }
}
