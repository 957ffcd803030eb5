//! The counter store seam: atomic read-modify-write over throttle keys.

use async_trait::async_trait;

use folio_core::model::CounterDoc;
use folio_core::throttle::CounterDecision;

use crate::error::StoreError;

/// Decision callback run inside a counter transaction. Pure: it sees the
/// stored document (if any) and says what to do, nothing else.
pub type DecideFn<'a> = &'a (dyn Fn(Option<&CounterDoc>) -> CounterDecision + Send + Sync);

/// What a counter transaction observed and did.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterTxn {
    /// The document as read at the start of the transaction.
    pub before: Option<CounterDoc>,
    /// The document as written, `None` when the decision refused.
    pub committed: Option<CounterDoc>,
}

impl CounterTxn {
    pub fn admitted(&self) -> bool {
        self.committed.is_some()
    }
}

/// Atomic counters for rate limits and quotas.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Run `decide` against the counter at `key` under per-key isolation:
    /// the read, the decision, and the write happen with no interleaved
    /// writer on the same key. Two racing calls serialize, so a limit of
    /// N admits exactly N.
    async fn counter_transaction(
        &self,
        key: &str,
        decide: DecideFn<'_>,
    ) -> Result<CounterTxn, StoreError>;
}
