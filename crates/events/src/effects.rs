//! Bounded queue of retryable best-effort side effects.
//!
//! Cache purges and similar fire-and-forget work go through here instead
//! of inline `tokio::spawn`s: the queue bounds memory, the worker retries
//! transient failures, and shutdown drains what was already accepted.
//! Enqueueing never blocks a request; a full queue drops the effect and
//! reports it to the caller.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Default number of queued effects before enqueueing starts refusing.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Retry delays in seconds (exponential backoff: 1 s, 2 s). Together with
/// the initial try this gives each effect three attempts.
const RETRY_DELAYS_SECS: [u64; 2] = [1, 2];

/// Error produced by a failed effect attempt. Opaque on purpose: the
/// worker only logs these, it never branches on them.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EffectError(pub String);

impl EffectError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type EffectFuture = BoxFuture<'static, Result<(), EffectError>>;

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// One retryable unit of background work. The factory closure is invoked
/// once per attempt, so the effect owns (clones of) everything it needs.
pub struct Effect {
    label: &'static str,
    run: Box<dyn Fn() -> EffectFuture + Send + Sync>,
}

impl Effect {
    pub fn new(
        label: &'static str,
        run: impl Fn() -> EffectFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            run: Box::new(run),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect").field("label", &self.label).finish()
    }
}

// ---------------------------------------------------------------------------
// EffectQueue
// ---------------------------------------------------------------------------

/// Cheaply cloneable handle for enqueueing effects.
#[derive(Clone)]
pub struct EffectQueue {
    tx: mpsc::Sender<Effect>,
}

impl EffectQueue {
    /// Create a queue and the worker that will drain it. The caller owns
    /// running the worker (typically `tokio::spawn(worker.run(cancel))`).
    pub fn bounded(capacity: usize) -> (Self, EffectWorker) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, EffectWorker { rx })
    }

    /// Try to enqueue an effect. Returns `false` when the queue is full
    /// or shut down; the effect is dropped in that case.
    pub fn enqueue(&self, effect: Effect) -> bool {
        match self.tx.try_send(effect) {
            Ok(()) => true,
            Err(err) => {
                let (label, reason) = match &err {
                    TrySendError::Full(e) => (e.label(), "queue full"),
                    TrySendError::Closed(e) => (e.label(), "queue closed"),
                };
                tracing::warn!(effect = label, reason, "Dropping background effect");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EffectWorker
// ---------------------------------------------------------------------------

/// Background task that drains the queue one effect at a time.
pub struct EffectWorker {
    rx: mpsc::Receiver<Effect>,
}

impl EffectWorker {
    /// Run until the queue closes or `cancel` fires. On cancellation,
    /// effects already accepted are given one final attempt each (no
    /// retries) before the worker exits.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                // Shutdown wins over new work when both are ready.
                biased;
                _ = cancel.cancelled() => break,
                effect = self.rx.recv() => match effect {
                    Some(effect) => process(effect).await,
                    None => {
                        tracing::debug!("Effect queue closed, worker exiting");
                        return;
                    }
                }
            }
        }

        self.rx.close();
        while let Some(effect) = self.rx.recv().await {
            if let Err(e) = (effect.run)().await {
                tracing::warn!(
                    effect = effect.label,
                    error = %e,
                    "Dropped queued effect during shutdown"
                );
            }
        }
        tracing::info!("Effect worker stopped");
    }
}

/// Run one effect with retry: initial attempt plus one retry per backoff
/// delay, then give up with an error log.
async fn process(effect: Effect) {
    let mut last_err = match (effect.run)().await {
        Ok(()) => return,
        Err(e) => e,
    };

    for (retry, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
        tracing::warn!(
            effect = effect.label,
            attempt = retry + 1,
            error = %last_err,
            "Background effect failed, retrying"
        );
        tokio::time::sleep(Duration::from_secs(*delay_secs)).await;

        match (effect.run)().await {
            Ok(()) => return,
            Err(e) => last_err = e,
        }
    }

    tracing::error!(
        effect = effect.label,
        error = %last_err,
        "Background effect failed after all retries, giving up"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
