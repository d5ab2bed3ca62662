//! Consultation gate: countdown and fire-once resolution.
//!
//! The pending consultation itself lives in the pipeline state. The gate keeps
//! what is needed to end it: the countdown's [`CancellationToken`] and the
//! oneshot sender the raiser listens on. Both are consumed together by
//! [`GateSlot::resolve`], so a consultation can only be resolved once.

use conductor_domain::{ConsultationId, ConsultationOutcome};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Resolution state of the consultation currently pending.
pub(crate) struct GateSlot {
    pub(crate) id: ConsultationId,
    cancel: CancellationToken,
    responder: oneshot::Sender<ConsultationOutcome>,
}

impl GateSlot {
    pub(crate) fn new(
        id: ConsultationId,
        cancel: CancellationToken,
        responder: oneshot::Sender<ConsultationOutcome>,
    ) -> Self {
        Self {
            id,
            cancel,
            responder,
        }
    }

    /// Cancel the countdown and deliver `outcome` to the raiser.
    pub(crate) fn resolve(self, outcome: ConsultationOutcome) {
        self.cancel.cancel();
        // The raiser may have dropped its handle; nothing else to do then.
        let _ = self.responder.send(outcome);
    }
}

/// Returned by `raise_consultation`; yields the outcome exactly once.
#[derive(Debug)]
pub struct ConsultationHandle {
    id: ConsultationId,
    receiver: oneshot::Receiver<ConsultationOutcome>,
}

impl ConsultationHandle {
    pub(crate) fn new(id: ConsultationId, receiver: oneshot::Receiver<ConsultationOutcome>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> ConsultationId {
        self.id
    }

    /// Wait for the consultation to end.
    pub async fn outcome(self) -> ConsultationOutcome {
        self.receiver
            .await
            .unwrap_or(ConsultationOutcome::Discarded)
    }

    /// Non-blocking check; `None` while still pending.
    pub fn try_outcome(&mut self) -> Option<ConsultationOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(ConsultationOutcome::Discarded),
        }
    }
}

/// What the countdown loop reports back to its owner.
pub(crate) trait CountdownSink: Send + Sync + 'static {
    fn on_tick(&self, id: ConsultationId, remaining_secs: u64);
    fn on_elapsed(&self, id: ConsultationId);
}

/// Run a consultation countdown until it elapses or `cancel` fires.
///
/// Ticks every `tick` for display; expiry happens at exactly `timeout_secs`
/// after the start, independent of the tick interval. A zero `tick` disables
/// ticking, and a timeout past the clock's range never expires.
pub(crate) async fn run_countdown<S: CountdownSink + ?Sized>(
    sink: &S,
    id: ConsultationId,
    timeout_secs: u64,
    tick: Duration,
    cancel: CancellationToken,
) {
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);
    let expiry = sleep_until_or_never(start.checked_add(timeout));
    tokio::pin!(expiry);

    let mut ticker = start
        .checked_add(tick)
        .filter(|_| !tick.is_zero())
        .map(|first| {
            let mut ticker = tokio::time::interval_at(first, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = &mut expiry => break,
            _ = next_tick(&mut ticker) => {
                let left = timeout.saturating_sub(start.elapsed());
                sink.on_tick(id, ceil_secs(left));
            }
        }
    }

    if !cancel.is_cancelled() {
        sink.on_elapsed(id);
    }
}

async fn sleep_until_or_never(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 { secs + 1 } else { secs }
}
