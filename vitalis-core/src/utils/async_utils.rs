//! Asynchronous Utilities for Vitalis Core.
//!
//! Small wrappers around the `tokio` runtime so that callers share one
//! vocabulary for spawning, deadline waits and periodic ticks.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Spawns a new asynchronous task on the current Tokio runtime.
pub fn spawn_task<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}

/// Pauses until `deadline`. Callers that spawn a timer compute the deadline
/// before spawning so that the wait does not start late.
pub async fn sleep_until(deadline: Instant) {
    time::sleep_until(deadline).await
}

/// Creates an interval whose first tick completes at `start` and which
/// delays, rather than bursts, after a stall.
pub fn interval_at(start: Instant, period: Duration) -> Interval {
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
