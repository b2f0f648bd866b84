//! Single-flight execution of an asynchronous operation
//!
//! At most one execution is pending at a time. Callers that arrive while it
//! is pending await the same future instead of starting another one. Once the
//! execution settles the slot is cleared, so the next caller starts fresh.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

struct Flight<T> {
    id: u64,
    future: Shared<BoxFuture<'static, T>>,
}

type Slot<T> = Arc<Mutex<Option<Flight<T>>>>;

/// Deduplicates concurrent executions of one operation.
///
/// # Example
///
/// ```
/// use markethub_common::SingleFlight;
///
/// let flight = SingleFlight::new();
/// let ok = futures::executor::block_on(flight.run(|| async { true }));
/// assert!(ok);
/// assert!(!flight.is_in_flight());
/// ```
pub struct SingleFlight<T> {
    slot: Slot<T>,
    next_id: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self { slot: Arc::new(Mutex::new(None)), next_id: AtomicU64::new(1) }
    }

    /// Run the operation built by `make`, or join the one already pending.
    ///
    /// `make` is only invoked when no execution is pending. The check and the
    /// registration of the new execution happen under one lock with no await
    /// in between, so two callers can never both start an execution.
    pub async fn run<F, Fut>(&self, make: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let future = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(flight) => {
                    debug!(flight_id = flight.id, "Joining pending execution");
                    flight.future.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let future = Self::settle(Arc::clone(&self.slot), id, make()).boxed().shared();
                    *slot = Some(Flight { id, future: future.clone() });
                    debug!(flight_id = id, "Starting execution");
                    future
                }
            }
        };

        future.await
    }

    /// Whether an execution is currently pending.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.slot.lock().is_some()
    }

    // Clears the slot from inside the shared future, so the slot empties as
    // soon as the work completes even if every original caller was dropped.
    async fn settle<Fut>(slot: Slot<T>, id: u64, work: Fut) -> T
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let output = work.await;

        let mut guard = slot.lock();
        if guard.as_ref().is_some_and(|flight| flight.id == id) {
            *guard = None;
        }
        drop(guard);

        debug!(flight_id = id, "Execution settled");
        output
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight").field("in_flight", &self.slot.lock().is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_execution() {
        let flight = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let start = |calls: Arc<AtomicUsize>, gate: Arc<Notify>| {
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    gate.notified().await;
                    true
                }
            }
        };

        let first = flight.run(start(calls.clone(), gate.clone()));
        let second = flight.run(start(calls.clone(), gate.clone()));
        let release = async {
            assert!(flight.is_in_flight());
            gate.notify_one();
        };

        let (a, b, ()) = tokio::join!(first, second, release);

        assert!(a && b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!flight.is_in_flight());
    }

    #[tokio::test]
    async fn settled_execution_is_not_reused() {
        let flight = SingleFlight::new();
        let calls = AtomicUsize::new(0);

        let first = flight
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { false }
            })
            .await;
        let second = flight
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { true }
            })
            .await;

        assert!(!first);
        assert!(second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn abandoned_execution_is_driven_by_next_caller() {
        let flight = SingleFlight::new();
        let gate = Arc::new(Notify::new());

        {
            let gate = gate.clone();
            let pending = flight.run(move || async move {
                gate.notified().await;
                7_u32
            });
            // Poll once to register the execution, then drop the caller.
            assert!(futures::poll!(Box::pin(pending)).is_pending());
        }
        assert!(flight.is_in_flight());

        gate.notify_one();
        let value = flight.run(|| async { 0_u32 }).await;

        assert_eq!(value, 7);
        assert!(!flight.is_in_flight());
    }
}
