//! In-flight request coalescing.
//!
//! Concurrent requests for the same key await one shared transport future.
//! The entry is removed as soon as any waiter observes completion, so a
//! later request always goes back to the network.

use crudio_core::{CrudResult, Envelope, NodeKey};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

type SharedRequest = Shared<BoxFuture<'static, CrudResult<Envelope>>>;

#[derive(Default)]
pub(crate) struct InFlight {
    pending: Mutex<HashMap<NodeKey, SharedRequest>>,
}

impl InFlight {
    /// Await the pending request for `key`, or start one with `start`.
    pub(crate) async fn run<F>(&self, key: &NodeKey, start: F) -> CrudResult<Envelope>
    where
        F: FnOnce() -> BoxFuture<'static, CrudResult<Envelope>>,
    {
        let request = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.get(key) {
                Some(existing) => {
                    tracing::debug!(node = %key, "Joining in-flight request");
                    existing.clone()
                }
                None => {
                    let request = start().shared();
                    pending.insert(key.clone(), request.clone());
                    request
                }
            }
        };

        let result = request.clone().await;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.get(key).is_some_and(|current| current.ptr_eq(&request)) {
            pending.remove(key);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sequential_runs_each_start() {
        let in_flight = InFlight::default();
        let starts = Arc::new(AtomicUsize::new(0));
        let key = NodeKey::new("home");

        for _ in 0..3 {
            let starts = Arc::clone(&starts);
            let result = in_flight
                .run(&key, move || {
                    starts.fetch_add(1, Ordering::SeqCst);
                    async { Ok(Envelope::failure("nope")) }.boxed()
                })
                .await;
            assert!(result.is_ok());
        }

        assert_eq!(starts.load(Ordering::SeqCst), 3);
        assert_eq!(in_flight.len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_one_start() {
        let in_flight = InFlight::default();
        let starts = Arc::new(AtomicUsize::new(0));
        let key = NodeKey::new("home");
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let rx = rx.shared();

        let make = |starts: Arc<AtomicUsize>, rx: Shared<tokio::sync::oneshot::Receiver<()>>| {
            move || {
                starts.fetch_add(1, Ordering::SeqCst);
                async move {
                    let _ = rx.await;
                    Ok(Envelope::failure("shared"))
                }
                .boxed()
            }
        };

        let first = in_flight.run(&key, make(Arc::clone(&starts), rx.clone()));
        let second = in_flight.run(&key, make(Arc::clone(&starts), rx.clone()));
        let release = async move {
            tokio::task::yield_now().await;
            let _ = tx.send(());
        };

        let (a, b, ()) = tokio::join!(first, second, release);
        assert_eq!(a, b);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.len(), 0);
    }
}
