//! Call Deduplication (single-flight)
//!
//! Guarantees at most one in-flight execution per key inside a process.
//! Concurrent callers asking for the same key share the first caller's
//! computation and all observe its exact outcome; once it finishes, the key is
//! forgotten and the next call runs fresh. Nothing here retries.
//!
//! The work runs on its own tokio task, so it finishes and clears its marker
//! even when every caller has stopped waiting. A panic inside the work
//! reaches the callers as an error built from the `JoinError`.
//!
//! The in-flight table lock is only held while a marker is looked up,
//! inserted or removed, never while the deduplicated work runs.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinError;

type InFlight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

type Calls<T, E> = Arc<Mutex<HashMap<String, InFlight<T, E>>>>;

pub struct SingleFlight<T, E> {
    calls: Calls<T, E>,
}

/// Removes the marker for `key` when the task owning the work ends,
/// whether it returned or panicked.
struct Forget<T, E> {
    calls: Calls<T, E>,
    key: String,
}

impl<T, E> Drop for Forget<T, E> {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.key);
    }
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `f` for `key` unless a call for the same key is already in
    /// flight, in which case its result is awaited and returned instead.
    pub async fn call<F, Fut>(&self, key: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key) {
                tracing::debug!(key, "joining in-flight call");
                call.clone()
            } else {
                let forget = Forget {
                    calls: Arc::clone(&self.calls),
                    key: key.to_string(),
                };
                // The task cannot clear its marker before it is inserted:
                // removal waits for the table lock held here.
                let handle = tokio::spawn(async move {
                    let _forget = forget;
                    f().await
                });
                let call = handle
                    .map(|joined| joined.unwrap_or_else(|e| Err(E::from(e))))
                    .boxed()
                    .shared();
                calls.insert(key.to_string(), call.clone());
                call
            }
        };

        call.await
    }

    /// Number of keys with a call currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
