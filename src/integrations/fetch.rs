//! Cancellable fetches with observable loading state

use futures::future::{AbortHandle, Abortable};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

use super::backend::FetchError;

/// Run `op`, retrying up to `retries` more times on failure. The n-th
/// retry waits `delay * n`; cancellation is never retried.
pub async fn retry_with_backoff<T, F, Fut>(
    retries: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) if attempt >= retries => return Err(e),
            Err(e) => {
                attempt += 1;
                tracing::warn!("Fetch failed ({}), retry {}/{}", e, attempt, retries);
                tokio::time::sleep(delay * attempt).await;
            }
        }
    }
}

/// Observable state of a fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

/// A spawned fetch. Aborting or dropping the task guarantees its result is
/// never published.
pub struct FetchTask<T> {
    rx: watch::Receiver<FetchState<T>>,
    abort: AbortHandle,
}

impl<T: Clone + Send + Sync + 'static> FetchTask<T> {
    pub fn spawn<Fut>(fetch: Fut) -> Self
    where
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(FetchState::loading());
        let (abort, registration) = AbortHandle::new_pair();
        let guard = abort.clone();

        tokio::spawn(async move {
            let outcome = Abortable::new(fetch, registration).await;
            if guard.is_aborted() {
                return;
            }

            let state = match outcome {
                Ok(Ok(data)) => FetchState {
                    data: Some(data),
                    loading: false,
                    error: None,
                },
                Ok(Err(FetchError::Cancelled)) | Err(_) => return,
                Ok(Err(e)) => {
                    tracing::warn!("Fetch failed: {}", e);
                    FetchState {
                        data: None,
                        loading: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            let _ = tx.send(state);
        });

        Self { rx, abort }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FetchState<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the fetch settles. Returns the last published state when
    /// the fetch was aborted.
    pub async fn settled(&mut self) -> FetchState<T> {
        let _ = self.rx.wait_for(|state| !state.loading).await;
        self.rx.borrow().clone()
    }
}

impl<T> FetchTask<T> {
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }
}

impl<T> Drop for FetchTask<T> {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
