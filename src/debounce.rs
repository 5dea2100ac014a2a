//! Trailing-edge debouncing of rapidly changing input

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

enum Message<T> {
    Value(T),
    Cancel,
}

/// Commits the most recent pushed value once no new value has arrived for
/// `delay`. Every push restarts the timer. Dropping the debouncer discards
/// a pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
    delay: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task; must be called inside a tokio runtime
    pub fn new<F, Fut>(delay: Duration, commit: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, delay, commit));
        Self { tx, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending one
    pub fn push(&self, value: T) {
        if self.tx.send(Message::Value(value)).is_err() {
            tracing::warn!("Debouncer task has stopped; dropping value");
        }
    }

    /// Discard the pending value, if any
    pub fn cancel(&self) {
        let _ = self.tx.send(Message::Cancel);
    }
}

async fn run<T, F, Fut>(mut rx: mpsc::UnboundedReceiver<Message<T>>, delay: Duration, commit: F)
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;

    loop {
        match pending.take() {
            None => match rx.recv().await {
                Some(Message::Value(value)) => pending = Some(value),
                Some(Message::Cancel) => {}
                None => break,
            },
            Some(value) => {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(Message::Value(next)) => pending = Some(next),
                        Some(Message::Cancel) => {}
                        None => break,
                    },
                    _ = tokio::time::sleep(delay) => commit(value).await,
                }
            }
        }
    }
}
