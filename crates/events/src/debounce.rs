//! Restartable quiet-period debouncing.
//!
//! Standard debounce semantics: of a burst of events, only the last one is
//! forwarded, once the quiet period has elapsed with no newer arrival. A
//! new event inside the window replaces the held one and restarts the wait.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Forward events from `rx` to `tx`, collapsing bursts.
///
/// Runs until cancelled or until `rx` closes; a held event is flushed on
/// close so a final change is never lost. Exits early if `tx` closes.
pub async fn debounce<T: Send>(
    mut rx: mpsc::Receiver<T>,
    tx: mpsc::Sender<T>,
    quiet: Duration,
    cancel: CancellationToken,
) {
    let mut pending: Option<T> = None;

    loop {
        match pending.take() {
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    item = rx.recv() => match item {
                        Some(value) => pending = Some(value),
                        None => return,
                    },
                }
            }
            Some(held) => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    item = rx.recv() => match item {
                        // A newer event replaces the held one and restarts
                        // the quiet period.
                        Some(value) => pending = Some(value),
                        None => {
                            let _ = tx.send(held).await;
                            return;
                        }
                    },
                    _ = tokio::time::sleep(quiet) => {
                        if tx.send(held).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(1000);

    fn spawn_debounce(
        cancel: CancellationToken,
    ) -> (mpsc::Sender<u32>, mpsc::Receiver<u32>) {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::channel(16);
        tokio::spawn(debounce(in_rx, out_tx, QUIET, cancel));
        (in_tx, out_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_the_last_event() {
        let (tx, mut rx) = spawn_debounce(CancellationToken::new());

        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        tx.send(3).await.unwrap();

        assert_eq!(rx.recv().await, Some(3));
        // Nothing else settles.
        tokio::time::sleep(QUIET * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn events_separated_by_the_quiet_period_all_settle() {
        let (tx, mut rx) = spawn_debounce(CancellationToken::new());

        tx.send(1).await.unwrap();
        assert_eq!(rx.recv().await, Some(1));

        tx.send(2).await.unwrap();
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn held_event_is_flushed_when_input_closes() {
        let (tx, mut rx) = spawn_debounce(CancellationToken::new());

        tx.send(7).await.unwrap();
        drop(tx);

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_drops_the_held_event() {
        let cancel = CancellationToken::new();
        let (tx, mut rx) = spawn_debounce(cancel.clone());

        tx.send(9).await.unwrap();
        // Let the debouncer pick the event up before cancelling.
        tokio::task::yield_now().await;
        cancel.cancel();

        assert_eq!(rx.recv().await, None);
    }
}
