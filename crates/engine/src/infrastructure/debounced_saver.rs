//! Debounced, coalescing persistence.
//!
//! A background task owns the latest snapshot. `schedule` replaces it and
//! re-arms the timer, so a burst of changes turns into one write. `flush`
//! writes straight away and waits for the store to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::{SavedGame, StateStorePort, StoreError};

enum SaverCommand {
    Schedule(Box<SavedGame>),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaverCommand>,
    cancel_token: CancellationToken,
}

impl DebouncedSaver {
    /// Spawn the saver task. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn StateStorePort>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        tokio::spawn(run_saver(store, debounce, rx, cancel_token.clone()));
        Self { tx, cancel_token }
    }

    /// Replace the pending snapshot and restart the debounce window.
    pub fn schedule(&self, game: SavedGame) {
        if self.tx.send(SaverCommand::Schedule(Box::new(game))).is_err() {
            tracing::warn!("Saver task stopped, snapshot dropped");
        }
    }

    /// Write any pending snapshot now.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(SaverCommand::Flush(ack_tx))
            .map_err(|_| StoreError::SaverStopped)?;
        ack_rx.await.map_err(|_| StoreError::SaverStopped)?
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn write(store: &dyn StateStorePort, game: &SavedGame) -> Result<(), StoreError> {
    let result = store.save(game).await;
    if let Err(e) = &result {
        tracing::error!(session = %game.session.id, error = %e, "Failed to save game");
    }
    result
}

async fn run_saver(
    store: Arc<dyn StateStorePort>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<SaverCommand>,
    cancel_token: CancellationToken,
) {
    let mut pending: Option<Box<SavedGame>> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                if let Some(game) = pending.take() {
                    let _ = write(store.as_ref(), &game).await;
                }
                break;
            }
            command = rx.recv() => match command {
                Some(SaverCommand::Schedule(game)) => {
                    pending = Some(game);
                    deadline = Instant::now() + debounce;
                }
                Some(SaverCommand::Flush(ack)) => {
                    let result = match pending.take() {
                        Some(game) => write(store.as_ref(), &game).await,
                        None => Ok(()),
                    };
                    let _ = ack.send(result);
                }
                None => {
                    if let Some(game) = pending.take() {
                        let _ = write(store.as_ref(), &game).await;
                    }
                    break;
                }
            },
            _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                if let Some(game) = pending.take() {
                    let _ = write(store.as_ref(), &game).await;
                }
            }
        }
    }
    tracing::debug!("Saver task stopped");
}
