//! Worker pool draining the ingress channel.

use crate::adapters::TransportEvent;
use crate::handlers::EventHandler;
use gw_01_message_validation::{CredentialStore, TimeSource};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawns `count` workers sharing one receiver.
///
/// Each worker exits when the channel is closed and drained, or when
/// shutdown is signalled.
pub fn spawn_workers<C, T>(
    count: usize,
    handler: EventHandler<C, T>,
    rx: mpsc::Receiver<TransportEvent>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>>
where
    C: CredentialStore + 'static,
    T: TimeSource + 'static,
{
    let rx = Arc::new(Mutex::new(rx));

    (0..count.max(1))
        .map(|worker_id| {
            let handler = handler.clone();
            let rx = Arc::clone(&rx);
            let mut shutdown = shutdown.clone();

            tokio::spawn(async move {
                debug!(worker_id, "[gateway] Worker started");
                loop {
                    let next = tokio::select! {
                        event = async { rx.lock().await.recv().await } => event,
                        _ = shutdown.changed() => None,
                    };
                    let Some(event) = next else { break };
                    handler.handle(event).await;
                }
                info!(worker_id, "[gateway] Worker stopped");
            })
        })
        .collect()
}
