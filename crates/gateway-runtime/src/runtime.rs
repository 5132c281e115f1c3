//! # Gateway Runtime
//!
//! Owns the shutdown signal and the spawned tasks.
//!
//! ## Startup Sequence
//!
//! 1. Start the metrics endpoint (when an address is configured)
//! 2. Spawn the worker pool on a bounded ingress channel
//! 3. Spawn the line-framed ingress on the given reader
//!
//! Ingress EOF closes the channel and the workers drain what is queued.
//! `shutdown()` stops ingress and workers without draining.

use crate::adapters::metrics_endpoint::serve_metrics;
use crate::adapters::{run_line_ingress, ResponsePublisher};
use crate::container::GatewayContainer;
use crate::handlers::spawn_workers;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The gateway runtime.
pub struct GatewayRuntime {
    container: Arc<GatewayContainer>,
    metrics_addr: Option<SocketAddr>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Tasks spawned by [`GatewayRuntime::start`].
pub struct RunningGateway {
    ingress: JoinHandle<std::io::Result<u64>>,
    workers: Vec<JoinHandle<()>>,
}

impl GatewayRuntime {
    pub fn new(container: GatewayContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            metrics_addr: None,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Serve `GET /metrics` on `addr` while running.
    pub fn with_metrics_addr(mut self, addr: SocketAddr) -> Self {
        self.metrics_addr = Some(addr);
        self
    }

    pub fn container(&self) -> &GatewayContainer {
        &self.container
    }

    /// Starts the metrics endpoint, workers and ingress.
    pub fn start<R>(&self, reader: R, publisher: Arc<dyn ResponsePublisher>) -> RunningGateway
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Secure IoT Gateway v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        if let Some(addr) = self.metrics_addr {
            let shutdown = self.shutdown_rx.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_metrics(addr, shutdown).await {
                    error!(addr = %addr, "Metrics endpoint failed: {}", e);
                }
            });
        }

        let (tx, rx) = mpsc::channel(config.ingress.channel_capacity);
        let workers = spawn_workers(
            config.ingress.workers,
            self.container.handler(publisher),
            rx,
            self.shutdown_rx.clone(),
        );
        let ingress = tokio::spawn(run_line_ingress(reader, tx, self.shutdown_rx.clone()));

        info!(
            workers = config.ingress.workers,
            channel_capacity = config.ingress.channel_capacity,
            "[gateway] ✓ Ready"
        );
        RunningGateway { ingress, workers }
    }

    /// Signals every task to stop.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }
}

impl RunningGateway {
    /// Waits for ingress to finish and the workers to exit.
    ///
    /// Returns the number of events ingested.
    pub async fn join(self) -> Result<u64> {
        let ingested = self
            .ingress
            .await
            .context("ingress task panicked")?
            .context("failed to read ingress")?;
        for worker in self.workers {
            worker.await.context("worker task panicked")?;
        }
        info!(ingested, "[gateway] All tasks stopped");
        Ok(ingested)
    }
}
