use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::audit::sink::{AuditSink, GeoLocator};
use crate::audit::types::LoginAttempt;

/// Cloneable producer handle for the audit queue.
///
/// `enqueue` hands ownership of the record to the pipeline and returns
/// immediately; it never blocks the request path. Once the pipeline has shut
/// down, records are dropped with a warning.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::UnboundedSender<LoginAttempt>,
}

impl AuditHandle {
    pub fn enqueue(&self, attempt: LoginAttempt) {
        if let Err(e) = self.tx.send(attempt) {
            tracing::warn!("Audit pipeline is shut down, dropping login attempt: {}", e);
        }
    }
}

/// The background consumer of login-attempt records.
///
/// Exactly one pipeline runs per process. Producers enqueue from concurrent
/// sign-in flows; the single consumer drains strictly in arrival order,
/// enriches each record with best-effort geolocation, and persists it via the
/// sink. Each record is processed inside its own failure boundary so one bad
/// record cannot stop auditing for the rest of the process lifetime.
pub struct AuditPipeline {
    tx: mpsc::UnboundedSender<LoginAttempt>,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl AuditPipeline {
    /// Spawn the consumer task and return the pipeline controller.
    pub fn start(sink: Arc<dyn AuditSink>, geo: Arc<dyn GeoLocator>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(consume(rx, sink, geo, shutdown.clone()));
        Self {
            tx,
            shutdown,
            worker,
        }
    }

    /// Producer handle for the orchestrator.
    pub fn handle(&self) -> AuditHandle {
        AuditHandle {
            tx: self.tx.clone(),
        }
    }

    /// Stop accepting new records, cancel in-flight lookups, and wait for the
    /// consumer to drain what is already queued.
    pub async fn shutdown(self) {
        let Self {
            tx,
            shutdown,
            worker,
        } = self;
        shutdown.cancel();
        drop(tx);
        if let Err(e) = worker.await {
            tracing::error!("Audit consumer task ended abnormally: {}", e);
        }
    }
}

async fn consume(
    mut rx: mpsc::UnboundedReceiver<LoginAttempt>,
    sink: Arc<dyn AuditSink>,
    geo: Arc<dyn GeoLocator>,
    shutdown: CancellationToken,
) {
    tracing::debug!("Audit consumer started");
    loop {
        tokio::select! {
            attempt = rx.recv() => match attempt {
                Some(attempt) => {
                    process_one(attempt, sink.as_ref(), geo.as_ref(), &shutdown).await;
                }
                None => break,
            },
            _ = shutdown.cancelled() => {
                // Producer handles may still be alive elsewhere; stop
                // accepting new records and drain what is already queued so
                // shutdown never waits on them.
                rx.close();
                while let Ok(attempt) = rx.try_recv() {
                    process_one(attempt, sink.as_ref(), geo.as_ref(), &shutdown).await;
                }
                break;
            }
        }
    }
    tracing::debug!("Audit consumer drained, exiting");
}

/// Per-item failure boundary: enrichment and persistence errors are logged
/// and swallowed here so the consumer loop survives them.
async fn process_one(
    mut attempt: LoginAttempt,
    sink: &dyn AuditSink,
    geo: &dyn GeoLocator,
    shutdown: &CancellationToken,
) {
    if let Some(ip) = attempt.ip_address {
        match geo.lookup(ip, shutdown).await {
            Ok(Some(point)) => {
                attempt.geolocation = Some(point);
            }
            Ok(None) => {
                tracing::trace!("No geolocation for {}", ip);
            }
            Err(e) => {
                tracing::debug!("Geolocation lookup failed for {}: {}", ip, e);
            }
        }
    }

    if let Err(e) = sink.persist_attempt(&attempt).await {
        tracing::error!("Failed to persist login attempt {}: {}", attempt.id, e);
    }
}
