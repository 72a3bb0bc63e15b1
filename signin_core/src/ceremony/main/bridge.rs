use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;

use crate::ceremony::config::CEREMONY_TIMEOUT;
use crate::ceremony::errors::CeremonyError;
use crate::ceremony::types::{
    AssertionOptions, AssertionResponse, CeremonyKind, CeremonyRequest, ClientChannel,
    CompletionPayload,
};
use crate::utils::gen_random_string;

/// One in-flight ceremony, keyed in the registry by its correlation handle.
///
/// Removing the entry from the registry is the atomic claim on the completion
/// slot: whichever path removes it first (client completion or local
/// cancellation) owns the outcome, and every later writer becomes a no-op.
struct PendingCeremony {
    tx: oneshot::Sender<Result<Value, CeremonyError>>,
}

/// Coordinates client-side authenticator ceremonies.
///
/// `request_ceremony` allocates a correlation handle, sends the serialized
/// options over the client channel, and awaits the completion slot. The
/// client resolves it through [`CeremonyBridge::complete`]; cancellation and
/// the deadline resolve it locally and send a best-effort abort to the
/// client.
pub struct CeremonyBridge {
    channel: Arc<dyn ClientChannel>,
    pending: Mutex<HashMap<String, PendingCeremony>>,
}

impl CeremonyBridge {
    pub fn new(channel: Arc<dyn ClientChannel>) -> Self {
        Self {
            channel,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run one ceremony end to end and return the client's raw result.
    ///
    /// Resolves with `CeremonyError::Client` if the client reports a failure,
    /// `Cancelled` if `cancel` fires first, and `TimedOut` if neither side
    /// settles the operation within the configured deadline.
    pub async fn request_ceremony(
        &self,
        kind: CeremonyKind,
        options: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, CeremonyError> {
        let handle = gen_random_string(16)?;
        let (tx, rx) = oneshot::channel();

        self.pending
            .lock()
            .await
            .insert(handle.clone(), PendingCeremony { tx });

        tracing::debug!("Starting {:?} ceremony {}", kind, handle);

        let request = CeremonyRequest {
            kind,
            handle: handle.clone(),
            options,
        };
        if let Err(e) = self.channel.send_request(request).await {
            // The client never saw this ceremony; just unregister it.
            self.pending.lock().await.remove(&handle);
            return Err(e);
        }

        let deadline = Duration::from_secs(*CEREMONY_TIMEOUT);
        tokio::select! {
            outcome = rx => match outcome {
                Ok(result) => result,
                // Sender dropped without resolving: only possible if the
                // registry entry vanished without a send, treat as channel loss.
                Err(_) => Err(CeremonyError::Channel(
                    "Completion slot dropped before resolution".to_string(),
                )),
            },
            _ = cancel.cancelled() => {
                self.abandon(&handle).await;
                Err(CeremonyError::Cancelled)
            }
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!("Ceremony {} deadline elapsed", handle);
                self.abandon(&handle).await;
                Err(CeremonyError::TimedOut)
            }
        }
    }

    /// Request an assertion ceremony and deserialize the typed response.
    pub async fn request_assertion(
        &self,
        options: &AssertionOptions,
        cancel: &CancellationToken,
    ) -> Result<AssertionResponse, CeremonyError> {
        let raw = self
            .request_ceremony(CeremonyKind::Get, serde_json::to_value(options)?, cancel)
            .await?;
        serde_json::from_value(raw)
            .map_err(|e| CeremonyError::Format(format!("Invalid assertion response: {e}")))
    }

    /// Single completion entry point invoked by the client runtime.
    ///
    /// The first writer wins: if the ceremony was already resolved (or never
    /// existed), the payload is ignored. A second invocation is a no-op, not
    /// an error.
    pub async fn complete(&self, payload: CompletionPayload) {
        let Some(pending) = self.pending.lock().await.remove(&payload.handle) else {
            tracing::debug!(
                "Ignoring completion for unknown or already-resolved ceremony {}",
                payload.handle
            );
            return;
        };

        let outcome = match (payload.result, payload.error) {
            (Some(result), None) => Ok(result),
            (None, Some(error)) => Err(CeremonyError::Client(error)),
            _ => Err(CeremonyError::Format(
                "Completion payload must carry exactly one of result or error".to_string(),
            )),
        };

        // The awaiting caller may have just been cancelled; nothing to do then.
        let _ = pending.tx.send(outcome);
    }

    /// Resolve a ceremony locally after cancellation or deadline, telling the
    /// client to dismiss its authenticator UI. The abort is best-effort: the
    /// client may have completed already or the channel may be gone.
    async fn abandon(&self, handle: &str) {
        if self.pending.lock().await.remove(handle).is_none() {
            // A client completion claimed the slot first.
            return;
        }
        if let Err(e) = self.channel.send_abort(handle).await {
            tracing::debug!("Abort for ceremony {} not delivered: {}", handle, e);
        }
    }

    /// Number of unresolved ceremonies, for tests and diagnostics.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
