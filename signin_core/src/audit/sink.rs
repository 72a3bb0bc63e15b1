use std::net::IpAddr;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::errors::AuditError;
use super::types::{GeoPoint, LoginAttempt};

/// Durable storage for login-attempt records.
///
/// Implemented outside this crate (database, log shipper, ...). Persistence
/// failures are reported through the `Result` and tolerated by the pipeline:
/// the failed record is dropped and the consumer keeps going.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn persist_attempt(&self, attempt: &LoginAttempt) -> Result<(), AuditError>;
}

/// Best-effort IP-to-coordinates lookup.
///
/// The `cancel` token is scoped to the pipeline's lifetime, not to the
/// original sign-in request; implementations should return promptly once it
/// fires. Returning `Ok(None)` means the address could not be resolved,
/// which is not an error.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn lookup(
        &self,
        ip: IpAddr,
        cancel: &CancellationToken,
    ) -> Result<Option<GeoPoint>, AuditError>;
}
