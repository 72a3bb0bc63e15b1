use thiserror::Error;

/// Errors reported by the external audit sink and geolocation lookup.
///
/// These never propagate to the sign-in caller; the pipeline logs them and
/// moves on to the next queued attempt.
#[derive(Debug, Error, Clone)]
pub enum AuditError {
    /// Error persisting a login attempt to durable storage
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error during geolocation lookup
    #[error("Geolocation error: {0}")]
    Geolocation(String),

    /// Lookup abandoned because the pipeline is shutting down
    #[error("Lookup cancelled")]
    Cancelled,
}
