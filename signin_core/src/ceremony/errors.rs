use thiserror::Error;

use crate::utils::UtilError;

/// Errors that can occur while bridging a client-side authenticator ceremony.
///
/// `Client` means the client's authenticator reported a failure or the user
/// dismissed the prompt; `Cancelled` and `TimedOut` mean we gave up waiting.
/// The distinction matters to the UI layer: only client-side failures are
/// worth a "try again" prompt.
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// The client invoked the completion entry point with an error message
    #[error("Client reported error: {0}")]
    Client(String),

    /// The caller's cancellation token fired before the client completed
    #[error("Ceremony cancelled")]
    Cancelled,

    /// The ceremony deadline elapsed without a client completion
    #[error("Ceremony timed out")]
    TimedOut,

    /// The channel to the client failed while the ceremony was being set up
    #[error("Channel error: {0}")]
    Channel(String),

    /// Malformed options, completion payload, or binary field
    #[error("Invalid format: {0}")]
    Format(String),

    /// Error from utility operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from JSON serialization/deserialization
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
