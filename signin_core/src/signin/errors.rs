use thiserror::Error;

use crate::ceremony::CeremonyError;
use crate::signin::store::StoreError;
use crate::utils::UtilError;

/// Errors that can occur while orchestrating a sign-in flow.
///
/// These are operational failures, not verification outcomes: a wrong
/// password or an expired pending token resolves to a
/// [`crate::SignInOutcome`], never to an error, so the caller cannot
/// distinguish "didn't try" from "tried wrong". Errors here mean the flow
/// itself could not run (store connectivity, ceremony transport, crypto).
#[derive(Debug, Error)]
pub enum SignInError {
    /// Error signing or verifying a session artifact
    #[error("Token error: {0}")]
    Token(String),

    /// Error in cryptographic operations
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Error from the external credential/user store
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Error from the authenticator ceremony bridge
    #[error("Ceremony error: {0}")]
    Ceremony(CeremonyError),

    /// Error from utility operations
    #[error("Utils error: {0}")]
    Utils(UtilError),

    /// Error from JSON serialization/deserialization
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl SignInError {
    /// Log the error and return self, allowing method chaining at the point
    /// where the error is raised.
    pub fn log(self) -> Self {
        match &self {
            Self::Token(msg) => tracing::error!("Token error: {}", msg),
            Self::Crypto(msg) => tracing::error!("Crypto error: {}", msg),
            Self::Store(err) => tracing::error!("Store error: {}", err),
            Self::Ceremony(err) => tracing::error!("Ceremony error: {}", err),
            Self::Utils(err) => tracing::error!("Utils error: {}", err),
            Self::SerdeJson(err) => tracing::error!("Serde error: {}", err),
        }
        self
    }
}

// Custom From implementations that log on conversion

impl From<StoreError> for SignInError {
    fn from(err: StoreError) -> Self {
        let error = Self::Store(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<CeremonyError> for SignInError {
    fn from(err: CeremonyError) -> Self {
        let error = Self::Ceremony(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for SignInError {
    fn from(err: UtilError) -> Self {
        let error = Self::Utils(err);
        tracing::error!("{}", error);
        error
    }
}
