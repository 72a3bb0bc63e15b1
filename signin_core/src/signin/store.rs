//! External credential/user store contract.
//!
//! The orchestrator consumes this trait; it does not own credential storage.
//! Method verification semantics (password hashing, signature checks,
//! attestation policy, lockout thresholds) are the store's responsibility.

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failure talking to the store.
///
/// These propagate up and fail the current verification call outright; they
/// are never converted to a `Failed` outcome, since that would mask an
/// operational incident as user error.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store returned malformed or inconsistent data
    #[error("Data error: {0}")]
    Data(String),
}

/// Result of a password check, including the store's lockout bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerdict {
    /// Password matched and sign-in is allowed
    Verified,
    /// Password did not match (the store has already counted the failure)
    Invalid,
    /// The account is locked out
    LockedOut,
    /// Sign-in is disallowed for this account (e.g., unconfirmed email)
    NotAllowed,
}

/// Result of a FIDO2 assertion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionVerdict {
    /// Signature, origin, and challenge all checked out
    Verified {
        /// Updated signature counter to write back
        new_counter: u32,
    },
    /// The assertion did not verify
    Invalid,
}

/// A stored FIDO2 credential, referenced by the orchestrator but owned by
/// the store.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    /// Credential ID, base64url-encoded
    pub credential_id: String,
    /// User that owns this credential
    pub user_id: String,
    /// COSE public key bytes
    pub public_key: Vec<u8>,
    /// Signature counter at last use
    pub counter: u32,
    /// Transport hints for assertion options
    pub transports: Vec<String>,
    /// Whether this credential may satisfy both factors in one assertion
    pub is_passkey: bool,
}

/// The user/credential store consumed by the sign-in orchestrator.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Check a password and perform lockout bookkeeping for the attempt.
    async fn verify_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<PasswordVerdict, StoreError>;

    /// Whether a second factor is required for this user.
    async fn get_two_factor_enabled(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Whether the user may sign in with a passkey as a combined factor.
    async fn is_passkey_signin_enabled(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Whether sign-in is globally allowed for the account.
    async fn is_signin_allowed(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Whether the account is currently locked out.
    async fn is_locked_out(&self, user_id: &str) -> Result<bool, StoreError>;

    async fn find_credential_by_id(
        &self,
        credential_id: &str,
    ) -> Result<Option<StoredCredential>, StoreError>;

    async fn find_credentials_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoredCredential>, StoreError>;

    /// Verify a FIDO2 assertion (signature, origin, challenge) against a
    /// stored credential.
    async fn verify_assertion(
        &self,
        credential_id: &str,
        signature: &[u8],
        client_data: &[u8],
        authenticator_data: &[u8],
    ) -> Result<AssertionVerdict, StoreError>;

    /// Persist an updated signature counter after a verified assertion.
    async fn update_signature_counter(
        &self,
        credential_id: &str,
        counter: u32,
    ) -> Result<(), StoreError>;

    /// Verify a time-based one-time code from an authenticator app.
    async fn verify_totp_code(&self, user_id: &str, code: &str) -> Result<bool, StoreError>;

    /// Verify a one-time code issued through the emailed-code token provider.
    async fn verify_email_code(&self, user_id: &str, code: &str) -> Result<bool, StoreError>;

    /// Verify a recovery code and consume it on success.
    async fn verify_and_consume_recovery_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<bool, StoreError>;

    /// Count a failed secondary-factor attempt. Returns true when the
    /// account is now locked out.
    async fn record_failed_attempt(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Reset the lockout counter after a fully successful sign-in.
    async fn reset_lockout(&self, user_id: &str) -> Result<(), StoreError>;
}
