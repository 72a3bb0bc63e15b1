//! Sign-in orchestrator
//!
//! Drives authentication end to end: one primary factor (password or passkey
//! assertion), conditionally one secondary factor (TOTP authenticator,
//! emailed code, security-key assertion, recovery code), and the session
//! elevation decision. The "awaiting second factor" state lives in a signed,
//! expiring token handed back to the caller, never in process memory, so the
//! flow is resumable across requests and processes.
//!
//! Every verification attempt emits exactly one [`crate::LoginAttempt`]
//! through the audit pipeline, tagged with the factor actually attempted.

mod config;
mod errors;
mod main;
mod store;
mod types;

pub use errors::SignInError;
pub use main::SignInOrchestrator;
pub use main::{
    issue_pending_token, issue_remember_token, pending_token_from_cookies,
    remember_token_from_cookies, verify_pending_token, verify_remember_token,
};
pub use store::{
    AssertionVerdict, CredentialStore, PasswordVerdict, StoreError, StoredCredential,
};
pub use types::{
    ClientInfo, ElevatedSession, PasskeySignIn, PasswordSignIn, PendingTwoFactorClaims,
    RememberClientClaims, SecondFactor, SecondFactorSignIn,
};

pub use config::{
    EXTERNAL_LOGIN_COOKIE, REMEMBER_CLIENT_COOKIE, TWO_FACTOR_PENDING_COOKIE,
};
