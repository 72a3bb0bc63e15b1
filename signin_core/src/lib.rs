//! signin-core - Multi-factor sign-in coordination library
//!
//! This crate provides the authentication core of an identity platform's
//! sign-in surface: a multi-factor orchestrator (password, passkey, TOTP,
//! emailed codes, security keys, recovery codes), a bridge that turns remote
//! authenticator ceremonies into awaitable calls, and a decoupled audit
//! pipeline for login-attempt records. Credential storage, session minting,
//! and the HTTP layer live outside this crate, behind the traits exported
//! here.

mod audit;
mod ceremony;
mod signin;
mod utils;


// Re-export the orchestrator and its collaborator contracts
pub use signin::{
    AssertionVerdict, ClientInfo, CredentialStore, ElevatedSession, PasskeySignIn, PasswordSignIn,
    PasswordVerdict, PendingTwoFactorClaims, RememberClientClaims, SecondFactor,
    SecondFactorSignIn, SignInError, SignInOrchestrator, StoreError, StoredCredential,
};

pub use signin::{
    issue_pending_token, issue_remember_token, pending_token_from_cookies,
    remember_token_from_cookies, verify_pending_token, verify_remember_token,
};

// Re-export the cookie names consumed by the HTTP layer
pub use signin::{EXTERNAL_LOGIN_COOKIE, REMEMBER_CLIENT_COOKIE, TWO_FACTOR_PENDING_COOKIE};

pub use ceremony::{
    AllowCredential, AssertionOptions, AssertionResponse, AuthenticatorAssertion, CeremonyBridge,
    CeremonyError, CeremonyKind, CeremonyRequest, ClientChannel, CompletionPayload,
    DecodedAssertion, decode_assertion, decode_binary, encode_binary,
};

pub use audit::{
    AuditError, AuditHandle, AuditPipeline, AuditSink, AuthMethod, GeoLocator, GeoPoint,
    LoginAttempt, SignInOutcome,
};
