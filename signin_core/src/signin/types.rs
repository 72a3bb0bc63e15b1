use std::net::IpAddr;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::audit::{AuthMethod, SignInOutcome};

/// Client metadata attached to every audited verification attempt.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<IpAddr>,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn new(ip_address: Option<IpAddr>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address,
            user_agent: user_agent.into(),
        }
    }
}

/// The secondary factor presented to [`super::SignInOrchestrator::verify_second_factor`].
///
/// A closed tagged union, matched in one place, so adding a method is an
/// auditable change rather than a new subclass.
#[derive(Debug, Clone)]
pub enum SecondFactor {
    /// Time-based one-time code from an authenticator app
    Authenticator { code: String },
    /// One-time code delivered by email
    Email { code: String },
    /// FIDO2 assertion performed through the ceremony bridge
    SecurityKey,
    /// Single-use recovery code
    RecoveryCode { code: String },
}

impl SecondFactor {
    /// The audit tag for this factor. Always the factor actually attempted,
    /// never a generic "second factor".
    pub fn method(&self) -> AuthMethod {
        match self {
            Self::Authenticator { .. } => AuthMethod::Authenticator,
            Self::Email { .. } => AuthMethod::Email,
            Self::SecurityKey => AuthMethod::SecurityKey,
            Self::RecoveryCode { .. } => AuthMethod::RecoveryCode,
        }
    }
}

/// Claims carried by the pending-two-factor token: primary factor verified,
/// awaiting secondary factor, with no server-side memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingTwoFactorClaims {
    /// Authenticated-but-unconfirmed user
    pub sub: String,
    /// Login provider used for the primary factor, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Unique token id
    pub jti: String,
    /// Issued at (UTC)
    pub iat: DateTime<Utc>,
    /// Expiration (UTC)
    pub exp: DateTime<Utc>,
}

/// Claims carried by the remember-client token. Bypasses only the secondary
/// factor for future primary-factor successes on the same client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RememberClientClaims {
    /// User the client is remembered for
    pub sub: String,
    /// Unique token id
    pub jti: String,
    /// Issued at (UTC)
    pub iat: DateTime<Utc>,
    /// Expiration (UTC)
    pub exp: DateTime<Utc>,
}

/// A fully elevated session decision, handed to the HTTP layer to mint the
/// actual session.
#[derive(Debug)]
pub struct ElevatedSession {
    pub user_id: String,
    /// Factor that completed the elevation
    pub method: AuthMethod,
    /// Authentication-method-reference claims (e.g. `mfa`)
    pub amr: Vec<String>,
    /// Login provider claim carried over from the primary factor
    pub login_provider: Option<String>,
    /// Whether the caller asked for a persistent session
    pub persistent: bool,
    /// Cookie mutations to apply to the response (pending/external-login
    /// cookies cleared, remember-client cookie set when requested)
    pub headers: HeaderMap,
}

/// Result of a password verification call.
#[derive(Debug)]
pub struct PasswordSignIn {
    pub outcome: SignInOutcome,
    /// Pending-two-factor token, present only on `TwoFactorRequired`
    pub pending_token: Option<String>,
    /// Elevated session, present only on `Succeeded`
    pub session: Option<ElevatedSession>,
}

/// Result of a passkey assertion verification call.
#[derive(Debug)]
pub struct PasskeySignIn {
    pub outcome: SignInOutcome,
    /// User the credential resolved to, when one could be resolved
    pub user_id: Option<String>,
    /// Elevated session, present only on `Succeeded`
    pub session: Option<ElevatedSession>,
}

/// Result of a second-factor verification call.
#[derive(Debug)]
pub struct SecondFactorSignIn {
    pub outcome: SignInOutcome,
    /// Elevated session, present only on `Succeeded`
    pub session: Option<ElevatedSession>,
}
