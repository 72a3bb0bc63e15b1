use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication factor used for a verification attempt.
///
/// Every secondary method shares one orchestrator entry point, but the audit
/// record always carries the factor actually attempted, never a generic
/// "second factor" tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Password,
    Passkey,
    Authenticator,
    Email,
    SecurityKey,
    RecoveryCode,
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignInOutcome {
    Succeeded,
    Failed,
    TwoFactorRequired,
    LockedOut,
    NotAllowed,
}

/// Geographic coordinates resolved from a client IP address.
///
/// Latitude and longitude are always set together; an attempt either has a
/// full `GeoPoint` or no geolocation at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// An immutable audit fact about one verification attempt.
///
/// Created by the orchestrator the instant a verification step produces an
/// outcome and enqueued immediately. The pipeline's consumer populates
/// `geolocation` at most once (only when the lookup succeeds) before
/// persisting; the record is never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Unique identifier of this attempt
    pub id: String,
    /// User the attempt was made for, when one could be resolved
    pub user_id: Option<String>,
    /// Factor actually attempted
    pub method: AuthMethod,
    /// How the attempt ended
    pub outcome: SignInOutcome,
    /// Client IP address, when known
    pub ip_address: Option<IpAddr>,
    /// Resolved coordinates; populated by the audit pipeline on lookup success
    pub geolocation: Option<GeoPoint>,
    /// Client user agent string
    pub user_agent: String,
    /// When the attempt was made
    pub created_at: DateTime<Utc>,
}

impl LoginAttempt {
    pub fn new(
        user_id: Option<String>,
        method: AuthMethod,
        outcome: SignInOutcome,
        ip_address: Option<IpAddr>,
        user_agent: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            method,
            outcome,
            ip_address,
            geolocation: None,
            user_agent,
            created_at: Utc::now(),
        }
    }
}
