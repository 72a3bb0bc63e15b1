//! Signed session artifacts for the multi-factor state machine.
//!
//! The "awaiting second factor" and "remember this client" states are
//! represented as HMAC-SHA256-signed claim tokens handed back through the
//! caller, so the state machine is stateless on the server between steps and
//! survives multi-instance deployments and crash recovery.
//!
//! Token format: `base64url(claims JSON) . base64url(HMAC-SHA256)`, with the
//! MAC domain-separated by a per-purpose label so a pending token can never
//! be replayed as a remember-client token.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::signin::config::{
    AUTH_SERVER_SECRET, REMEMBER_CLIENT_COOKIE, REMEMBER_CLIENT_MAX_AGE,
    TWO_FACTOR_PENDING_COOKIE, TWO_FACTOR_PENDING_MAX_AGE,
};
use crate::signin::errors::SignInError;
use crate::signin::types::{PendingTwoFactorClaims, RememberClientClaims};
use crate::utils::{base64url_decode, base64url_encode, gen_random_string};

type HmacSha256 = Hmac<Sha256>;

const PENDING_PURPOSE: &str = "two-factor-pending";
const REMEMBER_PURPOSE: &str = "remember-client";

fn compute_signature(purpose: &str, payload: &str) -> Result<Vec<u8>, SignInError> {
    let mut mac = HmacSha256::new_from_slice(&AUTH_SERVER_SECRET)
        .map_err(|_| SignInError::Crypto("Failed to initialize HMAC".to_string()))?;
    mac.update(purpose.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sign_claims<T: Serialize>(purpose: &str, claims: &T) -> Result<String, SignInError> {
    let payload = base64url_encode(serde_json::to_vec(claims)?);
    let signature = base64url_encode(compute_signature(purpose, &payload)?);
    Ok(format!("{payload}.{signature}"))
}

fn verify_claims<T: DeserializeOwned>(purpose: &str, token: &str) -> Result<T, SignInError> {
    let (payload, signature) = token
        .split_once('.')
        .ok_or_else(|| SignInError::Token("Malformed token".to_string()))?;

    let presented = base64url_decode(signature)
        .map_err(|_| SignInError::Token("Malformed token signature".to_string()))?;
    let expected = compute_signature(purpose, payload)?;
    if presented.ct_eq(&expected).unwrap_u8() != 1 {
        return Err(SignInError::Token("Invalid token signature".to_string()));
    }

    let claims = base64url_decode(payload)
        .map_err(|_| SignInError::Token("Malformed token payload".to_string()))?;
    serde_json::from_slice(&claims)
        .map_err(|e| SignInError::Token(format!("Invalid token claims: {e}")))
}

/// Issue a pending-two-factor token for a user whose primary factor just
/// verified.
pub fn issue_pending_token(
    user_id: &str,
    login_provider: Option<&str>,
) -> Result<String, SignInError> {
    let now = Utc::now();
    let claims = PendingTwoFactorClaims {
        sub: user_id.to_string(),
        provider: login_provider.map(String::from),
        jti: gen_random_string(16)?,
        iat: now,
        exp: now + Duration::seconds(*TWO_FACTOR_PENDING_MAX_AGE),
    };
    sign_claims(PENDING_PURPOSE, &claims)
}

/// Verify a pending-two-factor token and return its claims.
///
/// A bad signature, malformed payload, or elapsed expiry all fail the same
/// way; callers treat any failure as "no pending state".
pub fn verify_pending_token(token: &str) -> Result<PendingTwoFactorClaims, SignInError> {
    let claims: PendingTwoFactorClaims = verify_claims(PENDING_PURPOSE, token)?;
    if claims.exp <= Utc::now() {
        tracing::debug!("Pending two-factor token expired for {}", claims.sub);
        return Err(SignInError::Token("Token expired".to_string()));
    }
    Ok(claims)
}

/// Issue a remember-client token after a successful secondary factor.
pub fn issue_remember_token(user_id: &str) -> Result<String, SignInError> {
    let now = Utc::now();
    let claims = RememberClientClaims {
        sub: user_id.to_string(),
        jti: gen_random_string(16)?,
        iat: now,
        exp: now + Duration::seconds(*REMEMBER_CLIENT_MAX_AGE),
    };
    sign_claims(REMEMBER_PURPOSE, &claims)
}

/// Verify a remember-client token for a specific user.
///
/// The token must verify, be unexpired, and have been issued for the same
/// user; a token remembered for one account never bypasses the second factor
/// of another.
pub fn verify_remember_token(token: &str, user_id: &str) -> Result<bool, SignInError> {
    let claims: RememberClientClaims = match verify_claims::<RememberClientClaims>(
        REMEMBER_PURPOSE,
        token,
    ) {
        Ok(claims) => claims,
        Err(_) => return Ok(false),
    };
    if claims.exp <= Utc::now() {
        return Ok(false);
    }
    Ok(claims.sub == user_id)
}

/// Pull the pending-two-factor token out of a request's cookies.
pub fn pending_token_from_cookies(cookies: &headers::Cookie) -> Option<String> {
    cookies
        .get(&TWO_FACTOR_PENDING_COOKIE)
        .map(ToString::to_string)
}

/// Pull the remember-client token out of a request's cookies.
pub fn remember_token_from_cookies(cookies: &headers::Cookie) -> Option<String> {
    cookies
        .get(&REMEMBER_CLIENT_COOKIE)
        .map(ToString::to_string)
}

pub(super) fn remember_cookie_max_age() -> i64 {
    *REMEMBER_CLIENT_MAX_AGE
}
