use std::{env, sync::LazyLock};

/// Secret used to sign the pending-two-factor and remember-client tokens.
pub(super) static AUTH_SERVER_SECRET: LazyLock<Vec<u8>> =
    LazyLock::new(|| match env::var("AUTH_SERVER_SECRET") {
        Ok(secret) => secret.into_bytes(),
        Err(_) => "default_secret_key_change_in_production"
            .to_string()
            .into_bytes(),
    });

/// Lifetime of the pending-two-factor token in seconds. Kept short: it only
/// has to bridge the gap between the primary and secondary factor prompts.
pub(super) static TWO_FACTOR_PENDING_MAX_AGE: LazyLock<i64> = LazyLock::new(|| {
    env::var("TWO_FACTOR_PENDING_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(600)
});

/// Lifetime of the remember-client token in seconds (default 90 days).
pub(super) static REMEMBER_CLIENT_MAX_AGE: LazyLock<i64> = LazyLock::new(|| {
    env::var("REMEMBER_CLIENT_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(90 * 24 * 3600)
});

/// Cookie carrying the pending-two-factor token between requests.
pub static TWO_FACTOR_PENDING_COOKIE: LazyLock<String> = LazyLock::new(|| {
    env::var("TWO_FACTOR_PENDING_COOKIE")
        .ok()
        .unwrap_or("__Host-TwoFactorPending".to_string())
});

/// Cookie carrying the remember-client token.
pub static REMEMBER_CLIENT_COOKIE: LazyLock<String> = LazyLock::new(|| {
    env::var("REMEMBER_CLIENT_COOKIE")
        .ok()
        .unwrap_or("__Host-RememberClient".to_string())
});

/// Cookie set by an external login provider during the primary factor;
/// cleared once the session is elevated.
pub static EXTERNAL_LOGIN_COOKIE: LazyLock<String> = LazyLock::new(|| {
    env::var("EXTERNAL_LOGIN_COOKIE")
        .ok()
        .unwrap_or("__Host-ExternalLogin".to_string())
});

/// Relying-party identifier forwarded in security-key assertion options.
pub(super) static SIGNIN_RP_ID: LazyLock<String> = LazyLock::new(|| {
    env::var("SIGNIN_RP_ID")
        .ok()
        .unwrap_or("localhost".to_string())
});
