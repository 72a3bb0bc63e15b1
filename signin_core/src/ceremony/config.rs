use std::{env, sync::LazyLock};

/// Upper bound, in seconds, on how long the bridge waits for a client to
/// complete a ceremony. Enforced even when the caller supplies no timeout of
/// its own, so a client that disconnects without signaling cannot leak a
/// pending operation.
pub(crate) static CEREMONY_TIMEOUT: LazyLock<u64> = LazyLock::new(|| {
    env::var("CEREMONY_TIMEOUT")
        .map(|v| v.parse::<u64>().unwrap_or(300))
        .unwrap_or(300)
});

/// Timeout hint, in seconds, forwarded to the client's authenticator API
/// inside the ceremony options.
pub(crate) static CEREMONY_CLIENT_TIMEOUT: LazyLock<u32> = LazyLock::new(|| {
    env::var("CEREMONY_CLIENT_TIMEOUT")
        .map(|v| v.parse::<u32>().unwrap_or(60))
        .unwrap_or(60)
});
