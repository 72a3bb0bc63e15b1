//! Byte-encoding normalization for ceremony payloads.
//!
//! Challenges, credential ids, and user handles cross the client channel as
//! base64url strings (no padding) and exist server-side as raw bytes. The
//! conversion is pure and stateless and round-trips exactly.

use crate::ceremony::errors::CeremonyError;
use crate::ceremony::types::{AssertionResponse, DecodedAssertion};
use crate::utils::{base64url_decode, base64url_encode};

/// Normalize raw bytes to the transport-safe string form.
pub fn encode_binary(input: impl AsRef<[u8]>) -> String {
    base64url_encode(input)
}

/// Normalize a transport string back to raw bytes.
pub fn decode_binary(input: &str) -> Result<Vec<u8>, CeremonyError> {
    base64url_decode(input)
        .map_err(|_| CeremonyError::Format(format!("Invalid base64url field: {input}")))
}

/// Decode every binary field of an assertion response in one pass, so the
/// orchestrator hands the store raw bytes only.
pub fn decode_assertion(response: &AssertionResponse) -> Result<DecodedAssertion, CeremonyError> {
    // The credential id stays in its encoded form for store lookups, but must
    // itself be valid base64url.
    decode_binary(&response.id)?;

    let user_handle = match &response.response.user_handle {
        Some(handle) => Some(decode_binary(handle)?),
        None => None,
    };

    Ok(DecodedAssertion {
        credential_id: response.id.clone(),
        client_data: decode_binary(&response.response.client_data_json)?,
        authenticator_data: decode_binary(&response.response.authenticator_data)?,
        signature: decode_binary(&response.response.signature)?,
        user_handle,
    })
}
