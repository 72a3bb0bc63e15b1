use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::CeremonyError;

/// Kind of client-side authenticator operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CeremonyKind {
    /// `navigator.credentials.create(...)` on the client
    Create,
    /// `navigator.credentials.get(...)` on the client
    Get,
}

/// Request message sent to the client runtime to start a ceremony.
///
/// The correlation handle is opaque to the client; it must be echoed back in
/// the completion payload so the bridge can resolve the awaiting caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CeremonyRequest {
    pub kind: CeremonyKind,
    #[serde(rename = "correlationHandle")]
    pub handle: String,
    pub options: Value,
}

/// Payload for the client's single completion entry point.
///
/// Exactly one of `result` and `error` is populated. A payload carrying both
/// or neither is malformed and resolves the ceremony as a format error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionPayload {
    #[serde(rename = "correlationHandle")]
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompletionPayload {
    pub fn success(handle: impl Into<String>, result: Value) -> Self {
        Self {
            handle: handle.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(handle: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Transport seam to the client runtime.
///
/// `send_abort` is fire-and-forget: the client may have already completed or
/// disconnected, so errors on that path are swallowed by the bridge.
#[async_trait]
pub trait ClientChannel: Send + Sync {
    async fn send_request(&self, request: CeremonyRequest) -> Result<(), CeremonyError>;
    async fn send_abort(&self, handle: &str) -> Result<(), CeremonyError>;
}

/// Credential descriptor included in assertion options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowCredential {
    #[serde(rename = "type")]
    pub type_: String,
    /// Credential ID, base64url-encoded
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transports: Vec<String>,
}

/// Options for a `Get` ceremony (assertion request).
///
/// Binary fields (challenge, credential ids) are carried base64url-encoded;
/// the client decodes them to raw bytes before invoking its native API, and
/// the bridge's encoding helpers guarantee an exact round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionOptions {
    /// Challenge bytes, base64url-encoded
    pub challenge: String,
    /// Client-side timeout in milliseconds
    pub timeout: u32,
    #[serde(rename = "rpId")]
    pub rp_id: String,
    #[serde(rename = "allowCredentials")]
    pub allow_credentials: Vec<AllowCredential>,
    #[serde(rename = "userVerification")]
    pub user_verification: String,
}

/// Inner authenticator output of an assertion ceremony, all fields
/// base64url-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatorAssertion {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String,
    pub signature: String,
    #[serde(rename = "userHandle", skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Typed response for a `Get` ceremony as reported by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionResponse {
    /// Credential ID, base64url-encoded
    pub id: String,
    pub response: AuthenticatorAssertion,
}

/// An assertion response with its binary fields normalized back to raw bytes,
/// ready to hand to the credential store for verification.
#[derive(Debug, Clone)]
pub struct DecodedAssertion {
    pub credential_id: String,
    pub client_data: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}
