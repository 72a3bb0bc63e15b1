//! Authenticator ceremony bridge
//!
//! A WebAuthn ceremony (credential creation or assertion) happens on a remote
//! client, against its native authenticator API, across a bidirectional
//! channel. This module makes that exchange look like a single awaitable call
//! to the orchestrator: allocate a correlation handle, send the options to
//! the client, and park the caller until exactly one of {client success,
//! client error, caller cancellation, deadline} wins.

mod config;
mod errors;
mod main;
mod types;

pub use errors::CeremonyError;
pub use main::CeremonyBridge;
pub use main::{decode_assertion, decode_binary, encode_binary};
pub use types::{
    AllowCredential, AssertionOptions, AssertionResponse, AuthenticatorAssertion, CeremonyKind,
    CeremonyRequest, ClientChannel, CompletionPayload, DecodedAssertion,
};

pub(crate) use config::CEREMONY_CLIENT_TIMEOUT;
