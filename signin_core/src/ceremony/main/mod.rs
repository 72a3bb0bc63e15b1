mod bridge;
mod encoding;

pub use bridge::CeremonyBridge;
pub use encoding::{decode_assertion, decode_binary, encode_binary};
