// src/encoding.rs

use bech32::{Bech32, Hrp};

use crate::error::{EngineError, Result};

/// Bech32 (not Bech32m) text for `data` under the given prefix.
/// Shelley base addresses run past the 90 character segwit limit; the
/// generic encoder only enforces the BCH code length.
pub fn bech32_encode(hrp: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(hrp).map_err(|e| EngineError::Encoding(format!("invalid prefix '{}': {}", hrp, e)))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| EngineError::Encoding(e.to_string()))
}

/// Base58 with the Bitcoin alphabet. No checksum is added here; Byron
/// addresses carry their own CRC inside the CBOR envelope.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Parses a hex string into bytes, tolerating surrounding whitespace and a `0x` prefix.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text).map_err(|e| EngineError::Encoding(format!("invalid hex '{}': {}", text, e)))
}
