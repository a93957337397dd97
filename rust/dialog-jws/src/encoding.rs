//! Text encodings used by compact envelopes and verification methods.

use crate::error::JwtError;
use base58::FromBase58;
use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode,
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
    },
};

const STANDARD_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const URL_SAFE_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url.
pub fn encode_base64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url, rejecting padding and non-canonical trailing bits.
pub fn decode_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

/// Decode base64 in either alphabet, with or without padding.
pub fn decode_base64_any(s: &str) -> Result<Vec<u8>, JwtError> {
    let result = if s.contains(['-', '_']) {
        URL_SAFE_ANY_PADDING.decode(s)
    } else {
        STANDARD_ANY_PADDING.decode(s)
    };
    result.map_err(|e| JwtError::UnsupportedKeyEncoding(format!("invalid base64: {e}")))
}

/// Decode hex with an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, JwtError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| JwtError::UnsupportedKeyEncoding(format!("invalid hex: {e}")))
}

/// Decode base58btc.
pub fn decode_base58(s: &str) -> Result<Vec<u8>, JwtError> {
    s.from_base58()
        .map_err(|e| JwtError::UnsupportedKeyEncoding(format!("invalid base58: {e:?}")))
}

/// Decode a [multibase] string by its leading prefix character.
///
/// [multibase]: https://github.com/multiformats/multibase
pub fn decode_multibase(s: &str) -> Result<Vec<u8>, JwtError> {
    let mut chars = s.chars();
    let prefix = chars
        .next()
        .ok_or_else(|| JwtError::UnsupportedKeyEncoding("empty multibase string".into()))?;
    let body = chars.as_str();

    match prefix {
        'z' => decode_base58(body),
        'u' => decode_base64url(body)
            .map_err(|e| JwtError::UnsupportedKeyEncoding(format!("invalid base64url: {e}"))),
        'm' => decode_base64_any(body),
        'f' | 'F' => {
            hex::decode(body).map_err(|e| JwtError::UnsupportedKeyEncoding(format!("invalid hex: {e}")))
        }
        other => Err(JwtError::UnsupportedKeyEncoding(format!(
            "unsupported multibase prefix '{other}'"
        ))),
    }
}
