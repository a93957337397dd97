//! Compact ECDSA signature encoding, and the signing/verification re-exports.
//!
//! JOSE encodes an ECDSA signature as the fixed-width concatenation
//! `r || s` (plus a trailing recovery byte for `ES256K-R`), then
//! base64url without padding. Scalars are always left-padded to 32
//! bytes, so a 64-byte signature is 86 characters and a 65-byte one is
//! 87 characters; the encoded length alone tells them apart.

pub mod signer;
pub mod verifier;

use crate::{
    encoding::{decode_base64url, encode_base64url},
    error::JwtError,
};
pub use signer::Signer;
pub use verifier::Verifier;

/// Width of a secp256k1 / P-256 scalar.
pub const SCALAR_LENGTH: usize = 32;

/// An ECDSA signature as `(r, s)` with an optional recovery bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureValue {
    r: [u8; SCALAR_LENGTH],
    s: [u8; SCALAR_LENGTH],
    recovery: Option<u8>,
}

impl SignatureValue {
    /// Create a signature from fixed-width scalars.
    pub const fn new(r: [u8; SCALAR_LENGTH], s: [u8; SCALAR_LENGTH], recovery: Option<u8>) -> Self {
        Self { r, s, recovery }
    }

    /// Create a signature from big-endian integers of any width up to 32 bytes.
    ///
    /// Shorter integers are left-padded with zeros. Longer ones are accepted
    /// only when the excess leading bytes are zero.
    pub fn from_scalars(r: &[u8], s: &[u8], recovery: Option<u8>) -> Result<Self, JwtError> {
        Ok(Self {
            r: left_pad(r)?,
            s: left_pad(s)?,
            recovery,
        })
    }

    /// Split raw `r || s` or `r || s || recovery` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JwtError> {
        let recovery = match bytes.len() {
            64 => None,
            65 => Some(bytes[64]),
            other => {
                return Err(JwtError::InvalidSignature(format!(
                    "wrong signature length: expected 64 or 65 bytes, got {other}"
                )));
            }
        };
        Self::from_scalars(&bytes[..SCALAR_LENGTH], &bytes[SCALAR_LENGTH..64], recovery)
    }

    /// Decode an 86- or 87-character compact signature.
    pub fn from_compact(compact: &str) -> Result<Self, JwtError> {
        let bytes = decode_base64url(compact)
            .map_err(|e| JwtError::InvalidSignature(format!("signature is not base64url: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The `r` scalar.
    pub const fn r(&self) -> &[u8; SCALAR_LENGTH] {
        &self.r
    }

    /// The `s` scalar.
    pub const fn s(&self) -> &[u8; SCALAR_LENGTH] {
        &self.s
    }

    /// The recovery bit, when the encoding carried one.
    pub const fn recovery(&self) -> Option<u8> {
        self.recovery
    }

    /// The 64-byte `r || s` form, ignoring any recovery bit.
    pub fn to_rs_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..SCALAR_LENGTH].copy_from_slice(&self.r);
        bytes[SCALAR_LENGTH..].copy_from_slice(&self.s);
        bytes
    }

    /// Raw bytes, with the recovery bit appended when `recoverable`.
    pub fn to_bytes(&self, recoverable: bool) -> Result<Vec<u8>, JwtError> {
        let mut bytes = self.to_rs_bytes().to_vec();
        if recoverable {
            let recovery = self
                .recovery
                .ok_or_else(|| JwtError::RecoveryUnavailable("ES256K-R".into()))?;
            bytes.push(recovery);
        }
        Ok(bytes)
    }

    /// Base64url compact form: 86 characters, or 87 when `recoverable`.
    pub fn to_compact(&self, recoverable: bool) -> Result<String, JwtError> {
        Ok(encode_base64url(self.to_bytes(recoverable)?))
    }
}

fn left_pad(integer: &[u8]) -> Result<[u8; SCALAR_LENGTH], JwtError> {
    let integer = if integer.len() > SCALAR_LENGTH {
        let (excess, rest) = integer.split_at(integer.len() - SCALAR_LENGTH);
        if excess.iter().any(|byte| *byte != 0) {
            return Err(JwtError::InvalidSignature(format!(
                "signature scalar is {} bytes wide",
                integer.len()
            )));
        }
        rest
    } else {
        integer
    };

    let mut padded = [0u8; SCALAR_LENGTH];
    padded[SCALAR_LENGTH - integer.len()..].copy_from_slice(integer);
    Ok(padded)
}
