//! P-256 signing and verification (`ES256`).

use dialog_jws::{JwtError, SignatureValue, VerificationMethod, extract_public_key};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use signature::hazmat::{PrehashSigner, PrehashVerifier};

use crate::check_private_key_length;

/// A P-256 private key.
#[derive(Clone)]
pub struct Es256Signer {
    key: SigningKey,
}

impl std::fmt::Debug for Es256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Es256Signer")
            .field("public_key", &hex::encode(self.public_key(true)))
            .finish()
    }
}

impl Es256Signer {
    /// Load a 32-byte private key.
    pub fn from_bytes(private_key: &[u8]) -> Result<Self, JwtError> {
        check_private_key_length(private_key)?;
        let key = SigningKey::from_slice(private_key)
            .map_err(|e| JwtError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// SEC1 public key, compressed (33 bytes) or uncompressed (65 bytes).
    pub fn public_key(&self, compressed: bool) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(compressed)
            .as_bytes()
            .to_vec()
    }

    /// Sign the SHA-256 digest of `data`.
    pub fn sign(&self, data: &[u8]) -> Result<SignatureValue, JwtError> {
        let digest = Sha256::digest(data);
        let signature: Signature = self
            .key
            .sign_prehash(&digest)
            .map_err(|e| JwtError::InvalidPrivateKey(format!("signing failed: {e}")))?;

        let bytes = signature.to_bytes();
        SignatureValue::from_scalars(&bytes[..32], &bytes[32..], None)
    }
}

/// Verify an `ES256` signature against each candidate in order.
pub fn verify_es256(
    data: &[u8],
    signature: &str,
    authenticators: &[VerificationMethod],
) -> Result<VerificationMethod, JwtError> {
    let digest = Sha256::digest(data);
    let value = SignatureValue::from_compact(signature)?;
    let signature = Signature::from_slice(&value.to_rs_bytes())
        .map_err(|e| JwtError::InvalidSignature(format!("malformed P-256 signature: {e}")))?;

    authenticators
        .iter()
        .find(|method| {
            let key = match extract_public_key(method) {
                Ok(key) => key,
                Err(error) => {
                    tracing::trace!(id = %method.id, %error, "skipping candidate");
                    return false;
                }
            };
            VerifyingKey::from_sec1_bytes(key.as_bytes())
                .is_ok_and(|verifying_key| verifying_key.verify_prehash(&digest, &signature).is_ok())
        })
        .cloned()
        .ok_or_else(|| JwtError::InvalidSignature("no matching public key found".into()))
}
