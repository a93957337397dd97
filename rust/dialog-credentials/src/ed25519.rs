//! Ed25519 signing and verification (`EdDSA`, `Ed25519`).

use dialog_jws::{
    JwtError, KeyType, VerificationMethod,
    encoding::{decode_base64url, encode_base64url},
    extract_public_key,
};
use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use signature::{Signer as _, Verifier as _};

/// An Ed25519 private key.
#[derive(Clone)]
pub struct Ed25519Signer {
    key: SigningKey,
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

impl Ed25519Signer {
    /// Load a 32-byte seed, or a 64-byte seed followed by its public key.
    pub fn from_bytes(private_key: &[u8]) -> Result<Self, JwtError> {
        let key = if let Ok(seed) = <&[u8; 32]>::try_from(private_key) {
            SigningKey::from_bytes(seed)
        } else if let Ok(pair) = <&[u8; 64]>::try_from(private_key) {
            SigningKey::from_keypair_bytes(pair)
                .map_err(|e| JwtError::InvalidPrivateKey(e.to_string()))?
        } else {
            return Err(JwtError::InvalidKeyLength {
                expected: "32 or 64".into(),
                actual: private_key.len(),
            });
        };
        Ok(Self { key })
    }

    /// The 32-byte public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Sign `data` and return the base64url signature.
    pub fn sign(&self, data: &[u8]) -> String {
        encode_base64url(self.key.sign(data).to_bytes())
    }
}

/// Verify an Ed25519 signature against the Ed25519 candidates, in order.
///
/// Candidates whose key is not known to be an Ed25519 key are skipped.
pub fn verify_ed25519(
    data: &[u8],
    signature: &str,
    authenticators: &[VerificationMethod],
) -> Result<VerificationMethod, JwtError> {
    let bytes = decode_base64url(signature)
        .map_err(|e| JwtError::InvalidSignature(format!("signature is not base64url: {e}")))?;
    let signature = Signature::from_slice(&bytes)
        .map_err(|e| JwtError::InvalidSignature(format!("malformed Ed25519 signature: {e}")))?;

    authenticators
        .iter()
        .find(|method| {
            let key = match extract_public_key(method) {
                Ok(key) if key.key_type() == Some(KeyType::Ed25519) => key,
                Ok(_) => return false,
                Err(error) => {
                    tracing::trace!(id = %method.id, %error, "skipping candidate");
                    return false;
                }
            };
            <&[u8; 32]>::try_from(key.as_bytes())
                .ok()
                .and_then(|bytes| VerifyingKey::from_bytes(bytes).ok())
                .is_some_and(|verifying_key| verifying_key.verify(data, &signature).is_ok())
        })
        .cloned()
        .ok_or_else(|| JwtError::InvalidSignature("no matching public key found".into()))
}
