//! secp256k1 signing (`ES256K`, `ES256K-R`) and verification.
//!
//! Verification runs in two passes. Candidates that publish a key are
//! checked directly. Candidates that publish only an account (an Ethereum
//! address, or a CAIP-10 id on an Ethereum, Bitcoin or Cosmos chain) are
//! matched by recovering the signer's key from the signature and comparing
//! the accounts derived from it.

use dialog_jws::{
    Addresses, JwtError, SignatureValue, VerificationMethod, ethereum_address, extract_public_key,
};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use signature::hazmat::PrehashVerifier;

use crate::check_private_key_length;

/// Offset some encoders (Ethereum's `v`) add to the recovery bit.
const LEGACY_RECOVERY_OFFSET: u8 = 27;

/// A secp256k1 private key.
#[derive(Clone)]
pub struct Es256KSigner {
    key: SigningKey,
}

impl std::fmt::Debug for Es256KSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Es256KSigner")
            .field("public_key", &hex::encode(self.public_key(true)))
            .finish()
    }
}

impl Es256KSigner {
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

    /// Lowercase `0x` Ethereum address of this key.
    pub fn ethereum_address(&self) -> Result<String, JwtError> {
        ethereum_address(&self.public_key(false))
    }

    /// Every account address this key can be published as.
    pub fn addresses(&self) -> Result<Addresses, JwtError> {
        Addresses::new(&self.public_key(true), &self.public_key(false))
    }

    /// Sign the SHA-256 digest of `data`.
    ///
    /// The signature is low-S normalized and always carries its recovery
    /// bit; whether that bit is encoded is up to the caller.
    pub fn sign(&self, data: &[u8]) -> Result<SignatureValue, JwtError> {
        let digest = Sha256::digest(data);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| JwtError::InvalidPrivateKey(format!("signing failed: {e}")))?;

        let bytes = signature.to_bytes();
        SignatureValue::from_scalars(&bytes[..32], &bytes[32..], Some(recovery_id.to_byte()))
    }
}

/// Verify an `ES256K` or `ES256K-R` signature.
///
/// Candidates carrying a public key are tried first, in order, with any
/// recovery bit ignored. When none matches, candidates identified by an
/// account are tried through key recovery.
pub fn verify_es256k(
    data: &[u8],
    signature: &str,
    authenticators: &[VerificationMethod],
) -> Result<VerificationMethod, JwtError> {
    let digest = Sha256::digest(data);
    let value = SignatureValue::from_compact(signature)?;
    let parsed = Signature::from_slice(&value.to_rs_bytes())
        .map_err(|e| JwtError::InvalidSignature(format!("malformed secp256k1 signature: {e}")))?;
    let normalized = parsed.normalize_s().unwrap_or(parsed);

    let (accounts, keys): (Vec<&VerificationMethod>, Vec<&VerificationMethod>) = authenticators
        .iter()
        .partition(|method| method.is_account_based());

    for method in keys {
        if key_verifies(method, &digest, &normalized) {
            tracing::debug!(id = %method.id, "secp256k1 key matched");
            return Ok(method.clone());
        }
    }

    if !accounts.is_empty() {
        return verify_recovered(&digest, &value, &accounts);
    }

    Err(JwtError::InvalidSignature("no matching public key found".into()))
}

fn key_verifies(method: &VerificationMethod, digest: &[u8], signature: &Signature) -> bool {
    let key = match extract_public_key(method) {
        Ok(key) => key,
        Err(error) => {
            tracing::trace!(id = %method.id, %error, "skipping candidate");
            return false;
        }
    };
    VerifyingKey::from_sec1_bytes(key.as_bytes())
        .is_ok_and(|verifying_key| verifying_key.verify_prehash(digest, signature).is_ok())
}

/// Recover the signing key and match it against account-style candidates.
///
/// Only the encoded recovery bit is tried when the signature carries one;
/// otherwise both parities are, bit 0 first. For each hypothesis every
/// candidate is checked in order and the first match wins.
pub fn verify_recovered(
    digest: &[u8],
    value: &SignatureValue,
    candidates: &[&VerificationMethod],
) -> Result<VerificationMethod, JwtError> {
    let parsed = Signature::from_slice(&value.to_rs_bytes())
        .map_err(|e| JwtError::InvalidSignature(format!("malformed secp256k1 signature: {e}")))?;

    // Normalizing s negates the nonce point, which flips the y parity.
    let (signature, flipped) = match parsed.normalize_s() {
        Some(normalized) => (normalized, true),
        None => (parsed, false),
    };

    let hypotheses = match value.recovery() {
        Some(bit) if bit >= LEGACY_RECOVERY_OFFSET => vec![bit - LEGACY_RECOVERY_OFFSET],
        Some(bit) => vec![bit],
        None => vec![0, 1],
    };

    for bit in hypotheses {
        let bit = if flipped { bit ^ 1 } else { bit };
        let Some(recovery_id) = RecoveryId::from_byte(bit) else {
            continue;
        };
        let recovered = match VerifyingKey::recover_from_prehash(digest, &signature, recovery_id) {
            Ok(key) => key,
            Err(error) => {
                tracing::trace!(bit, %error, "no key recovered for recovery bit");
                continue;
            }
        };

        let recovered = RecoveredKey::new(&recovered)?;
        for method in candidates {
            if recovered.matches(method) {
                tracing::debug!(id = %method.id, bit, "recovered secp256k1 key matched");
                return Ok((*method).clone());
            }
        }
    }

    Err(JwtError::InvalidSignature("no matching public key found".into()))
}

struct RecoveredKey {
    uncompressed: String,
    compressed: String,
    addresses: Addresses,
}

impl RecoveredKey {
    fn new(key: &VerifyingKey) -> Result<Self, JwtError> {
        let uncompressed = key.to_encoded_point(false);
        let compressed = key.to_encoded_point(true);
        Ok(Self {
            addresses: Addresses::new(compressed.as_bytes(), uncompressed.as_bytes())?,
            uncompressed: hex::encode(uncompressed.as_bytes()),
            compressed: hex::encode(compressed.as_bytes()),
        })
    }

    fn matches(&self, method: &VerificationMethod) -> bool {
        if method.has_public_key() {
            if let Ok(key) = extract_public_key(method) {
                let hex = key.to_hex();
                if hex == self.uncompressed || hex == self.compressed {
                    return true;
                }
            }
        }
        if let Some(address) = &method.ethereum_address {
            if self.addresses.is_ethereum(address) {
                return true;
            }
        }
        if let Some(account) = &method.blockchain_account_id {
            if self.addresses.matches(account) {
                return true;
            }
        }
        false
    }
}
