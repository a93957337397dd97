//! Public key extraction from verification methods.
//!
//! A verification method can publish its key in one of several encodings.
//! Extraction normalizes all of them to raw key bytes plus, when it can be
//! determined, the curve the key belongs to. Account-style methods publish
//! no key at all and are reported separately; their key can only be
//! matched by recovering it from a signature.

use crate::{
    algorithm::KeyType,
    document::{PublicKeyJwk, VerificationMethod},
    encoding::{decode_base58, decode_base64_any, decode_hex, decode_multibase},
    error::JwtError,
};

/// Multicodec code for secp256k1 public keys.
pub const SECP256K1_PUB: u64 = 0xe7;
/// Multicodec code for BLS12-381 G1 public keys.
pub const BLS12_381_G1_PUB: u64 = 0xea;
/// Multicodec code for BLS12-381 G2 public keys.
pub const BLS12_381_G2_PUB: u64 = 0xeb;
/// Multicodec code for X25519 public keys.
pub const X25519_PUB: u64 = 0xec;
/// Multicodec code for Ed25519 public keys.
pub const ED25519_PUB: u64 = 0xed;
/// Multicodec code for P-256 public keys.
pub const P256_PUB: u64 = 0x1200;
/// Multicodec code for P-384 public keys.
pub const P384_PUB: u64 = 0x1201;
/// Multicodec code for P-521 public keys.
pub const P521_PUB: u64 = 0x1202;

/// Byte lengths of bare keys: Ed25519/X25519, compressed and uncompressed
/// SEC1, BLS12-381 G1/G2.
const RAW_KEY_LENGTHS: [usize; 6] = [32, 33, 48, 64, 65, 96];

/// Raw public key bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
    key_type: Option<KeyType>,
}

impl PublicKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: Vec<u8>, key_type: Option<KeyType>) -> Self {
        Self { bytes, key_type }
    }

    /// The key bytes (SEC1 for ECDSA curves, raw for Edwards/Montgomery).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The curve, when the encoding or method type says which.
    pub fn key_type(&self) -> Option<KeyType> {
        self.key_type
    }

    /// Lowercase hex of the key bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// A blockchain account standing in for a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountReference {
    /// `ethereumAddress`.
    EthereumAddress(String),
    /// `blockchainAccountId`.
    BlockchainAccountId(String),
}

/// What a verification method publishes about its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// The key itself.
    Public(PublicKey),
    /// Only an account derived from the key.
    Account(AccountReference),
}

/// Extract key material from `method`.
///
/// Encodings are tried in priority order: JWK, multibase, hex, base58,
/// base64, then the account-style fields.
pub fn extract(method: &VerificationMethod) -> Result<KeyMaterial, JwtError> {
    if method.has_public_key() {
        return extract_public_key(method).map(KeyMaterial::Public);
    }
    if let Some(address) = &method.ethereum_address {
        return Ok(KeyMaterial::Account(AccountReference::EthereumAddress(
            address.clone(),
        )));
    }
    if let Some(account) = &method.blockchain_account_id {
        return Ok(KeyMaterial::Account(AccountReference::BlockchainAccountId(
            account.clone(),
        )));
    }
    Err(JwtError::UnsupportedKeyEncoding(format!(
        "no public key found in verification method {}",
        method.id
    )))
}

/// Extract the public key bytes of `method`, ignoring account fields.
pub fn extract_public_key(method: &VerificationMethod) -> Result<PublicKey, JwtError> {
    let implied = KeyType::from_method_type(&method.method_type);

    let key = if let Some(jwk) = &method.public_key_jwk {
        from_jwk(jwk)?
    } else if let Some(multibase) = &method.public_key_multibase {
        from_multibase(multibase)?
    } else if let Some(hex) = &method.public_key_hex {
        PublicKey::new(decode_hex(hex)?, None)
    } else if let Some(base58) = &method.public_key_base58 {
        PublicKey::new(decode_base58(base58)?, None)
    } else if let Some(base64) = &method.public_key_base64 {
        PublicKey::new(decode_base64_any(base64)?, None)
    } else {
        return Err(JwtError::UnsupportedKeyEncoding(format!(
            "no public key found in verification method {}",
            method.id
        )));
    };

    Ok(PublicKey {
        key_type: key.key_type.or(implied),
        bytes: key.bytes,
    })
}

fn from_jwk(jwk: &PublicKeyJwk) -> Result<PublicKey, JwtError> {
    match (jwk.kty.as_str(), jwk.crv.as_deref()) {
        ("EC", Some(crv @ ("secp256k1" | "P-256"))) => {
            let x = coordinate(jwk.x.as_deref(), "x")?;
            let y = coordinate(jwk.y.as_deref(), "y")?;

            let mut bytes = Vec::with_capacity(65);
            bytes.push(0x04);
            bytes.extend_from_slice(&x);
            bytes.extend_from_slice(&y);

            let key_type = if crv == "secp256k1" {
                KeyType::Secp256k1
            } else {
                KeyType::P256
            };
            Ok(PublicKey::new(bytes, Some(key_type)))
        }
        ("OKP", Some(crv @ ("Ed25519" | "X25519"))) => {
            let x = jwk
                .x
                .as_deref()
                .ok_or_else(|| JwtError::UnsupportedKeyEncoding("JWK is missing x".into()))?;
            let key_type = if crv == "Ed25519" {
                KeyType::Ed25519
            } else {
                KeyType::X25519
            };
            Ok(PublicKey::new(decode_base64_any(x)?, Some(key_type)))
        }
        (kty, crv) => Err(JwtError::UnsupportedKeyEncoding(format!(
            "unsupported JWK kty {kty} with crv {}",
            crv.unwrap_or("(none)")
        ))),
    }
}

fn coordinate(value: Option<&str>, name: &str) -> Result<[u8; 32], JwtError> {
    let value = value
        .ok_or_else(|| JwtError::UnsupportedKeyEncoding(format!("JWK is missing {name}")))?;
    let bytes = decode_base64_any(value)?;
    if bytes.len() > 32 {
        return Err(JwtError::UnsupportedKeyEncoding(format!(
            "JWK coordinate {name} is {} bytes",
            bytes.len()
        )));
    }
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(padded)
}

fn from_multibase(value: &str) -> Result<PublicKey, JwtError> {
    let bytes = decode_multibase(value)?;
    if RAW_KEY_LENGTHS.contains(&bytes.len()) {
        return Ok(PublicKey::new(bytes, None));
    }

    let mut reader = bytes.as_slice();
    let Ok(codec) = leb128::read::unsigned(&mut reader) else {
        return Ok(PublicKey::new(bytes, None));
    };

    let key_type = match codec {
        SECP256K1_PUB => KeyType::Secp256k1,
        BLS12_381_G1_PUB => KeyType::Bls12381G1,
        BLS12_381_G2_PUB => KeyType::Bls12381G2,
        X25519_PUB => KeyType::X25519,
        ED25519_PUB => KeyType::Ed25519,
        P256_PUB => KeyType::P256,
        P384_PUB => KeyType::P384,
        P521_PUB => KeyType::P521,
        _ => return Ok(PublicKey::new(bytes, None)),
    };
    Ok(PublicKey::new(reader.to_vec(), Some(key_type)))
}
