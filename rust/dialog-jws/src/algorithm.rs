//! Signature algorithms and the key types they operate on.

use crate::error::JwtError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Verification method type for secp256k1 keys published before 2019.
pub const SECP256K1_SIGNATURE_VERIFICATION_KEY_2018: &str = "Secp256k1SignatureVerificationKey2018";
/// Verification method type for secp256k1 keys.
pub const SECP256K1_VERIFICATION_KEY_2018: &str = "Secp256k1VerificationKey2018";
/// Verification method type for secp256k1 keys.
pub const ECDSA_SECP256K1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256k1VerificationKey2019";
/// Legacy uPort secp256k1 key type.
pub const ECDSA_PUBLIC_KEY_SECP256K1: &str = "EcdsaPublicKeySecp256k1";
/// Blockchain account that is matched through public key recovery.
pub const ECDSA_SECP256K1_RECOVERY_METHOD_2020: &str = "EcdsaSecp256k1RecoveryMethod2020";
/// Verification method type for P-256 keys.
pub const ECDSA_SECP256R1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256r1VerificationKey2019";
/// Verification method type for Ed25519 keys.
pub const ED25519_VERIFICATION_KEY_2018: &str = "Ed25519VerificationKey2018";
/// Verification method type for Ed25519 keys in multibase form.
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";
/// Legacy uPort Ed25519 key type.
pub const ED25519_SIGNATURE_VERIFICATION: &str = "ED25519SignatureVerification";
/// Key agreement type for X25519 keys.
pub const X25519_KEY_AGREEMENT_KEY_2019: &str = "X25519KeyAgreementKey2019";
/// Key agreement type for X25519 keys in multibase form.
pub const X25519_KEY_AGREEMENT_KEY_2020: &str = "X25519KeyAgreementKey2020";
/// Generic JWK carrier.
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";
/// Generic multicodec key carrier.
pub const MULTIKEY: &str = "Multikey";
/// Composite method whose conditions are verified recursively.
pub const CONDITIONAL_PROOF_2022: &str = "ConditionalProof2022";

const ES256_METHOD_TYPES: &[&str] = &[
    JSON_WEB_KEY_2020,
    MULTIKEY,
    ECDSA_SECP256R1_VERIFICATION_KEY_2019,
];

const ES256K_METHOD_TYPES: &[&str] = &[
    ECDSA_SECP256K1_VERIFICATION_KEY_2019,
    ECDSA_SECP256K1_RECOVERY_METHOD_2020,
    SECP256K1_VERIFICATION_KEY_2018,
    SECP256K1_SIGNATURE_VERIFICATION_KEY_2018,
    ECDSA_PUBLIC_KEY_SECP256K1,
    JSON_WEB_KEY_2020,
    MULTIKEY,
];

const ES256K_R_METHOD_TYPES: &[&str] = &[
    ECDSA_SECP256K1_VERIFICATION_KEY_2019,
    ECDSA_SECP256K1_RECOVERY_METHOD_2020,
    SECP256K1_VERIFICATION_KEY_2018,
    SECP256K1_SIGNATURE_VERIFICATION_KEY_2018,
    ECDSA_PUBLIC_KEY_SECP256K1,
    JSON_WEB_KEY_2020,
    MULTIKEY,
    CONDITIONAL_PROOF_2022,
];

const ED25519_METHOD_TYPES: &[&str] = &[
    ED25519_SIGNATURE_VERIFICATION,
    ED25519_VERIFICATION_KEY_2018,
    ED25519_VERIFICATION_KEY_2020,
    JSON_WEB_KEY_2020,
    MULTIKEY,
];

/// JOSE `alg` values understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    /// ECDSA over P-256 with SHA-256.
    Es256,
    /// ECDSA over secp256k1 with SHA-256.
    Es256K,
    /// ECDSA over secp256k1 with SHA-256 and a trailing recovery byte.
    Es256KR,
    /// Ed25519, registered under its curve name.
    Ed25519,
    /// Ed25519, registered under the generic EdDSA name.
    EdDsa,
}

impl Algorithm {
    /// All algorithms, in registration order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Es256,
        Algorithm::Es256K,
        Algorithm::Es256KR,
        Algorithm::Ed25519,
        Algorithm::EdDsa,
    ];

    /// The JOSE header value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Es256 => "ES256",
            Algorithm::Es256K => "ES256K",
            Algorithm::Es256KR => "ES256K-R",
            Algorithm::Ed25519 => "Ed25519",
            Algorithm::EdDsa => "EdDSA",
        }
    }

    /// Whether compact signatures carry a recovery byte.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Algorithm::Es256KR)
    }

    /// The curve this algorithm signs with.
    pub const fn key_type(&self) -> KeyType {
        match self {
            Algorithm::Es256 => KeyType::P256,
            Algorithm::Es256K | Algorithm::Es256KR => KeyType::Secp256k1,
            Algorithm::Ed25519 | Algorithm::EdDsa => KeyType::Ed25519,
        }
    }

    /// Verification method types that may carry a key for this algorithm.
    pub const fn method_types(&self) -> &'static [&'static str] {
        match self {
            Algorithm::Es256 => ES256_METHOD_TYPES,
            Algorithm::Es256K => ES256K_METHOD_TYPES,
            Algorithm::Es256KR => ES256K_R_METHOD_TYPES,
            Algorithm::Ed25519 | Algorithm::EdDsa => ED25519_METHOD_TYPES,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwtError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Curve families a public key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// secp256k1.
    Secp256k1,
    /// NIST P-256.
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
    /// Edwards25519 signing key.
    Ed25519,
    /// Curve25519 key agreement key.
    X25519,
    /// BLS12-381 G1 point.
    Bls12381G1,
    /// BLS12-381 G2 point.
    Bls12381G2,
}

impl KeyType {
    /// The key type implied by a verification method `type`, if any.
    ///
    /// Generic carriers such as `JsonWebKey2020` and `Multikey` return
    /// `None`; their encoding has to say which curve the key is on.
    pub fn from_method_type(method_type: &str) -> Option<KeyType> {
        match method_type {
            SECP256K1_SIGNATURE_VERIFICATION_KEY_2018
            | SECP256K1_VERIFICATION_KEY_2018
            | ECDSA_SECP256K1_VERIFICATION_KEY_2019
            | ECDSA_PUBLIC_KEY_SECP256K1
            | ECDSA_SECP256K1_RECOVERY_METHOD_2020 => Some(KeyType::Secp256k1),
            ECDSA_SECP256R1_VERIFICATION_KEY_2019 => Some(KeyType::P256),
            ED25519_VERIFICATION_KEY_2018
            | ED25519_VERIFICATION_KEY_2020
            | ED25519_SIGNATURE_VERIFICATION => Some(KeyType::Ed25519),
            X25519_KEY_AGREEMENT_KEY_2019 | X25519_KEY_AGREEMENT_KEY_2020 => Some(KeyType::X25519),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_parses_every_registered_name() -> TestResult {
        for alg in Algorithm::ALL {
            assert_eq!(alg.as_str().parse::<Algorithm>()?, alg);
        }
        Ok(())
    }

    #[test]
    fn it_rejects_unknown_names() {
        let result = "RS256".parse::<Algorithm>();
        assert!(matches!(result, Err(JwtError::UnsupportedAlgorithm(name)) if name == "RS256"));
    }

    #[test]
    fn only_recoverable_secp256k1_accepts_conditional_proofs() {
        assert!(Algorithm::Es256KR.method_types().contains(&CONDITIONAL_PROOF_2022));
        assert!(!Algorithm::Es256K.method_types().contains(&CONDITIONAL_PROOF_2022));
        assert!(!Algorithm::EdDsa.method_types().contains(&CONDITIONAL_PROOF_2022));
    }

    #[test]
    fn ed25519_aliases_share_method_types() {
        assert_eq!(Algorithm::Ed25519.method_types(), Algorithm::EdDsa.method_types());
        assert_eq!(Algorithm::EdDsa.key_type(), KeyType::Ed25519);
    }

    #[test]
    fn generic_carriers_have_no_implied_key_type() {
        assert_eq!(KeyType::from_method_type(JSON_WEB_KEY_2020), None);
        assert_eq!(KeyType::from_method_type(MULTIKEY), None);
        assert_eq!(
            KeyType::from_method_type(ECDSA_SECP256K1_RECOVERY_METHOD_2020),
            Some(KeyType::Secp256k1)
        );
    }
}
