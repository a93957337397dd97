//! Algorithm-keyed verification dispatch.

use dialog_jws::{Algorithm, JwtError, VerificationMethod, Verifier};

use crate::{ed25519::verify_ed25519, es256::verify_es256, es256k::verify_es256k};

type VerifyFn = fn(&[u8], &str, &[VerificationMethod]) -> Result<VerificationMethod, JwtError>;

struct AlgorithmVerifier {
    algorithm: Algorithm,
    method_types: &'static [&'static str],
    verify: VerifyFn,
}

const fn entry(algorithm: Algorithm, verify: VerifyFn) -> AlgorithmVerifier {
    AlgorithmVerifier {
        algorithm,
        method_types: algorithm.method_types(),
        verify,
    }
}

static VERIFIERS: [AlgorithmVerifier; 5] = [
    entry(Algorithm::Es256, verify_es256),
    entry(Algorithm::Es256K, verify_es256k),
    entry(Algorithm::Es256KR, verify_es256k),
    entry(Algorithm::Ed25519, verify_ed25519),
    entry(Algorithm::EdDsa, verify_ed25519),
];

fn lookup(algorithm: Algorithm) -> Option<&'static AlgorithmVerifier> {
    VERIFIERS.iter().find(|entry| entry.algorithm == algorithm)
}

/// Verifies every built-in algorithm in process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareVerifier;

impl SoftwareVerifier {
    /// Verify without going through the async capability.
    pub fn verify_now(
        &self,
        algorithm: Algorithm,
        data: &[u8],
        signature: &str,
        authenticators: &[VerificationMethod],
    ) -> Result<VerificationMethod, JwtError> {
        let entry =
            lookup(algorithm).ok_or_else(|| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;
        tracing::trace!(%algorithm, candidates = authenticators.len(), "verifying signature");
        (entry.verify)(data, signature, authenticators)
    }
}

impl Verifier for SoftwareVerifier {
    fn method_types(&self, algorithm: Algorithm) -> Option<&[&'static str]> {
        lookup(algorithm).map(|entry| entry.method_types)
    }

    async fn verify(
        &self,
        algorithm: Algorithm,
        data: &[u8],
        signature: &str,
        authenticators: &[VerificationMethod],
    ) -> Result<VerificationMethod, JwtError> {
        self.verify_now(algorithm, data, signature, authenticators)
    }
}
