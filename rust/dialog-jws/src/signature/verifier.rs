//! Signature verification trait.

use std::future::Future;

use crate::{algorithm::Algorithm, document::VerificationMethod, error::JwtError};

/// Checks a compact signature against a set of candidate keys.
pub trait Verifier {
    /// Verification method types this verifier can use for `algorithm`.
    ///
    /// `None` means the algorithm is not supported at all.
    fn method_types(&self, algorithm: Algorithm) -> Option<&[&'static str]>;

    /// Return the first of `authenticators` whose key validates `signature`
    /// over `data`.
    ///
    /// Fails with [`JwtError::InvalidSignature`] when no candidate matches.
    fn verify(
        &self,
        algorithm: Algorithm,
        data: &[u8],
        signature: &str,
        authenticators: &[VerificationMethod],
    ) -> impl Future<Output = Result<VerificationMethod, JwtError>>;
}

impl<T: Verifier> Verifier for &T {
    fn method_types(&self, algorithm: Algorithm) -> Option<&[&'static str]> {
        (**self).method_types(algorithm)
    }

    fn verify(
        &self,
        algorithm: Algorithm,
        data: &[u8],
        signature: &str,
        authenticators: &[VerificationMethod],
    ) -> impl Future<Output = Result<VerificationMethod, JwtError>> {
        (**self).verify(algorithm, data, signature, authenticators)
    }
}
