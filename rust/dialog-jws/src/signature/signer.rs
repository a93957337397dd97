//! Signing trait.

use std::future::Future;

use crate::{algorithm::Algorithm, error::JwtError};

/// Produces compact signatures over a signing input.
///
/// A single signer may hold keys for several algorithms; callers pass the
/// `alg` they put in the header and the signer dispatches on it.
pub trait Signer {
    /// Sign `payload` and return the base64url compact signature.
    fn sign(
        &self,
        algorithm: Algorithm,
        payload: &[u8],
    ) -> impl Future<Output = Result<String, JwtError>>;
}

impl<T: Signer> Signer for &T {
    fn sign(
        &self,
        algorithm: Algorithm,
        payload: &[u8],
    ) -> impl Future<Output = Result<String, JwtError>> {
        (**self).sign(algorithm, payload)
    }
}
