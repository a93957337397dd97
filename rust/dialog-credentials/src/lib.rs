//! Concrete signing keys and signature verification for DID-addressable
//! tokens.
//!
//! Each supported curve has a module with its signer and its verification
//! routine. [`SoftwareSigner`] and [`SoftwareVerifier`] put them behind the
//! [`dialog_jws::Signer`] and [`dialog_jws::Verifier`] capabilities,
//! dispatching on the JOSE `alg`.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod ed25519;
pub mod es256;
pub mod es256k;
mod signer;
mod verifier;

pub use ed25519::Ed25519Signer;
pub use es256::Es256Signer;
pub use es256k::Es256KSigner;
pub use signer::{AlgorithmSigner, SignatureOutput, SignerFn, SoftwareSigner};
pub use verifier::SoftwareVerifier;

use dialog_jws::JwtError;

/// Length of every supported private key.
pub const PRIVATE_KEY_LENGTH: usize = 32;

pub(crate) fn check_private_key_length(private_key: &[u8]) -> Result<(), JwtError> {
    if private_key.len() == PRIVATE_KEY_LENGTH {
        Ok(())
    } else {
        Err(JwtError::InvalidKeyLength {
            expected: PRIVATE_KEY_LENGTH.to_string(),
            actual: private_key.len(),
        })
    }
}
