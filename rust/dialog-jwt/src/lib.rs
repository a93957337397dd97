//! Create and verify JWTs whose issuers are DIDs.
//!
//! This crate provides the token layer on top of [`dialog_jws`]: the compact
//! codec, issuing single and multi-signature tokens, and verification
//! against the issuer's DID document.
//!
//! # Overview
//!
//! The verification flow:
//!
//! 1. The compact token is decoded into header, claims and signature
//! 2. The issuer is taken from `iss` (or from the SIOP conventions)
//! 3. The issuer's DID is resolved and its verification methods are
//!    filtered down to those that can check the header's `alg`
//! 4. Each candidate is tried in document order until one matches;
//!    `ConditionalProof2022` candidates evaluate their sub-conditions
//! 5. Temporal (`nbf`, `iat`, `exp`) and audience checks run on every
//!    layer
//!
//! # Example
//!
//! ```ignore
//! use dialog_credentials::{SoftwareSigner, SoftwareVerifier};
//! use dialog_jws::{Algorithm, MemoryResolver};
//! use dialog_jwt::{Claims, Header, JwtOptions, VerifyOptions, create_jwt, verify_jwt};
//!
//! async fn round_trip(resolver: &MemoryResolver, key: &[u8]) -> Result<(), dialog_jws::JwtError> {
//!     let signer = SoftwareSigner::new(Algorithm::Es256K, key)?;
//!     let jwt = create_jwt(
//!         Claims::new().with("hello", "world"),
//!         &JwtOptions::new("did:example:alice"),
//!         &signer,
//!         Header::new(Algorithm::Es256K),
//!     )
//!     .await?;
//!
//!     let verified = verify_jwt(&jwt, &VerifyOptions::new(), resolver, &SoftwareVerifier).await?;
//!     println!("signed by {}", verified.signer.id);
//!     Ok(())
//! }
//! ```

pub mod authenticator;
pub mod claims;
pub mod codec;
mod conditional;
pub mod create;
pub mod options;
pub mod policy;
pub mod time;
pub mod verify;

pub use authenticator::{DidAuthenticator, resolve_authenticator};
pub use claims::{Audience, Claims, DEFAULT_ALGORITHM, Header};
pub use codec::{Envelope, Jws, MAX_NESTING_DEPTH, decode, decode_jws};
pub use create::{Payload, create_jws, create_jwt, create_multisignature_jwt};
pub use options::{
    DEFAULT_SKEW_SECONDS, Issuer, JwtOptions, MultisigOptions, VerifyOptions, VerifyPolicies,
};
pub use verify::{
    SELF_ISSUED_V0_1, SELF_ISSUED_V2, SELF_ISSUED_V2_VC_INTEROP, VerificationResult,
    verify_jws, verify_jwt, verify_jwt_decoded,
};
