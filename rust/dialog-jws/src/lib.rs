//! Signature metadata and key material for DID-addressable [JWS] tokens.
//!
//! This crate holds everything the signing and verifying sides agree on
//! without touching curve arithmetic: the algorithm identifiers, the
//! compact signature encoding, the DID document model, public key
//! extraction from verification methods, and the capability traits that
//! signers, verifiers and DID resolvers implement.
//!
//! [JWS]: https://www.rfc-editor.org/rfc/rfc7515

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod algorithm;
pub mod did;
pub mod document;
pub mod encoding;
pub mod error;
pub mod key;
pub mod resolver;
pub mod signature;

pub use address::*;
pub use algorithm::*;
pub use did::*;
pub use document::*;
pub use error::*;
pub use key::*;
pub use resolver::*;
pub use signature::*;
