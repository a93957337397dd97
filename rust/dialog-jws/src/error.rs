//! Error taxonomy shared by the codec, signers, verifiers and the
//! verification pipeline.
//!
//! Every failure carries a stable [`ErrorCode`] so callers that only see
//! the rendered message still get a machine-readable prefix
//! (`invalid_signature: ...`, `no_suitable_keys: ...`).

use serde::Serialize;

/// Errors raised while creating, decoding or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// The compact string does not have three base64url segments.
    #[error("invalid_argument: malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The segments decode, but not into a well-formed header or payload.
    #[error("invalid_jwt: {0}")]
    InvalidEnvelope(String),

    /// A verification method carries no key encoding that can be decoded.
    #[error("invalid_argument: unsupported key encoding: {0}")]
    UnsupportedKeyEncoding(String),

    /// The `alg` is unknown, or no verification method type supports it.
    #[error("not_supported: no supported signature types for algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// DID resolution failed or returned no document.
    #[error("resolver_error: {0}")]
    Resolution(String),

    /// The document has no verification method usable for the request.
    #[error("no_suitable_keys: {0}")]
    NoSuitableKeys(String),

    /// No candidate key validates the signature.
    #[error("invalid_signature: {0}")]
    InvalidSignature(String),

    /// The `aud` claim does not match the configured audience.
    #[error("invalid_audience: {0}")]
    InvalidAudience(String),

    /// A temporal policy (`nbf`, `iat`, `exp`) rejected the claims.
    #[error("invalid_jwt: {0}")]
    PolicyViolation(String),

    /// A private key has the wrong number of bytes.
    #[error("bad_key: invalid private key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Accepted length(s), rendered for the message.
        expected: String,
        /// The length that was supplied.
        actual: usize,
    },

    /// A private key has the right length but is not a usable scalar.
    #[error("bad_key: invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A recoverable signature was requested but no recovery bit exists.
    #[error("not_supported: no recovery param available for {0}")]
    RecoveryUnavailable(String),

    /// A caller-supplied argument is missing or inconsistent.
    #[error("invalid_argument: {0}")]
    InvalidArgument(String),
}

impl JwtError {
    /// Classify this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            JwtError::MalformedEnvelope(_)
            | JwtError::UnsupportedKeyEncoding(_)
            | JwtError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            JwtError::InvalidEnvelope(_) | JwtError::PolicyViolation(_) => ErrorCode::InvalidJwt,
            JwtError::UnsupportedAlgorithm(_) | JwtError::RecoveryUnavailable(_) => {
                ErrorCode::NotSupported
            }
            JwtError::Resolution(_) => ErrorCode::ResolverError,
            JwtError::NoSuitableKeys(_) => ErrorCode::NoSuitableKeys,
            JwtError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            JwtError::InvalidAudience(_) => ErrorCode::InvalidAudience,
            JwtError::InvalidKeyLength { .. } | JwtError::InvalidPrivateKey(_) => ErrorCode::BadKey,
        }
    }

    /// Whether the failure only means "this key did not match".
    ///
    /// This is the one kind the verification pipeline recovers from locally
    /// by moving on to the next candidate, layer or condition.
    pub fn is_invalid_signature(&self) -> bool {
        matches!(self, JwtError::InvalidSignature(_))
    }
}

/// Stable error classification.
///
/// The serialized names match the message prefixes of [`JwtError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or unusable argument.
    InvalidArgument,
    /// Envelope structure or temporal claims rejected.
    InvalidJwt,
    /// No key validated the signature.
    InvalidSignature,
    /// Audience mismatch or missing audience configuration.
    InvalidAudience,
    /// Document has no usable verification method.
    NoSuitableKeys,
    /// Algorithm or feature not supported.
    NotSupported,
    /// DID resolution failed.
    ResolverError,
    /// Private key rejected.
    BadKey,
}

impl ErrorCode {
    /// The snake_case name used as the message prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::InvalidJwt => "invalid_jwt",
            ErrorCode::InvalidSignature => "invalid_signature",
            ErrorCode::InvalidAudience => "invalid_audience",
            ErrorCode::NoSuitableKeys => "no_suitable_keys",
            ErrorCode::NotSupported => "not_supported",
            ErrorCode::ResolverError => "resolver_error",
            ErrorCode::BadKey => "bad_key",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
