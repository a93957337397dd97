//! Options for creating and verifying tokens.

use dialog_jws::{Algorithm, ProofPurpose};
use serde::{Deserialize, Serialize};

use crate::{authenticator::DidAuthenticator, codec::MAX_NESTING_DEPTH, time};

/// Clock skew tolerated by the temporal checks, in seconds.
pub const DEFAULT_SKEW_SECONDS: u64 = 300;

/// Options for [`create_jwt`](crate::create_jwt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtOptions {
    /// The DID placed in `iss`.
    pub issuer: String,
    /// Lifetime in seconds, counted from `nbf` when set and from now
    /// otherwise.
    pub expires_in: Option<u64>,
    /// Serialize header and payload in canonical (JCS) form.
    pub canonicalize: bool,
}

impl JwtOptions {
    /// Options for tokens issued by `issuer`.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            expires_in: None,
            canonicalize: false,
        }
    }

    /// Expire tokens `seconds` after they become valid.
    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Serialize in canonical (JCS) form.
    pub fn canonicalized(mut self) -> Self {
        self.canonicalize = true;
        self
    }
}

/// Options shared by every layer of a multi-signature token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultisigOptions {
    /// Lifetime of each layer in seconds.
    pub expires_in: Option<u64>,
    /// Serialize every layer in canonical (JCS) form.
    pub canonicalize: bool,
}

/// One signer of a multi-signature token.
#[derive(Debug)]
pub struct Issuer<'a, S> {
    /// The DID placed in `iss`.
    pub issuer: String,
    /// The signing capability.
    pub signer: &'a S,
    /// Algorithm `signer` signs with.
    pub algorithm: Algorithm,
}

impl<'a, S> Issuer<'a, S> {
    /// `signer` signing for `issuer` with `algorithm`.
    pub fn new(issuer: impl Into<String>, signer: &'a S, algorithm: Algorithm) -> Self {
        Self {
            issuer: issuer.into(),
            signer,
            algorithm,
        }
    }
}

/// Which claim checks run after a signature verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPolicies {
    /// Fixed verification time in seconds; the wall clock when unset.
    pub now: Option<u64>,
    /// Reject tokens whose `nbf` lies in the future.
    pub nbf: bool,
    /// Reject tokens issued in the future (when there is no `nbf`).
    pub iat: bool,
    /// Reject expired tokens.
    pub exp: bool,
    /// Require a matching audience when `aud` is present.
    pub aud: bool,
}

impl Default for VerifyPolicies {
    fn default() -> Self {
        Self {
            now: None,
            nbf: true,
            iat: true,
            exp: true,
            aud: true,
        }
    }
}

/// Options for [`verify_jwt`](crate::verify_jwt).
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// This verifier's DID, accepted as `aud`.
    pub audience: Option<String>,
    /// This verifier's callback URL, accepted as `aud`.
    pub callback_url: Option<String>,
    /// Clock skew in seconds; [`DEFAULT_SKEW_SECONDS`] when unset.
    pub skew_time: Option<u64>,
    /// Relationship the issuer's key must hold.
    pub proof_purpose: Option<ProofPurpose>,
    /// Legacy switch for `proof_purpose: authentication`.
    pub auth: Option<bool>,
    /// Claim checks.
    pub policies: VerifyPolicies,
    /// Pre-resolved issuer keys, skipping resolution.
    pub authenticator: Option<DidAuthenticator>,
    /// How many nested token layers and conditional proofs deep verification
    /// goes; [`MAX_NESTING_DEPTH`] when unset.
    pub max_depth: Option<usize>,
}

impl VerifyOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept tokens addressed to `audience`.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Accept tokens addressed to `callback_url`.
    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Tolerate `seconds` of clock skew.
    pub fn with_skew(mut self, seconds: u64) -> Self {
        self.skew_time = Some(seconds);
        self
    }

    /// Require keys listed under `purpose`.
    pub fn with_proof_purpose(mut self, purpose: ProofPurpose) -> Self {
        self.proof_purpose = Some(purpose);
        self
    }

    /// Verify as of `now` instead of the wall clock.
    pub fn at(mut self, now: u64) -> Self {
        self.policies.now = Some(now);
        self
    }

    /// Replace the claim checks.
    pub fn with_policies(mut self, policies: VerifyPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Verify against already resolved keys.
    pub fn with_authenticator(mut self, authenticator: DidAuthenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Effective clock skew.
    pub fn skew(&self) -> u64 {
        self.skew_time.unwrap_or(DEFAULT_SKEW_SECONDS)
    }

    /// Effective verification time.
    pub fn now(&self) -> u64 {
        self.policies.now.unwrap_or_else(time::now)
    }

    /// Effective proof purpose; `auth: true` means authentication.
    pub fn purpose(&self) -> Option<ProofPurpose> {
        match self.auth {
            Some(true) => Some(ProofPurpose::Authentication),
            _ => self.proof_purpose,
        }
    }

    /// Effective recursion bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(MAX_NESTING_DEPTH)
    }
}
