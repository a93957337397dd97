//! DID document and resolution result model.
//!
//! Only the parts of a [DID document] that bear on signature verification
//! are modelled: verification methods (including the legacy `publicKey`
//! list), the verification relationships that scope them to a proof
//! purpose, and the resolution envelope around the document.
//!
//! [DID document]: https://www.w3.org/TR/did-core/#did-documents

use crate::error::JwtError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A public key or composite proof rule published in a DID document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// DID URL identifying this method.
    pub id: String,

    /// Method type, e.g. `EcdsaSecp256k1VerificationKey2019`.
    #[serde(rename = "type")]
    pub method_type: String,

    /// DID controlling this method.
    #[serde(default, alias = "owner")]
    pub controller: String,

    /// JWK public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<PublicKeyJwk>,

    /// Multibase (optionally multicodec-prefixed) public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// Hex public key, optionally `0x` prefixed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,

    /// Base58btc public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    /// Base64 public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base64: Option<String>,

    /// CAIP-10 account id, or the legacy `address@eip155:chain` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,

    /// Ethereum address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethereum_address: Option<String>,

    /// Threshold for `conditionThreshold` / `conditionWeightedThreshold`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,

    /// Weighted conditions of a `ConditionalProof2022`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_weighted_threshold: Option<Vec<WeightedCondition>>,

    /// Unweighted conditions of a `ConditionalProof2022`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_threshold: Option<Vec<VerificationMethod>>,

    /// Conditions that must all hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_and: Option<Vec<VerificationMethod>>,

    /// Conditions of which one must hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_or: Option<Vec<VerificationMethod>>,

    /// DID URL whose keys act on behalf of this method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_delegated: Option<String>,
}

impl VerificationMethod {
    /// Create a method with no key material attached.
    pub fn new(
        id: impl Into<String>,
        method_type: impl Into<String>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            method_type: method_type.into(),
            controller: controller.into(),
            ..Default::default()
        }
    }

    /// Attach a hex-encoded public key.
    pub fn with_public_key_hex(mut self, key: impl Into<String>) -> Self {
        self.public_key_hex = Some(key.into());
        self
    }

    /// Attach a base58-encoded public key.
    pub fn with_public_key_base58(mut self, key: impl Into<String>) -> Self {
        self.public_key_base58 = Some(key.into());
        self
    }

    /// Attach a multibase-encoded public key.
    pub fn with_public_key_multibase(mut self, key: impl Into<String>) -> Self {
        self.public_key_multibase = Some(key.into());
        self
    }

    /// Attach a JWK public key.
    pub fn with_public_key_jwk(mut self, jwk: PublicKeyJwk) -> Self {
        self.public_key_jwk = Some(jwk);
        self
    }

    /// Attach an Ethereum address.
    pub fn with_ethereum_address(mut self, address: impl Into<String>) -> Self {
        self.ethereum_address = Some(address.into());
        self
    }

    /// Attach a blockchain account id.
    pub fn with_blockchain_account_id(mut self, account: impl Into<String>) -> Self {
        self.blockchain_account_id = Some(account.into());
        self
    }

    /// Whether this method identifies its key only through an account.
    pub fn is_account_based(&self) -> bool {
        self.ethereum_address.is_some() || self.blockchain_account_id.is_some()
    }

    /// Whether any direct public key encoding is present.
    pub fn has_public_key(&self) -> bool {
        self.public_key_jwk.is_some()
            || self.public_key_multibase.is_some()
            || self.public_key_hex.is_some()
            || self.public_key_base58.is_some()
            || self.public_key_base64.is_some()
    }
}

/// One weighted entry of a `conditionWeightedThreshold` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCondition {
    /// The method that must be satisfied.
    pub condition: VerificationMethod,
    /// How much it contributes towards the threshold.
    pub weight: u64,
}

/// A public key in [JWK] form.
///
/// [JWK]: https://www.rfc-editor.org/rfc/rfc7517
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    /// Key type: `EC` or `OKP`.
    pub kty: String,
    /// Curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// X coordinate (or the whole key for `OKP`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Other members (`kid`, `use`, `alg`...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of a verification relationship such as `assertionMethod`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationRelationship {
    /// Reference to a method by id.
    Reference(String),
    /// Legacy wrapper `{ "type": ..., "publicKey": "<id>" }`.
    Legacy(LegacyReference),
    /// A method declared inline.
    Embedded(Box<VerificationMethod>),
}

impl VerificationRelationship {
    /// The id of the method this entry points at.
    pub fn id(&self) -> &str {
        match self {
            VerificationRelationship::Reference(id) => id,
            VerificationRelationship::Legacy(legacy) => &legacy.public_key,
            VerificationRelationship::Embedded(method) => &method.id,
        }
    }
}

/// Legacy relationship entry naming a key through `publicKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyReference {
    /// Id of the referenced key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// Why a key is being used, selecting a verification relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// Issuing claims and credentials.
    AssertionMethod,
    /// Proving control of the DID.
    Authentication,
    /// Granting capabilities to others.
    CapabilityDelegation,
    /// Invoking a capability.
    CapabilityInvocation,
}

impl ProofPurpose {
    /// The relationship property name in a DID document.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProofPurpose::AssertionMethod => "assertionMethod",
            ProofPurpose::Authentication => "authentication",
            ProofPurpose::CapabilityDelegation => "capabilityDelegation",
            ProofPurpose::CapabilityInvocation => "capabilityInvocation",
        }
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DID document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// The DID this document describes.
    pub id: String,

    /// Verification methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// Pre-standard list of keys, treated like `verificationMethod`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<VerificationMethod>>,

    /// `authentication` relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<VerificationRelationship>>,

    /// `assertionMethod` relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<VerificationRelationship>>,

    /// `capabilityDelegation` relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<VerificationRelationship>>,

    /// `capabilityInvocation` relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<VerificationRelationship>>,

    /// `keyAgreement` relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<VerificationRelationship>>,

    /// Service endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Value>>,
}

impl DidDocument {
    /// Every declared method: `verificationMethod` followed by `publicKey`.
    pub fn key_pool(&self) -> Vec<VerificationMethod> {
        self.verification_method
            .iter()
            .flatten()
            .chain(self.public_key.iter().flatten())
            .cloned()
            .collect()
    }

    /// The relationship list for `purpose`, if the document declares one.
    pub fn relationship(&self, purpose: ProofPurpose) -> Option<&[VerificationRelationship]> {
        match purpose {
            ProofPurpose::AssertionMethod => self.assertion_method.as_deref(),
            ProofPurpose::Authentication => self.authentication.as_deref(),
            ProofPurpose::CapabilityDelegation => self.capability_delegation.as_deref(),
            ProofPurpose::CapabilityInvocation => self.capability_invocation.as_deref(),
        }
    }
}

/// Metadata describing the outcome of a resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// Media type of the returned document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Error code such as `notFound` or `invalidDid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Method-specific members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A [DID resolution result].
///
/// [DID resolution result]: https://www.w3.org/TR/did-core/#did-resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidResolutionResult {
    /// The resolved document, `None` when resolution failed.
    #[serde(default)]
    pub did_document: Option<DidDocument>,
    /// Resolution metadata.
    #[serde(default)]
    pub did_resolution_metadata: ResolutionMetadata,
    /// Document metadata.
    #[serde(default)]
    pub did_document_metadata: Map<String, Value>,
}

impl DidResolutionResult {
    /// A successful result around `document`.
    pub fn from_document(document: DidDocument) -> Self {
        Self {
            did_document: Some(document),
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(DID_JSON.to_string()),
                ..Default::default()
            },
            did_document_metadata: Map::new(),
        }
    }

    /// A failed result carrying the `error` code and `message`.
    pub fn error(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            did_document: None,
            did_resolution_metadata: ResolutionMetadata {
                error: Some(error.into()),
                message: Some(message.into()),
                ..Default::default()
            },
            did_document_metadata: Map::new(),
        }
    }
}

/// Media type requested from resolvers.
pub const DID_JSON: &str = "application/did+json";

/// What a resolver hands back.
///
/// Older resolvers return the bare document instead of a full resolution
/// result. The two shapes are told apart once, when the response is
/// parsed, and normalized with [`Resolution::into_result`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A bare DID document.
    Legacy(DidDocument),
    /// A full resolution result.
    Result(DidResolutionResult),
}

impl Resolution {
    /// Parse a resolver's JSON response.
    ///
    /// Objects with a `didDocument` member are resolution results;
    /// anything else is read as a bare document.
    pub fn from_json(value: Value) -> Result<Self, JwtError> {
        let is_result = value
            .as_object()
            .is_some_and(|object| object.contains_key("didDocument"));

        if is_result {
            serde_json::from_value(value)
                .map(Resolution::Result)
                .map_err(|e| JwtError::Resolution(format!("invalid resolution result: {e}")))
        } else {
            serde_json::from_value(value)
                .map(Resolution::Legacy)
                .map_err(|e| JwtError::Resolution(format!("invalid DID document: {e}")))
        }
    }

    /// Normalize into a resolution result.
    pub fn into_result(self) -> DidResolutionResult {
        match self {
            Resolution::Legacy(document) => DidResolutionResult {
                did_document: Some(document),
                ..Default::default()
            },
            Resolution::Result(result) => result,
        }
    }
}
