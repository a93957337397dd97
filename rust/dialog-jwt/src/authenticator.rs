//! Resolving an issuer to the verification methods that may have signed.

use dialog_jws::{
    DID_JSON, DidResolutionResult, DidUrl, JwtError, ProofPurpose, Resolver,
    VerificationMethod, VerificationRelationship, Verifier,
};

/// The keys an issuer may have signed with, and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DidAuthenticator {
    /// Candidate verification methods, in document order.
    pub authenticators: Vec<VerificationMethod>,
    /// The DID or DID URL that was resolved.
    pub issuer: String,
    /// The resolution these candidates were taken from.
    pub resolution: DidResolutionResult,
}

/// Resolve `issuer` and select the methods that can verify `alg`
/// signatures for `purpose`.
///
/// Without a purpose, every method in the document is a candidate. With a
/// purpose, candidates come from that relationship; a document that does
/// not declare the relationship at all is treated as listing every method.
pub async fn resolve_authenticator<R, V>(
    resolver: &R,
    verifier: &V,
    alg: &str,
    issuer: &str,
    purpose: Option<ProofPurpose>,
) -> Result<DidAuthenticator, JwtError>
where
    R: Resolver,
    V: Verifier,
{
    let algorithm = alg.parse()?;
    let types = verifier
        .method_types(algorithm)
        .ok_or_else(|| JwtError::UnsupportedAlgorithm(alg.to_string()))?;

    let url: DidUrl = issuer
        .parse()
        .map_err(|e| JwtError::Resolution(format!("invalidDid: {issuer}: {e}")))?;

    let resolution = resolver
        .resolve(url.did(), DID_JSON)
        .await
        .map_err(|e| {
            JwtError::Resolution(format!("Unable to resolve DID document for {issuer}: {e}"))
        })?
        .into_result();

    let metadata = &resolution.did_resolution_metadata;
    if let Some(error) = &metadata.error {
        return Err(JwtError::Resolution(format!(
            "Unable to resolve DID document for {issuer}: {error}, {}",
            metadata.message.as_deref().unwrap_or_default()
        )));
    }
    let document = resolution.did_document.as_ref().ok_or_else(|| {
        JwtError::Resolution(format!("Unable to resolve DID document for {issuer}"))
    })?;

    let pool = document.key_pool();
    let scoped = match purpose.and_then(|purpose| document.relationship(purpose)) {
        Some(entries) => entries
            .iter()
            .filter_map(|entry| dereference(entry, &pool, &document.id))
            .collect(),
        None => pool,
    };

    let authenticators: Vec<VerificationMethod> = scoped
        .into_iter()
        .filter(|method| types.contains(&method.method_type.as_str()))
        .collect();

    if authenticators.is_empty() {
        return Err(JwtError::NoSuitableKeys(match purpose {
            Some(purpose) => format!(
                "DID document for {issuer} does not have public keys suitable for {alg} with {purpose} purpose"
            ),
            None => format!("DID document for {issuer} does not have public keys for {alg}"),
        }));
    }

    tracing::debug!(%issuer, %alg, candidates = authenticators.len(), "resolved authenticators");
    Ok(DidAuthenticator {
        authenticators,
        issuer: issuer.to_string(),
        resolution,
    })
}

/// Look a relationship entry up in the key pool.
///
/// Embedded methods that are not also in the pool stand for themselves.
fn dereference(
    entry: &VerificationRelationship,
    pool: &[VerificationMethod],
    document_id: &str,
) -> Option<VerificationMethod> {
    let id = entry.id();
    let found = pool
        .iter()
        .find(|method| same_id(&method.id, id, document_id))
        .cloned();

    match entry {
        VerificationRelationship::Embedded(method) => found.or_else(|| Some((**method).clone())),
        _ => found,
    }
}

/// Whether two method ids name the same method, with relative `#fragment`
/// ids resolved against the document id.
fn same_id(left: &str, right: &str, document_id: &str) -> bool {
    let absolute = |id: &str| {
        if id.starts_with('#') {
            format!("{document_id}{id}")
        } else {
            id.to_string()
        }
    };
    left == right || absolute(left) == absolute(right)
}
