//! JWT verification.
//!
//! The flow:
//!
//! 1. Decode the outer layer
//! 2. Work out which DID (or DID URL) the token speaks for
//! 3. Resolve that DID to candidate verification methods, unless the
//!    caller supplied them
//! 4. Find the candidate that produced the signature, unwinding nested
//!    layers and evaluating conditional proofs on the way
//! 5. Check `nbf`, `iat`, `exp` and `aud` on every layer

use dialog_jws::{
    CONDITIONAL_PROOF_2022, DidResolutionResult, DidUrl, JwtError, Resolver, VerificationMethod,
    Verifier,
};
use futures::future::{FutureExt, LocalBoxFuture};

use crate::{
    authenticator::{DidAuthenticator, resolve_authenticator},
    claims::{Claims, Header},
    codec::{Envelope, MAX_NESTING_DEPTH, decode_jws, decode_layer, decode_layers_within},
    conditional::verify_conditional_proof,
    options::{VerifyOptions, VerifyPolicies},
    policy::check_claims,
};

/// `iss` of Self-Issued OpenID Provider v2 tokens.
pub const SELF_ISSUED_V2: &str = "https://self-issued.me/v2";

/// `iss` of Self-Issued OpenID Provider v2 tokens for the VC interop profile.
pub const SELF_ISSUED_V2_VC_INTEROP: &str = "https://self-issued.me/v2/openid-vc";

/// `iss` of Self-Issued OpenID Provider v0.1 tokens.
pub const SELF_ISSUED_V0_1: &str = "https://self-issued.me";

/// A successfully verified JWT.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Always `true`; failures are reported as errors.
    pub verified: bool,
    /// Header of the outer layer.
    pub header: Header,
    /// Claims of the innermost layer.
    pub claims: Claims,
    /// The DID or DID URL the token was verified for.
    pub issuer: String,
    /// The verification method that matched.
    pub signer: VerificationMethod,
    /// The resolution the signer was taken from.
    pub resolution: DidResolutionResult,
    /// The verified token.
    pub jwt: String,
    /// The claim checks that were applied.
    pub policies: VerifyPolicies,
}

/// Verify `jwt`, resolving its issuer through `resolver`.
pub async fn verify_jwt<R, V>(
    jwt: &str,
    options: &VerifyOptions,
    resolver: &R,
    verifier: &V,
) -> Result<VerificationResult, JwtError>
where
    R: Resolver,
    V: Verifier,
{
    verify_at_depth(jwt, options, resolver, verifier, 0).await
}

/// One verification, `depth` conditional proofs deep.
///
/// Boxed because conditional proofs verify the same token again.
pub(crate) fn verify_at_depth<'a, R, V>(
    jwt: &'a str,
    options: &'a VerifyOptions,
    resolver: &'a R,
    verifier: &'a V,
    depth: usize,
) -> LocalBoxFuture<'a, Result<VerificationResult, JwtError>>
where
    R: Resolver,
    V: Verifier,
{
    async move {
        if depth > options.max_depth() {
            return Err(JwtError::InvalidEnvelope(format!(
                "conditional proofs nest deeper than {}",
                options.max_depth()
            )));
        }

        let envelope = decode_layer(jwt)?;
        let issuer = subject_identifier(&envelope, options)?;

        let context = match &options.authenticator {
            Some(context) => context.clone(),
            None => {
                resolve_authenticator(
                    resolver,
                    verifier,
                    &envelope.header.alg,
                    &issuer,
                    options.purpose(),
                )
                .await?
            }
        };
        let scoped = options.clone().with_authenticator(context.clone());

        let signer = find_signer(jwt, &envelope, &issuer, &context, &scoped, resolver, verifier, depth)
            .await?;
        tracing::debug!(%issuer, signer = %signer.id, depth, "signature verified");

        let now = options.now();
        let mut layers = decode_layers_within(jwt, options.max_depth())?;
        for layer in &layers {
            check_claims(&layer.claims, options, now)
                .inspect_err(|error| tracing::debug!(%issuer, %error, "claims rejected"))?;
        }
        let claims = layers
            .pop()
            .map(|layer| layer.claims)
            .unwrap_or_else(|| envelope.claims.clone());

        Ok(VerificationResult {
            verified: true,
            header: envelope.header,
            claims,
            issuer,
            signer,
            resolution: context.resolution,
            jwt: jwt.to_string(),
            policies: options.policies,
        })
    }
    .boxed_local()
}

/// The DID or DID URL whose keys must have signed `envelope`.
fn subject_identifier(envelope: &Envelope, options: &VerifyOptions) -> Result<String, JwtError> {
    let claims = &envelope.claims;
    if claims.iss.is_none() && claims.get("client_id").is_none() {
        return Err(JwtError::InvalidEnvelope(
            "JWT iss or client_id are required".into(),
        ));
    }

    let did = if let Some(context) = &options.authenticator {
        Some(context.issuer.clone())
    } else {
        match claims.iss.as_deref() {
            Some(SELF_ISSUED_V2 | SELF_ISSUED_V2_VC_INTEROP) => {
                let sub = claims
                    .sub
                    .as_deref()
                    .ok_or_else(|| JwtError::InvalidEnvelope("JWT sub is required".into()))?;
                if claims.get("sub_jwk").is_none() {
                    Some(sub.to_string())
                } else {
                    envelope
                        .header
                        .kid
                        .as_deref()
                        .and_then(|kid| kid.split('#').next())
                        .map(str::to_string)
                }
            }
            Some(SELF_ISSUED_V0_1) => Some(
                claims
                    .get_str("did")
                    .ok_or_else(|| JwtError::InvalidEnvelope("JWT did is required".into()))?
                    .to_string(),
            ),
            None if claims.get_str("scope") == Some("openid")
                && claims.get("redirect_uri").is_some() =>
            {
                Some(
                    claims
                        .get_str("client_id")
                        .ok_or_else(|| {
                            JwtError::InvalidEnvelope("JWT client_id is required".into())
                        })?
                        .to_string(),
                )
            }
            iss => iss.map(str::to_string),
        }
    };

    did.filter(|did| !did.is_empty())
        .ok_or_else(|| JwtError::InvalidEnvelope("No DID has been found in the JWT".into()))
}

/// Whether `issuer` names one verification method rather than a whole DID.
pub(crate) fn names_method(issuer: &str) -> bool {
    issuer
        .parse::<DidUrl>()
        .is_ok_and(|url| !url.is_bare())
}

#[allow(clippy::too_many_arguments)]
async fn find_signer<R, V>(
    jwt: &str,
    envelope: &Envelope,
    issuer: &str,
    context: &DidAuthenticator,
    options: &VerifyOptions,
    resolver: &R,
    verifier: &V,
    depth: usize,
) -> Result<VerificationMethod, JwtError>
where
    R: Resolver,
    V: Verifier,
{
    if names_method(issuer) {
        let authenticator = context
            .authenticators
            .iter()
            .find(|method| method.id == issuer)
            .ok_or_else(|| {
                JwtError::InvalidEnvelope(format!("No authenticator found for did URL {issuer}"))
            })?;
        return verify_proof(jwt, envelope, authenticator, options, resolver, verifier, depth)
            .await;
    }

    let mut candidates = context.authenticators.iter().peekable();
    while let Some(authenticator) = candidates.next() {
        match verify_proof(jwt, envelope, authenticator, options, resolver, verifier, depth).await
        {
            Ok(signer) => return Ok(signer),
            Err(error) if error.is_invalid_signature() && candidates.peek().is_some() => {
                tracing::trace!(candidate = %authenticator.id, %error, "candidate did not match");
            }
            Err(error) => return Err(error),
        }
    }

    Err(JwtError::InvalidSignature(
        "JWT not valid. issuer DID document does not contain a verificationMethod that matches the signature.".into(),
    ))
}

/// Check `envelope` against one candidate.
async fn verify_proof<R, V>(
    jwt: &str,
    envelope: &Envelope,
    authenticator: &VerificationMethod,
    options: &VerifyOptions,
    resolver: &R,
    verifier: &V,
    depth: usize,
) -> Result<VerificationMethod, JwtError>
where
    R: Resolver,
    V: Verifier,
{
    if authenticator.method_type == CONDITIONAL_PROOF_2022 {
        verify_conditional_proof(jwt, envelope, authenticator, options, resolver, verifier, depth)
            .await
    } else {
        verify_layers(
            envelope,
            std::slice::from_ref(authenticator),
            verifier,
            options.max_depth(),
        )
        .await
    }
}

/// Verify a decoded JWT against `authenticators`.
///
/// When no candidate matches a layer that nests another token, the inner
/// layer is tried next; every inner layer must carry the outer `iss`.
pub async fn verify_jwt_decoded<V: Verifier>(
    envelope: &Envelope,
    authenticators: &[VerificationMethod],
    verifier: &V,
) -> Result<VerificationMethod, JwtError> {
    verify_layers(envelope, authenticators, verifier, MAX_NESTING_DEPTH).await
}

/// [`verify_jwt_decoded`], unwinding at most `max_depth` nested layers.
pub(crate) async fn verify_layers<V: Verifier>(
    envelope: &Envelope,
    authenticators: &[VerificationMethod],
    verifier: &V,
    max_depth: usize,
) -> Result<VerificationMethod, JwtError> {
    let mut layer = envelope.clone();

    for _ in 0..=max_depth {
        let algorithm = layer.header.algorithm()?;
        let error = match verifier
            .verify(
                algorithm,
                layer.signing_input.as_bytes(),
                &layer.signature,
                authenticators,
            )
            .await
        {
            Ok(signer) => return Ok(signer),
            Err(error) if error.is_invalid_signature() => error,
            Err(error) => return Err(error),
        };

        let Some(inner) = layer.nested()? else {
            return Err(error);
        };
        let inner = decode_layer(inner)?;
        if inner.claims.iss != envelope.claims.iss {
            return Err(JwtError::InvalidEnvelope("multiple issuers".into()));
        }
        tracing::trace!(%error, "outer layer did not match, trying nested token");
        layer = inner;
    }

    Err(JwtError::InvalidEnvelope(format!(
        "more than {max_depth} nested layers"
    )))
}

/// Verify a compact JWS against `authenticators`.
pub async fn verify_jws<V: Verifier>(
    jws: &str,
    authenticators: &[VerificationMethod],
    verifier: &V,
) -> Result<VerificationMethod, JwtError> {
    let decoded = decode_jws(jws)?;
    verifier
        .verify(
            decoded.header.algorithm()?,
            decoded.signing_input.as_bytes(),
            &decoded.signature,
            authenticators,
        )
        .await
}
