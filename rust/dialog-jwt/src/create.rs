//! Issuing tokens.

use dialog_jws::{JwtError, Signer};

use crate::{
    claims::{Claims, Header, NESTED_CONTENT_TYPE},
    codec::encode_section,
    options::{Issuer, JwtOptions, MultisigOptions},
    time,
};

/// What a JWS signs over.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// A claim set, serialized and encoded here.
    Claims(&'a Claims),
    /// An already base64url encoded payload segment, signed as is.
    Encoded(&'a str),
}

/// Sign `payload` under `header` and return the compact JWS.
///
/// The algorithm is taken from `header.alg`.
pub async fn create_jws<S: Signer>(
    payload: Payload<'_>,
    signer: &S,
    header: &Header,
    canonicalize: bool,
) -> Result<String, JwtError> {
    let algorithm = header.algorithm()?;
    let encoded_payload = match payload {
        Payload::Claims(claims) => encode_section(claims, canonicalize)?,
        Payload::Encoded(encoded) => encoded.to_string(),
    };
    let signing_input = format!("{}.{}", encode_section(header, canonicalize)?, encoded_payload);

    let signature = signer.sign(algorithm, signing_input.as_bytes()).await?;
    tracing::trace!(%algorithm, "signed token");
    Ok(format!("{signing_input}.{signature}"))
}

/// Issue a JWT for `claims` signed by `options.issuer`.
///
/// `typ` defaults to `JWT`. `iat` defaults to now; with
/// `options.expires_in`, `exp` defaults to that many seconds after `nbf`
/// (or after now when there is no `nbf`). `iss` is always
/// `options.issuer`.
pub async fn create_jwt<S: Signer>(
    claims: Claims,
    options: &JwtOptions,
    signer: &S,
    mut header: Header,
) -> Result<String, JwtError> {
    if options.issuer.is_empty() {
        return Err(JwtError::InvalidArgument("JWT issuer is required".into()));
    }
    if header.typ.is_none() {
        header.typ = Some("JWT".into());
    }

    let now = time::now();
    let mut claims = claims;
    let expires_at = options
        .expires_in
        .map(|lifetime| claims.nbf.unwrap_or(now).saturating_add(lifetime));

    claims.iat = claims.iat.or(Some(now));
    claims.exp = claims.exp.or(expires_at);
    claims.iss = Some(options.issuer.clone());

    create_jws(Payload::Claims(&claims), signer, &header, options.canonicalize).await
}

/// Issue a JWT signed by several issuers, one nested layer each.
///
/// The first issuer signs `claims`; every following issuer signs a
/// `{"jwt": <previous token>}` layer with `cty: JWT`. Verification of a
/// nested token requires every layer to carry the same `iss`.
pub async fn create_multisignature_jwt<S: Signer>(
    claims: Claims,
    options: &MultisigOptions,
    issuers: &[Issuer<'_, S>],
) -> Result<String, JwtError> {
    let Some((first, rest)) = issuers.split_first() else {
        return Err(JwtError::InvalidArgument(
            "must provide one or more issuers".into(),
        ));
    };

    let layer_options = |issuer: &Issuer<'_, S>| JwtOptions {
        issuer: issuer.issuer.clone(),
        expires_in: options.expires_in,
        canonicalize: options.canonicalize,
    };

    let mut jwt = create_jwt(
        claims,
        &layer_options(first),
        first.signer,
        Header::new(first.algorithm),
    )
    .await?;

    for issuer in rest {
        jwt = create_jwt(
            Claims::new().with("jwt", jwt),
            &layer_options(issuer),
            issuer.signer,
            Header::new(issuer.algorithm).with_cty(NESTED_CONTENT_TYPE),
        )
        .await?;
    }
    Ok(jwt)
}
