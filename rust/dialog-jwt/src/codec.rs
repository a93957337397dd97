//! Compact serialization: `base64url(header).base64url(payload).signature`.

use dialog_jws::{
    JwtError,
    encoding::{decode_base64url, encode_base64url},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::claims::{Claims, Header};

/// How many nested layers [`decode`] unwinds before giving up.
pub const MAX_NESTING_DEPTH: usize = 8;

/// A decoded JWS with an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Jws {
    /// The decoded header.
    pub header: Header,
    /// The payload segment, still base64url encoded.
    pub payload: String,
    /// The signature segment.
    pub signature: String,
    /// `header.payload`, the bytes the signature covers.
    pub signing_input: String,
}

/// A decoded JWT.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The decoded header.
    pub header: Header,
    /// The decoded claim set.
    pub claims: Claims,
    /// The signature segment.
    pub signature: String,
    /// `header.payload`, the bytes the signature covers.
    pub signing_input: String,
}

impl Envelope {
    /// The token wrapped by this layer, when the header marks it as nesting.
    ///
    /// A nesting header over a payload without a `jwt` string is an
    /// invalid envelope.
    pub fn nested(&self) -> Result<Option<&str>, JwtError> {
        if !self.header.is_nested() {
            return Ok(None);
        }
        self.claims.nested_jwt().map(Some).ok_or_else(|| {
            JwtError::InvalidEnvelope("nested JWT header without a jwt claim".into())
        })
    }
}

/// Serialize `value` as JSON and base64url encode it.
///
/// With `canonicalize`, members are serialized in RFC 8785 (JCS) order.
pub fn encode_section<T: Serialize + ?Sized>(
    value: &T,
    canonicalize: bool,
) -> Result<String, JwtError> {
    let json = if canonicalize {
        serde_jcs::to_string(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| JwtError::InvalidArgument(format!("cannot serialize token section: {e}")))?;

    Ok(encode_base64url(json))
}

/// `base64url(header) . base64url(payload)`.
pub fn signing_input<H, P>(header: &H, payload: &P, canonicalize: bool) -> Result<String, JwtError>
where
    H: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    Ok(format!(
        "{}.{}",
        encode_section(header, canonicalize)?,
        encode_section(payload, canonicalize)?
    ))
}

/// Split `token` into its three segments.
fn split(token: &str) -> Result<[&str; 3], JwtError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(JwtError::MalformedEnvelope(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    for segment in [header, payload, signature] {
        let alphabet = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if segment.is_empty() || !segment.chars().all(alphabet) {
            return Err(JwtError::MalformedEnvelope(
                "segments must be non-empty base64url".into(),
            ));
        }
    }
    Ok([*header, *payload, *signature])
}

/// Decode one base64url segment.
///
/// A lone final symbol carries fewer than eight bits and decodes to
/// nothing, so `a` is an empty section rather than a malformed one.
fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, JwtError> {
    let whole = match segment.len() % 4 {
        1 => &segment[..segment.len() - 1],
        _ => segment,
    };
    decode_base64url(whole)
        .map_err(|e| JwtError::MalformedEnvelope(format!("{name} is not base64url: {e}")))
}

fn parse_segment<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T, JwtError> {
    serde_json::from_slice(bytes)
        .map_err(|e| JwtError::InvalidEnvelope(format!("{name} is not a JSON object: {e}")))
}

/// Decode a compact JWS, leaving the payload encoded.
pub fn decode_jws(jws: &str) -> Result<Jws, JwtError> {
    let [header, payload, signature] = split(jws)?;
    let header_bytes = decode_segment("header", header)?;
    decode_segment("payload", payload)?;

    Ok(Jws {
        header: parse_segment("header", &header_bytes)?,
        payload: payload.to_string(),
        signature: signature.to_string(),
        signing_input: format!("{header}.{payload}"),
    })
}

/// Decode one layer of a compact JWT.
pub fn decode_layer(jwt: &str) -> Result<Envelope, JwtError> {
    let [header, payload, signature] = split(jwt)?;
    let header_bytes = decode_segment("header", header)?;
    let payload_bytes = decode_segment("payload", payload)?;

    Ok(Envelope {
        header: parse_segment("header", &header_bytes)?,
        claims: parse_segment("payload", &payload_bytes)?,
        signature: signature.to_string(),
        signing_input: format!("{header}.{payload}"),
    })
}

/// Decode every layer of a compact JWT, outermost first.
///
/// Each inner layer must carry the same `iss` as the outer one.
pub fn decode_layers(jwt: &str) -> Result<Vec<Envelope>, JwtError> {
    decode_layers_within(jwt, MAX_NESTING_DEPTH)
}

/// [`decode_layers`], allowing at most `max_depth` nested layers under the
/// outer one.
pub fn decode_layers_within(jwt: &str, max_depth: usize) -> Result<Vec<Envelope>, JwtError> {
    let outer = decode_layer(jwt)?;
    let mut layers = vec![outer];

    loop {
        let current = &layers[layers.len() - 1];
        let Some(inner) = current.nested()? else {
            return Ok(layers);
        };
        if layers.len() > max_depth {
            return Err(JwtError::InvalidEnvelope(format!(
                "more than {max_depth} nested layers"
            )));
        }

        let inner = decode_layer(inner)?;
        if inner.claims.iss != layers[0].claims.iss {
            return Err(JwtError::InvalidEnvelope("multiple issuers".into()));
        }
        layers.push(inner);
    }
}

/// Decode a compact JWT.
///
/// With `recurse`, nested layers are unwound and the innermost one is
/// returned.
pub fn decode(jwt: &str, recurse: bool) -> Result<Envelope, JwtError> {
    if !recurse {
        return decode_layer(jwt);
    }
    decode_layers(jwt)?
        .pop()
        .ok_or_else(|| JwtError::MalformedEnvelope("no layers".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::NESTED_CONTENT_TYPE;
    use dialog_jws::Algorithm;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    fn unsigned(header: &Header, claims: &Claims) -> Result<String, JwtError> {
        Ok(format!("{}.c2ln", signing_input(header, claims, false)?))
    }

    fn claims(iss: &str) -> Claims {
        Claims {
            iss: Some(iss.into()),
            ..Default::default()
        }
    }

    fn wrap(inner: &str, iss: &str) -> Result<String, JwtError> {
        unsigned(
            &Header::new(Algorithm::Es256K).with_cty(NESTED_CONTENT_TYPE),
            &claims(iss).with("jwt", inner),
        )
    }

    #[test]
    fn it_rejects_tokens_without_three_segments() {
        for token in ["not.a.jwt.really", "not-a-jwt", "a..c", "", "a.b.c=", "a.b+.c"] {
            assert!(
                matches!(decode(token, false), Err(JwtError::MalformedEnvelope(_))),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn non_canonical_segments_are_malformed() {
        // "not" leaves non-zero trailing bits.
        assert!(matches!(decode("not.a.jwt", false), Err(JwtError::MalformedEnvelope(_))));
        assert!(matches!(decode("YR.Yg.Yw", false), Err(JwtError::MalformedEnvelope(_))));
    }

    #[test]
    fn segments_that_decode_to_non_json_are_invalid() {
        // Lone symbols decode to empty sections.
        assert!(matches!(decode("a.b.c", false), Err(JwtError::InvalidEnvelope(_))));
        // "a", "b", "c"
        assert!(matches!(decode("YQ.Yg.Yw", false), Err(JwtError::InvalidEnvelope(_))));
    }

    #[test]
    fn lone_trailing_symbols_are_dropped() -> TestResult {
        let header = encode_section(&Header::default(), false)?;
        // Nine bytes encode to twelve symbols with nothing left over.
        let payload = encode_base64url(r#"{"abc":1}"#);

        let envelope = decode(&format!("{header}.{payload}A.c2ln"), false)?;
        assert_eq!(envelope.claims.get("abc"), Some(&json!(1)));
        assert_eq!(envelope.signing_input, format!("{header}.{payload}A"));
        Ok(())
    }

    #[test]
    fn it_keeps_the_exact_signing_input() -> TestResult {
        let token = unsigned(&Header::default().with_typ("JWT"), &claims("did:example:a"))?;
        let envelope = decode(&token, false)?;

        assert_eq!(format!("{}.{}", envelope.signing_input, envelope.signature), token);
        assert_eq!(envelope.header.typ.as_deref(), Some("JWT"));
        assert_eq!(envelope.claims.iss.as_deref(), Some("did:example:a"));
        Ok(())
    }

    #[test]
    fn canonical_sections_sort_members() -> TestResult {
        let value = json!({ "b": 1, "a": { "d": 2, "c": 3 } });
        let encoded = encode_section(&value, true)?;
        assert_eq!(
            decode_base64url(&encoded)?,
            br#"{"a":{"c":3,"d":2},"b":1}"#.to_vec()
        );
        Ok(())
    }

    #[test]
    fn jws_payloads_stay_encoded() -> TestResult {
        let token = format!(
            "{}.{}.c2ln",
            encode_section(&Header::new(Algorithm::EdDsa), false)?,
            encode_base64url("not json at all")
        );
        let jws = decode_jws(&token)?;
        assert_eq!(decode_base64url(&jws.payload)?, b"not json at all".to_vec());
        assert_eq!(jws.header.alg, "EdDSA");
        Ok(())
    }

    #[test]
    fn recursion_returns_the_innermost_layer() -> TestResult {
        let inner = unsigned(&Header::default(), &claims("did:example:a").with("secret", 42))?;
        let outer = wrap(&wrap(&inner, "did:example:a")?, "did:example:a")?;

        let envelope = decode(&outer, true)?;
        assert_eq!(envelope.claims.get("secret"), Some(&json!(42)));
        assert_eq!(decode_layers(&outer)?.len(), 3);
        assert!(decode(&outer, false)?.claims.nested_jwt().is_some());
        Ok(())
    }

    #[test]
    fn nested_layers_must_share_an_issuer() -> TestResult {
        let inner = unsigned(&Header::default(), &claims("did:example:a"))?;
        let outer = wrap(&inner, "did:example:b")?;

        assert!(matches!(decode(&outer, true), Err(JwtError::InvalidEnvelope(_))));
        assert!(decode(&outer, false).is_ok());
        Ok(())
    }

    #[test]
    fn nesting_is_bounded() -> TestResult {
        let mut token = unsigned(&Header::default(), &claims("did:example:a"))?;
        for _ in 0..=MAX_NESTING_DEPTH {
            token = wrap(&token, "did:example:a")?;
        }
        assert!(matches!(decode(&token, true), Err(JwtError::InvalidEnvelope(_))));
        Ok(())
    }

    #[test]
    fn nesting_can_be_bounded_tighter() -> TestResult {
        let inner = unsigned(&Header::default(), &claims("did:example:a"))?;
        let once = wrap(&inner, "did:example:a")?;
        let twice = wrap(&once, "did:example:a")?;

        assert_eq!(decode_layers_within(&once, 1)?.len(), 2);
        assert!(matches!(decode_layers_within(&twice, 1), Err(JwtError::InvalidEnvelope(_))));
        assert!(matches!(decode_layers_within(&once, 0), Err(JwtError::InvalidEnvelope(_))));
        assert_eq!(decode_layers_within(&inner, 0)?.len(), 1);
        Ok(())
    }

    #[test]
    fn nesting_headers_need_a_jwt_claim() -> TestResult {
        let token = unsigned(
            &Header::default().with_cty(NESTED_CONTENT_TYPE),
            &claims("did:example:a"),
        )?;
        assert!(matches!(decode(&token, true), Err(JwtError::InvalidEnvelope(_))));
        Ok(())
    }
}
