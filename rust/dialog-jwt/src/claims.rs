//! JOSE header and JWT claim set.

use dialog_jws::{Algorithm, JwtError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The algorithm used when a header does not name one.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::Es256K;

/// Content type marking a payload that wraps another JWT in its `jwt` claim.
pub const NESTED_CONTENT_TYPE: &str = "JWT";

/// The JOSE header of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, `JWT` for tokens created by [`create_jwt`](crate::create_jwt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Signature algorithm name, kept as written so unknown names surface
    /// as `not_supported` at verification time rather than at decode time.
    pub alg: String,

    /// Content type; `JWT` when the payload nests another token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// Key identifier, a DID URL for SIOP tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Any other header members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Header {
    fn default() -> Self {
        Self::new(DEFAULT_ALGORITHM)
    }
}

impl Header {
    /// A header for `algorithm` with no other members.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            typ: None,
            alg: algorithm.to_string(),
            cty: None,
            kid: None,
            extra: Map::new(),
        }
    }

    /// Set `typ`.
    pub fn with_typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// Set `cty`.
    pub fn with_cty(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    /// Set `kid`.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// The parsed `alg`.
    pub fn algorithm(&self) -> Result<Algorithm, JwtError> {
        self.alg.parse()
    }

    /// Whether the payload wraps another JWT.
    pub fn is_nested(&self) -> bool {
        self.cty.as_deref() == Some(NESTED_CONTENT_TYPE)
    }
}

/// The `aud` claim, a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "did:example:verifier"`
    Single(String),
    /// `"aud": ["did:example:a", "https://example.com/callback"]`
    Many(Vec<String>),
}

impl Audience {
    /// Every listed audience.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Audience::Single(value) => std::slice::from_ref(value),
            Audience::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::Single(value.to_string())
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Audience::Single(value)
    }
}

impl From<Vec<String>> for Audience {
    fn from(values: Vec<String>) -> Self {
        Audience::Many(values)
    }
}

/// The claim set of a JWT.
///
/// Registered claims get typed fields; everything else lands in
/// [`Claims::extra`] and survives a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "numeric_date::deserialize"
    )]
    pub iat: Option<u64>,

    /// Expiration time.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "numeric_date::deserialize"
    )]
    pub exp: Option<u64>,

    /// Not before.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "numeric_date::deserialize"
    )]
    pub nbf: Option<u64>,

    /// Issuer, normally a DID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Private and unregistered claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reading [NumericDate] claims into whole seconds.
///
/// Fractions are floored and instants before the epoch read as `0`, which
/// keeps them in the past for every temporal check.
///
/// [NumericDate]: https://www.rfc-editor.org/rfc/rfc7519#section-2
mod numeric_date {
    use serde::{Deserialize, Deserializer};
    use serde_json::Number;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(Option::<Number>::deserialize(deserializer)?.map(|number| seconds(&number)))
    }

    fn seconds(number: &Number) -> u64 {
        if let Some(seconds) = number.as_u64() {
            return seconds;
        }
        match number.as_f64() {
            Some(seconds) if seconds > 0.0 => seconds.floor() as u64,
            _ => 0,
        }
    }
}

impl Claims {
    /// An empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `sub`.
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set `aud`.
    pub fn with_audience(mut self, aud: impl Into<Audience>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Set `iat`.
    pub fn with_issued_at(mut self, iat: u64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set `nbf`.
    pub fn with_not_before(mut self, nbf: u64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Set `exp`.
    pub fn with_expiration(mut self, exp: u64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set an unregistered claim.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// An unregistered claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// An unregistered claim, if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }

    /// The token carried in the `jwt` claim of a nesting layer.
    pub fn nested_jwt(&self) -> Option<&str> {
        self.get_str("jwt")
    }
}
