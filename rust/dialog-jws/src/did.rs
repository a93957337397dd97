//! DID (Decentralized Identifier) and DID URL types.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A [Decentralized Identifier][did-core] string.
///
/// Wraps a raw DID string like `did:ethr:0xabc...` or `did:web:example.com`.
/// Use [`method()`][Did::method] to inspect the DID method at runtime.
///
/// [did-core]: https://www.w3.org/TR/did-core/
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Did(String);

impl Did {
    /// Get the raw DID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the DID method name (e.g. `"ethr"` for `did:ethr:...`).
    #[must_use]
    pub fn method(&self) -> &str {
        self.0["did:".len()..].split(':').next().unwrap_or_default()
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error when parsing a DID or DID URL string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid DID: {0}")]
pub struct DidParseError(pub String);

impl FromStr for Did {
    type Err = DidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix("did:") else {
            return Err(DidParseError(format!("expected did: prefix, got: {s}")));
        };
        // Must have at least did:method:identifier
        let Some((method, identifier)) = rest.split_once(':') else {
            return Err(DidParseError(format!(
                "expected did:method:identifier, got: {s}"
            )));
        };
        if method.is_empty() || identifier.is_empty() {
            return Err(DidParseError(format!(
                "expected did:method:identifier, got: {s}"
            )));
        }
        if s.contains(['#', '?', '/']) {
            return Err(DidParseError(format!(
                "expected a bare DID without path, query or fragment, got: {s}"
            )));
        }
        Ok(Did(s.to_string()))
    }
}

impl TryFrom<String> for Did {
    type Error = DidParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Did {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A DID URL: a DID optionally followed by a path, query and fragment.
///
/// An issuer may name one specific key of its document
/// (`did:example:123#key-1`), in which case only that key is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidUrl {
    url: String,
    did: Did,
    fragment: Option<String>,
}

impl DidUrl {
    /// The full DID URL as given.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The bare DID the URL is rooted at.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// The fragment without its leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether the URL is just the DID, naming no particular key.
    pub fn is_bare(&self) -> bool {
        self.url == self.did.as_str()
    }
}

impl fmt::Display for DidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl FromStr for DidUrl {
    type Err = DidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (before_fragment, fragment) = match s.split_once('#') {
            Some((head, fragment)) => (head, Some(fragment.to_string())),
            None => (s, None),
        };
        let end = before_fragment
            .find(['?', '/'])
            .unwrap_or(before_fragment.len());
        let did = before_fragment[..end].parse()?;

        Ok(DidUrl {
            url: s.to_string(),
            did,
            fragment,
        })
    }
}
