//! DID-to-document resolution.

use std::{collections::HashMap, convert::Infallible, future::Future};

use crate::{
    did::Did,
    document::{DidDocument, DidResolutionResult, Resolution},
};

/// Resolution error codes that let a [`CompositeResolver`] try its fallback.
const UNRESOLVED: [&str; 2] = ["notFound", "methodNotSupported"];

/// Resolves a DID to its document.
///
/// Async to support network-based DID methods (e.g. did:web, did:ethr).
/// Implementations report "this DID does not exist" through the resolution
/// metadata of an `Ok` result, and reserve `Err` for transport failures.
pub trait Resolver {
    /// Error type for resolution failures.
    type Error: std::error::Error;

    /// Resolve `did`, asking for the `accept` representation.
    fn resolve(
        &self,
        did: &Did,
        accept: &str,
    ) -> impl Future<Output = Result<Resolution, Self::Error>>;

    /// Fall back to `other` for DIDs this resolver cannot resolve.
    ///
    /// ```ignore
    /// let resolver = static_documents.or(ethr_resolver);
    /// ```
    fn or<R>(self, other: R) -> CompositeResolver<Self, R>
    where
        Self: Sized,
    {
        CompositeResolver(self, other)
    }
}

impl<T: Resolver> Resolver for &T {
    type Error = T::Error;

    fn resolve(
        &self,
        did: &Did,
        accept: &str,
    ) -> impl Future<Output = Result<Resolution, Self::Error>> {
        (**self).resolve(did, accept)
    }
}

/// A resolver that asks its first resolver, and the second one when the
/// first fails or reports the DID as unknown.
///
/// Built via [`Resolver::or`].
#[derive(Debug, Clone, Copy)]
pub struct CompositeResolver<L, R>(pub L, pub R);

impl<L: Resolver, R: Resolver> Resolver for CompositeResolver<L, R> {
    type Error = R::Error;

    async fn resolve(&self, did: &Did, accept: &str) -> Result<Resolution, Self::Error> {
        match self.0.resolve(did, accept).await {
            Ok(Resolution::Result(result)) if is_unresolved(&result) => {
                tracing::trace!(%did, "first resolver does not know DID, falling back");
            }
            Ok(resolution) => return Ok(resolution),
            Err(error) => {
                tracing::debug!(%did, %error, "first resolver failed, falling back");
            }
        }
        self.1.resolve(did, accept).await
    }
}

fn is_unresolved(result: &DidResolutionResult) -> bool {
    result
        .did_resolution_metadata
        .error
        .as_deref()
        .is_some_and(|error| UNRESOLVED.contains(&error))
}

/// Resolves DIDs from documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    resolutions: HashMap<Did, Resolution>,
}

impl MemoryResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for `did`.
    pub fn with_document(mut self, did: Did, document: DidDocument) -> Self {
        self.insert(did, Resolution::Result(DidResolutionResult::from_document(document)));
        self
    }

    /// Serve a prepared response for `did`.
    pub fn with_resolution(mut self, did: Did, resolution: Resolution) -> Self {
        self.insert(did, resolution);
        self
    }

    /// Serve a prepared response for `did`.
    pub fn insert(&mut self, did: Did, resolution: Resolution) {
        self.resolutions.insert(did, resolution);
    }
}

impl Resolver for MemoryResolver {
    type Error = Infallible;

    async fn resolve(&self, did: &Did, _accept: &str) -> Result<Resolution, Self::Error> {
        Ok(self.resolutions.get(did).cloned().unwrap_or_else(|| {
            Resolution::Result(DidResolutionResult::error(
                "notFound",
                format!("{did} is not known to this resolver"),
            ))
        }))
    }
}
