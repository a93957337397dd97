//! Algorithm-keyed signing dispatch.

use std::{collections::BTreeMap, fmt, sync::Arc};

use dialog_jws::{Algorithm, JwtError, SignatureValue, Signer};

use crate::{Ed25519Signer, Es256KSigner, Es256Signer};

/// What a signing primitive returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutput {
    /// Raw ECDSA scalars, encoded according to the algorithm.
    Ecdsa(SignatureValue),
    /// An already encoded base64url signature.
    Encoded(String),
}

/// A caller-supplied signing callback.
pub type SignerFn = Arc<dyn Fn(&[u8]) -> Result<SignatureOutput, JwtError> + Send + Sync>;

/// One signing primitive.
#[derive(Clone)]
pub enum AlgorithmSigner {
    /// P-256 key.
    Es256(Es256Signer),
    /// secp256k1 key, used for both `ES256K` and `ES256K-R`.
    Es256K(Es256KSigner),
    /// Ed25519 key.
    Ed25519(Ed25519Signer),
    /// External signer, e.g. a hardware wallet.
    Callback(SignerFn),
}

impl fmt::Debug for AlgorithmSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmSigner::Es256(signer) => f.debug_tuple("Es256").field(signer).finish(),
            AlgorithmSigner::Es256K(signer) => f.debug_tuple("Es256K").field(signer).finish(),
            AlgorithmSigner::Ed25519(signer) => f.debug_tuple("Ed25519").field(signer).finish(),
            AlgorithmSigner::Callback(_) => f.write_str("Callback"),
        }
    }
}

impl AlgorithmSigner {
    /// Load `private_key` as the primitive `algorithm` signs with.
    pub fn from_private_key(algorithm: Algorithm, private_key: &[u8]) -> Result<Self, JwtError> {
        Ok(match algorithm {
            Algorithm::Es256 => AlgorithmSigner::Es256(Es256Signer::from_bytes(private_key)?),
            Algorithm::Es256K | Algorithm::Es256KR => {
                AlgorithmSigner::Es256K(Es256KSigner::from_bytes(private_key)?)
            }
            Algorithm::Ed25519 | Algorithm::EdDsa => {
                AlgorithmSigner::Ed25519(Ed25519Signer::from_bytes(private_key)?)
            }
        })
    }

    fn sign(&self, data: &[u8]) -> Result<SignatureOutput, JwtError> {
        match self {
            AlgorithmSigner::Es256(signer) => signer.sign(data).map(SignatureOutput::Ecdsa),
            AlgorithmSigner::Es256K(signer) => signer.sign(data).map(SignatureOutput::Ecdsa),
            AlgorithmSigner::Ed25519(signer) => Ok(SignatureOutput::Encoded(signer.sign(data))),
            AlgorithmSigner::Callback(callback) => callback(data),
        }
    }
}

/// Signs with in-process keys, one per algorithm.
///
/// ```ignore
/// let signer = SoftwareSigner::new(Algorithm::Es256K, &private_key)?;
/// let signature = signer.sign(Algorithm::Es256K, signing_input.as_bytes()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoftwareSigner {
    signers: BTreeMap<Algorithm, AlgorithmSigner>,
}

impl SoftwareSigner {
    /// A signer holding one key for `algorithm`.
    pub fn new(algorithm: Algorithm, private_key: &[u8]) -> Result<Self, JwtError> {
        Ok(Self::default().with(
            algorithm,
            AlgorithmSigner::from_private_key(algorithm, private_key)?,
        ))
    }

    /// A signer holding one key per listed algorithm.
    pub fn from_keys<'a>(
        keys: impl IntoIterator<Item = (Algorithm, &'a [u8])>,
    ) -> Result<Self, JwtError> {
        keys.into_iter()
            .try_fold(Self::default(), |signer, (algorithm, private_key)| {
                Ok(signer.with(
                    algorithm,
                    AlgorithmSigner::from_private_key(algorithm, private_key)?,
                ))
            })
    }

    /// A signer delegating `algorithm` to `callback`.
    pub fn from_fn<F>(algorithm: Algorithm, callback: F) -> Self
    where
        F: Fn(&[u8]) -> Result<SignatureOutput, JwtError> + Send + Sync + 'static,
    {
        Self::default().with(algorithm, AlgorithmSigner::Callback(Arc::new(callback)))
    }

    /// Register `signer` for `algorithm`, replacing any previous one.
    pub fn with(mut self, algorithm: Algorithm, signer: AlgorithmSigner) -> Self {
        self.signers.insert(algorithm, signer);
        self
    }

    /// Algorithms this signer can produce.
    pub fn algorithms(&self) -> impl Iterator<Item = Algorithm> + '_ {
        self.signers.keys().copied()
    }

    /// Sign without going through the async capability.
    pub fn sign_now(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, JwtError> {
        let signer = self
            .signers
            .get(&algorithm)
            .ok_or_else(|| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;

        match (algorithm, signer.sign(data)?) {
            (Algorithm::Ed25519 | Algorithm::EdDsa, SignatureOutput::Ecdsa(_)) => {
                Err(JwtError::InvalidArgument(format!(
                    "{algorithm} expects a signer that returns an encoded signature"
                )))
            }
            (_, SignatureOutput::Encoded(encoded)) => Ok(encoded),
            (_, SignatureOutput::Ecdsa(value)) => value.to_compact(algorithm.is_recoverable()),
        }
    }
}

impl Signer for SoftwareSigner {
    async fn sign(&self, algorithm: Algorithm, payload: &[u8]) -> Result<String, JwtError> {
        self.sign_now(algorithm, payload)
    }
}
