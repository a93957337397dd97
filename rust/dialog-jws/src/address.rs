//! Blockchain account identifiers derived from secp256k1 keys.
//!
//! Account-style verification methods name an address rather than a key.
//! Matching one against a signature means recovering the signer's key,
//! deriving its addresses, and comparing them with the published
//! `ethereumAddress` or [CAIP-10] `blockchainAccountId`.
//!
//! | namespace | address |
//! | --- | --- |
//! | `eip155` | `0x` + last 20 bytes of keccak256 of the uncompressed key |
//! | `bip122` | base58check P2PKH of the compressed key |
//! | `cosmos` | bech32 of the compressed key's hash160 |
//!
//! [CAIP-10]: https://github.com/ChainAgnostic/CAIPs/blob/main/CAIPs/caip-10.md

use crate::error::JwtError;
use base58::{FromBase58, ToBase58};
use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};
use tiny_keccak::{Hasher, Keccak};

/// Length of a base58check P2PKH payload: version, hash160, checksum.
const P2PKH_LENGTH: usize = 25;

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// RIPEMD-160 of SHA-256 of `data`.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(Sha256::digest(data));
    let mut output = [0u8; 20];
    output.copy_from_slice(&digest);
    output
}

/// Lowercase `0x`-prefixed Ethereum address of a secp256k1 public key.
///
/// Accepts the 65-byte uncompressed SEC1 encoding, or the 64-byte
/// coordinates without the `0x04` tag.
pub fn ethereum_address(public_key: &[u8]) -> Result<String, JwtError> {
    let coordinates = match public_key {
        [0x04, rest @ ..] if rest.len() == 64 => rest,
        rest if rest.len() == 64 => rest,
        _ => {
            return Err(JwtError::UnsupportedKeyEncoding(format!(
                "an Ethereum address needs an uncompressed key, got {} bytes",
                public_key.len()
            )));
        }
    };
    let digest = keccak256(coordinates);
    Ok(format!("0x{}", hex::encode(&digest[12..])))
}

/// Base58check P2PKH address of a compressed secp256k1 key.
///
/// `version` is the network byte: `0x00` on Bitcoin mainnet, `0x6f` on
/// testnet.
pub fn bitcoin_address(compressed_key: &[u8], version: u8) -> String {
    let mut payload = Vec::with_capacity(P2PKH_LENGTH);
    payload.push(version);
    payload.extend_from_slice(&hash160(compressed_key));
    let checksum = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum[..4]);
    payload.to_base58()
}

/// Bech32 address of a compressed secp256k1 key under the human readable
/// part `prefix`, e.g. `cosmos`.
pub fn cosmos_address(compressed_key: &[u8], prefix: &str) -> Result<String, JwtError> {
    let hrp = Hrp::parse(prefix)
        .map_err(|e| JwtError::InvalidArgument(format!("invalid bech32 prefix {prefix}: {e}")))?;
    bech32::encode::<Bech32>(hrp, &hash160(compressed_key))
        .map_err(|e| JwtError::InvalidArgument(format!("cannot encode bech32 address: {e}")))
}

/// The addresses of one secp256k1 key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    ethereum: String,
    compressed: Vec<u8>,
    hash160: [u8; 20],
}

impl Addresses {
    /// Derive from the compressed (33 bytes) and uncompressed (65 bytes)
    /// SEC1 encodings of the same key.
    pub fn new(compressed: &[u8], uncompressed: &[u8]) -> Result<Self, JwtError> {
        if compressed.len() != 33 {
            return Err(JwtError::UnsupportedKeyEncoding(format!(
                "expected a 33 byte compressed key, got {} bytes",
                compressed.len()
            )));
        }
        Ok(Self {
            ethereum: ethereum_address(uncompressed)?,
            compressed: compressed.to_vec(),
            hash160: hash160(compressed),
        })
    }

    /// Lowercase `0x` Ethereum address.
    pub fn ethereum(&self) -> &str {
        &self.ethereum
    }

    /// Whether `address` is this key's Ethereum address, in any case.
    pub fn is_ethereum(&self, address: &str) -> bool {
        address.to_lowercase() == self.ethereum
    }

    /// Whether `blockchain_account_id` names this key.
    ///
    /// Accepts the legacy `0xabc...@eip155:1` form, a bare Ethereum
    /// address, and CAIP-10 ids in the `eip155`, `bip122` and `cosmos`
    /// namespaces. Other namespaces never match.
    pub fn matches(&self, blockchain_account_id: &str) -> bool {
        if let Some((legacy, _)) = blockchain_account_id.split_once("@eip155") {
            return self.is_ethereum(legacy);
        }

        let account = match blockchain_account_id.parse::<AccountId>() {
            Ok(account) => account,
            Err(_) => return self.is_ethereum(blockchain_account_id),
        };
        match account.namespace() {
            "eip155" => self.is_ethereum(account.address()),
            "bip122" => self.is_bitcoin(account.address()),
            "cosmos" => self.is_cosmos(account.address()),
            namespace => {
                tracing::trace!(namespace, "account namespace has no address derivation");
                false
            }
        }
    }

    /// P2PKH under the network byte `address` itself carries.
    fn is_bitcoin(&self, address: &str) -> bool {
        match address.from_base58() {
            Ok(decoded) if decoded.len() == P2PKH_LENGTH => {
                bitcoin_address(&self.compressed, decoded[0]) == address
            }
            _ => false,
        }
    }

    fn is_cosmos(&self, address: &str) -> bool {
        match bech32::decode(address) {
            Ok((_, data)) => data == self.hash160,
            Err(error) => {
                tracing::trace!(%error, "not a bech32 address");
                false
            }
        }
    }
}

/// A [CAIP-10] account id: `namespace:reference:address`.
///
/// [CAIP-10]: https://github.com/ChainAgnostic/CAIPs/blob/main/CAIPs/caip-10.md
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId {
    namespace: String,
    reference: String,
    address: String,
}

impl AccountId {
    /// Chain namespace, e.g. `eip155`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Chain reference within the namespace, e.g. `1` for Ethereum mainnet.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Account address on that chain.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.reference, self.address)
    }
}

impl FromStr for AccountId {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(reference), Some(address))
                if !namespace.is_empty() && !reference.is_empty() && !address.is_empty() =>
            {
                Ok(AccountId {
                    namespace: namespace.to_string(),
                    reference: reference.to_string(),
                    address: address.to_string(),
                })
            }
            _ => Err(JwtError::UnsupportedKeyEncoding(format!(
                "not a CAIP-10 account id: {s}"
            ))),
        }
    }
}
