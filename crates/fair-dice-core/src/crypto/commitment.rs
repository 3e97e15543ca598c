//! Commit-reveal over a secret integer.
//!
//! digest = HMAC-SHA3-256(key, decimal(value))

use super::entropy::{uniform_in_range, EntropySource};
use crate::error::DiceError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha3::Sha3_256;
use std::fmt;
use tracing::debug;

type HmacSha3 = Hmac<Sha3_256>;

/// 256-bit key for the keyed hash
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey(#[serde(with = "hex_bytes")] [u8; 32]);

impl SecretKey {
    /// Draw a fresh key from the entropy source
    pub fn generate(entropy: &mut dyn EntropySource) -> Result<Self, DiceError> {
        let mut bytes = [0u8; 32];
        entropy.fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn mac(&self, value: u64) -> HmacSha3 {
        let mut mac =
            <HmacSha3 as Mac>::new_from_slice(&self.0).expect("HMAC key size is always valid");
        mac.update(value.to_string().as_bytes());
        mac
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// Public digest binding a value before it is revealed
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "hex_bytes")] [u8; 32]);

impl Commitment {
    /// Compute the digest of `value` under `key`
    pub fn new(key: &SecretKey, value: u64) -> Self {
        Self(key.mac(value).finalize().into_bytes().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Constant-time check that `key` and `value` produce this digest
    pub fn verify(&self, key: &SecretKey, value: u64) -> bool {
        key.mac(value).verify_slice(&self.0).is_ok()
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// A secret drawn and committed to, not yet revealed.
///
/// Revealing consumes it, so one commitment yields exactly one reveal.
pub struct CommittedSecret {
    value: u64,
    key: SecretKey,
    digest: Commitment,
}

impl CommittedSecret {
    /// Draw a uniform secret in `[min, max]` with a fresh key and commit to it.
    pub fn commit(
        entropy: &mut dyn EntropySource,
        min: u64,
        max: u64,
    ) -> Result<Self, DiceError> {
        let value = uniform_in_range(entropy, min, max)?;
        let key = SecretKey::generate(entropy)?;
        let digest = Commitment::new(&key, value);

        debug!(%digest, min, max, "Committed to secret");

        Ok(Self { value, key, digest })
    }

    /// The public digest
    pub fn digest(&self) -> Commitment {
        self.digest
    }

    /// Disclose the value and key
    pub fn reveal(self) -> RevealedResult {
        debug!(digest = %self.digest, value = self.value, key = %self.key, "Revealed secret");
        RevealedResult {
            value: self.value,
            key: self.key,
        }
    }
}

impl fmt::Debug for CommittedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommittedSecret")
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// Value and key disclosed after the counterpart has chosen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedResult {
    pub value: u64,
    pub key: SecretKey,
}

impl RevealedResult {
    /// Recompute the digest from the disclosed parts
    pub fn digest(&self) -> Commitment {
        Commitment::new(&self.key, self.value)
    }

    /// Check against the digest published at commit time
    pub fn verify(&self, published: &Commitment) -> bool {
        published.verify(&self.key, self.value)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let hex_str = String::deserialize(d)?;
        let mut arr = [0u8; 32];
        hex::decode_to_slice(&hex_str, &mut arr).map_err(serde::de::Error::custom)?;
        Ok(arr)
    }
}
