//! Sources of secure randomness and unbiased range sampling.

use crate::error::DiceError;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::collections::VecDeque;

/// Source of cryptographically secure random bytes.
///
/// Implementations must fail instead of degrading to a weaker source.
pub trait EntropySource: Send {
    /// Fill `dest` with random bytes
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), DiceError>;

    /// Draw a random 64-bit word
    fn next_u64(&mut self) -> Result<u64, DiceError> {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }
}

/// Entropy backed by any cryptographically secure RNG.
pub struct RngEntropy<R>(R);

impl<R: RngCore + CryptoRng + Send> RngEntropy<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngEntropy<OsRng> {
    /// Entropy straight from the operating system
    pub fn os() -> Self {
        Self(OsRng)
    }
}

impl<R: RngCore + CryptoRng + Send> EntropySource for RngEntropy<R> {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), DiceError> {
        self.0
            .try_fill_bytes(dest)
            .map_err(|e| DiceError::RandomnessUnavailable(e.to_string()))
    }
}

/// Deterministic entropy for tests: replays scripted words, then fails.
///
/// Byte requests (secret keys) are served from a counter so keys stay
/// distinct without consuming scripted words.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
    words: VecDeque<u64>,
    key_counter: u8,
}

impl ScriptedEntropy {
    pub fn new(words: impl IntoIterator<Item = u64>) -> Self {
        Self {
            words: words.into_iter().collect(),
            key_counter: 0,
        }
    }

    /// Words not yet consumed
    pub fn remaining(&self) -> usize {
        self.words.len()
    }
}

impl EntropySource for ScriptedEntropy {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), DiceError> {
        self.key_counter = self.key_counter.wrapping_add(1);
        for (i, byte) in dest.iter_mut().enumerate() {
            *byte = self.key_counter.wrapping_add(i as u8);
        }
        Ok(())
    }

    fn next_u64(&mut self) -> Result<u64, DiceError> {
        self.words
            .pop_front()
            .ok_or_else(|| DiceError::RandomnessUnavailable("scripted entropy exhausted".into()))
    }
}

/// Draw a uniform integer in `[min, max]` inclusive.
///
/// Raw words at or above the largest multiple of the span are rejected and
/// redrawn, so every value in the range is exactly equally likely.
pub fn uniform_in_range(
    entropy: &mut dyn EntropySource,
    min: u64,
    max: u64,
) -> Result<u64, DiceError> {
    if min > max {
        return Err(DiceError::ProtocolSequence(format!(
            "empty range [{}, {}]",
            min, max
        )));
    }

    // Span of the full u64 domain wraps to zero; every word is then valid.
    let span = (max - min).wrapping_add(1);
    if span == 0 {
        return entropy.next_u64();
    }

    let zone = u64::MAX - (u64::MAX % span + 1) % span;
    loop {
        let word = entropy.next_u64()?;
        if word <= zone {
            return Ok(min + word % span);
        }
    }
}
