//! Cryptographic primitives for fair randomness.
//!
//! This module provides:
//! - EntropySource and unbiased range sampling
//! - CommittedSecret, Commitment and RevealedResult for commit-reveal
//! - combine for joining two parties' numbers into one fair value

mod combiner;
mod commitment;
mod entropy;

pub use combiner::combine;
pub use commitment::{Commitment, CommittedSecret, RevealedResult, SecretKey};
pub use entropy::{uniform_in_range, EntropySource, RngEntropy, ScriptedEntropy};
