//! Deterministic identifier generation
//!
//! Identifiers are drawn from an owned, explicitly seeded ChaCha8 stream.
//! ChaCha output is specified independently of the host, and characters are
//! sampled through `u32` ranges, so the same seed yields the same identifiers
//! on every platform.
//!
//! The generator is a resource the orchestrator owns and threads through the
//! run. Identifiers must be requested in a fixed order for a run to be
//! reproducible; see [`crate::core::bootstrap`] for that order.

use crate::domain::ids::{Uid, DEFAULT_UID_LENGTH};
use crate::domain::{Result, SeedError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Seeded identifier generator
///
/// Identifiers issued by one generator are unique: on the (improbable)
/// collision the candidate is discarded and another is drawn, which keeps the
/// sequence deterministic.
///
/// # Examples
///
/// ```
/// use hisseed::core::uid::UidGenerator;
///
/// let mut a = UidGenerator::new(42, 11).unwrap();
/// let mut b = UidGenerator::new(42, 11).unwrap();
/// assert_eq!(a.generate(5), b.generate(5));
/// ```
#[derive(Debug, Clone)]
pub struct UidGenerator {
    rng: ChaCha8Rng,
    length: usize,
    issued: HashSet<String>,
}

impl UidGenerator {
    /// Creates a generator for identifiers of `length` characters
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `length` is zero
    pub fn new(seed: u64, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(SeedError::Configuration(
                "identifier length must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            length,
            issued: HashSet::new(),
        })
    }

    /// Creates a generator producing identifiers of the default length
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            length: DEFAULT_UID_LENGTH,
            issued: HashSet::new(),
        }
    }

    /// Configured identifier length
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// Draws the next identifier from the stream
    pub fn next_uid(&mut self) -> Uid {
        if self.issued.len() as u128 >= self.space() {
            tracing::warn!(
                length = self.length,
                issued = self.issued.len(),
                "Identifier space exhausted, uniqueness no longer guaranteed"
            );
            return Uid::from_generated(self.draw());
        }

        loop {
            let candidate = self.draw();
            if self.issued.insert(candidate.clone()) {
                return Uid::from_generated(candidate);
            }
            tracing::debug!(uid = %candidate, "Discarding colliding identifier");
        }
    }

    /// Draws `count` identifiers
    pub fn generate(&mut self, count: usize) -> Vec<Uid> {
        (0..count).map(|_| self.next_uid()).collect()
    }

    fn space(&self) -> u128 {
        let rest = (ALPHANUMERIC.len() as u128).saturating_pow((self.length - 1) as u32);
        (LETTERS.len() as u128).saturating_mul(rest)
    }

    fn draw(&mut self) -> String {
        let mut id = String::with_capacity(self.length);
        id.push(self.pick(LETTERS));
        for _ in 1..self.length {
            id.push(self.pick(ALPHANUMERIC));
        }
        id
    }

    fn pick(&mut self, alphabet: &[u8]) -> char {
        let idx = self.rng.gen_range(0..alphabet.len() as u32) as usize;
        char::from(alphabet[idx])
    }
}

/// Generates `count` identifiers of the default length from a fresh stream
pub fn generate_uids(count: usize, seed: u64) -> Vec<Uid> {
    UidGenerator::with_seed(seed).generate(count)
}
