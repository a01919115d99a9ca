//! Hash-derived index selection.
//!
//! A draw is the first eight bytes (big-endian) of
//! `SHA-256(seed || sequence.to_be_bytes())`. The digest, the concatenation
//! order and both byte orders are the replay contract named by
//! [`HASH_VERSION`]; changing any of them changes historical outcomes.
//!
//! # Example
//! ```
//! use random_core::{Distribution, DeterministicSelector, Seed};
//!
//! let seed = Seed::from_hex(&"9912f3bcf715a55ae5c9d47f9f656259".repeat(2)).unwrap();
//! let selector = DeterministicSelector::new(seed);
//! let dist = Distribution::new(vec![0.3, 0.5, 0.2]).unwrap();
//! let first = selector.select(42, &dist).unwrap();
//! assert_eq!(first, selector.select(42, &dist).unwrap());
//! assert!(first < dist.len());
//! ```

use sha2::{Digest, Sha256};

use crate::{
    distribution::Distribution, error::SelectionError, seed::Seed, threshold::ThresholdTable,
};

/// Identifier of the draw derivation implemented by [`draw_value`].
pub const HASH_VERSION: &str = "sha256-be64-v1";

/// Derive the 64-bit draw for `sequence` under `seed`.
pub fn draw_value(seed: &Seed, sequence: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(sequence.to_be_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Selector bound to a single validated seed.
///
/// Holds no mutable state, so one instance can be shared across threads.
#[derive(Clone, Debug)]
pub struct DeterministicSelector {
    seed: Seed,
}

impl DeterministicSelector {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn select(
        &self,
        sequence: u64,
        distribution: &Distribution,
    ) -> Result<usize, SelectionError> {
        self.select_with_table(sequence, &distribution.thresholds())
    }

    /// Select against a prebuilt table; useful when replaying many sequence
    /// numbers against one distribution.
    pub fn select_with_table(
        &self,
        sequence: u64,
        table: &ThresholdTable,
    ) -> Result<usize, SelectionError> {
        table.lookup(draw_value(&self.seed, sequence))
    }
}

/// Validate every input and return the selected index.
///
/// The seed is checked before the distribution.
pub fn select_deterministic_index(
    seed_hex: &str,
    sequence: u64,
    probabilities: &[f64],
) -> Result<usize, SelectionError> {
    let seed = Seed::from_hex(seed_hex)?;
    let distribution = Distribution::try_from(probabilities)?;
    DeterministicSelector::new(seed).select(sequence, &distribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded_seed() -> Seed {
        Seed::from_hex(&format!("9912f3bcf715a55ae5c9d47f9f656259{}", "0".repeat(32))).unwrap()
    }

    #[test]
    fn draw_reads_digest_prefix_big_endian() {
        // SHA-256(seed || 0u64) = 73acd956ceddc52e...
        assert_eq!(draw_value(&padded_seed(), 0), 0x73ac_d956_cedd_c52e);
    }

    #[test]
    fn sequence_changes_the_draw() {
        let seed = padded_seed();
        assert_ne!(draw_value(&seed, 0), draw_value(&seed, 1));
        assert_ne!(draw_value(&seed, 1), draw_value(&seed, 1 << 32));
    }

    #[test]
    fn prebuilt_table_matches_fresh_build() {
        let selector = DeterministicSelector::new(padded_seed());
        let dist = Distribution::new(vec![0.1, 0.6, 0.3]).unwrap();
        let table = dist.thresholds();
        for sequence in 0..256 {
            assert_eq!(
                selector.select(sequence, &dist).unwrap(),
                selector.select_with_table(sequence, &table).unwrap()
            );
        }
    }

    #[test]
    fn seed_errors_win_over_distribution_errors() {
        assert!(matches!(
            select_deterministic_index("abc", 0, &[]),
            Err(SelectionError::InvalidSeedLength { .. })
        ));
        let seed = "1".repeat(64);
        assert_eq!(
            select_deterministic_index(&seed, 0, &[]),
            Err(SelectionError::EmptyDistribution)
        );
    }
}
