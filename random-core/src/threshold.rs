use crate::{distribution::Distribution, error::SelectionError};

/// 2^64 as an `f64`; exact because it is a power of two.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Cumulative upper bounds partitioning the `u64` range into one bucket per
/// distribution element.
///
/// Entry `i` is `floor(cumulative(0..=i) * 2^64)`; the last entry is pinned to
/// `u64::MAX` so every draw lands in some bucket even when the cumulative sum
/// undershoots 1.0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdTable {
    thresholds: Vec<u64>,
}

impl ThresholdTable {
    pub fn build(distribution: &Distribution) -> Self {
        let probabilities = distribution.probabilities();
        let last = probabilities.len() - 1;
        let mut cumulative = 0.0_f64;
        let thresholds = probabilities
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                cumulative += p;
                if idx == last {
                    u64::MAX
                } else {
                    // `as` truncates toward zero and saturates at u64::MAX.
                    (cumulative * TWO_POW_64) as u64
                }
            })
            .collect();
        Self { thresholds }
    }

    /// First index whose threshold is strictly greater than `draw`.
    pub fn lookup(&self, draw: u64) -> Result<usize, SelectionError> {
        self.thresholds
            .iter()
            .position(|threshold| draw < *threshold)
            .ok_or(SelectionError::SelectionInvariantViolated { draw })
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}
