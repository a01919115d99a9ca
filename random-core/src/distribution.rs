use crate::{error::SelectionError, threshold::ThresholdTable};

/// Allowed absolute deviation of a distribution's sum from 1.0.
///
/// Covers floating-point representation error only, not caller rounding.
pub const PROBABILITY_SUM_EPSILON: f64 = 1e-12;

/// Ordered, validated discrete probability distribution.
///
/// Element `i` is the probability that a draw selects index `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    probabilities: Vec<f64>,
}

impl Distribution {
    pub fn new(probabilities: Vec<f64>) -> Result<Self, SelectionError> {
        validate(&probabilities)?;
        Ok(Self { probabilities })
    }

    /// Parse a comma separated list such as `"0.3, 0.5, 0.2"`.
    ///
    /// Returns the offending token when an element is not a float.
    pub fn parse_list(raw: &str) -> Result<Vec<f64>, String> {
        raw.split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<f64>().map_err(|_| token.to_owned())
            })
            .collect()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Always false for a validated distribution; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn thresholds(&self) -> ThresholdTable {
        ThresholdTable::build(self)
    }
}

impl TryFrom<&[f64]> for Distribution {
    type Error = SelectionError;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        Self::new(value.to_vec())
    }
}

impl TryFrom<Vec<f64>> for Distribution {
    type Error = SelectionError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Check that `probabilities` forms a discrete distribution without taking
/// ownership of it.
pub fn validate(probabilities: &[f64]) -> Result<(), SelectionError> {
    if probabilities.is_empty() {
        return Err(SelectionError::EmptyDistribution);
    }
    let mut sum = 0.0;
    for (index, &value) in probabilities.iter().enumerate() {
        // NaN fails `contains`, so it is reported as out of range.
        if !(0.0..=1.0).contains(&value) {
            return Err(SelectionError::ProbabilityOutOfRange { index, value });
        }
        sum += value;
    }
    if (sum - 1.0).abs() > PROBABILITY_SUM_EPSILON {
        return Err(SelectionError::DistributionNotNormalized { sum });
    }
    Ok(())
}
