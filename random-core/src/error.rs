use thiserror::Error;

/// Coarse classification used by collaborators to pick a response class.
///
/// `InvalidInput` is always a function of the caller's arguments; `Internal`
/// means the implementation (or the platform underneath it) misbehaved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Failures raised by the deterministic selection pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("seed is not valid hex: {reason}")]
    InvalidSeedEncoding { reason: String },
    #[error("seed must be {expected} hex characters, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },
    #[error("probabilities must not be empty")]
    EmptyDistribution,
    #[error("invalid probability {value} at index {index}; valid range 0 <= p <= 1")]
    ProbabilityOutOfRange { index: usize, value: f64 },
    #[error("sum of probabilities is {sum}; must be exactly 1.0")]
    DistributionNotNormalized { sum: f64 },
    #[error("no threshold matched draw {draw:#018x}")]
    SelectionInvariantViolated { draw: u64 },
}

impl SelectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelectionError::SelectionInvariantViolated { .. } => ErrorKind::Internal,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Failures raised by the CSPRNG-backed uniform helpers.
#[derive(Debug, Error)]
pub enum UniformError {
    #[error("min must be larger than or equal to 0")]
    NegativeMin,
    #[error("max must be larger than or equal to 0")]
    NegativeMax,
    #[error("min must be less than 2,147,483,647")]
    MinTooLarge,
    #[error("max must be less than 2,147,483,647")]
    MaxTooLarge,
    #[error("min must be less than max")]
    MinExceedsMax,
    #[error("failed to generate secure random number: {0}")]
    Entropy(#[from] rand::Error),
}

impl UniformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UniformError::Entropy(_) => ErrorKind::Internal,
            _ => ErrorKind::InvalidInput,
        }
    }
}
