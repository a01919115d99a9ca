//! Randomness primitives for the random service.
//!
//! Two families live here:
//!
//! * deterministic weighted selection: a `(seed, sequence, distribution)`
//!   triple always maps to the same index, on every machine, so historical
//!   draws can be replayed and audited;
//! * CSPRNG-backed uniform sampling helpers in [`uniform`].
//!
//! Every function is pure over its arguments (the uniform helpers aside, which
//! read the OS RNG) and safe to call concurrently.
//!
//! # Quickstart
//! ```
//! use random_core::{select_deterministic_index, SelectionError};
//!
//! let seed = "9912f3bcf715a55ae5c9d47f9f65625900000000000000000000000000000000";
//! let index = select_deterministic_index(seed, 0, &[0.2, 0.2, 0.2, 0.2, 0.2]).unwrap();
//! assert_eq!(index, 2);
//!
//! let err = select_deterministic_index(seed, 0, &[0.5, 0.4]).unwrap_err();
//! assert!(matches!(err, SelectionError::DistributionNotNormalized { .. }));
//! ```

pub mod distribution;
pub mod error;
pub mod seed;
pub mod selector;
pub mod threshold;
pub mod uniform;

pub use distribution::{Distribution, PROBABILITY_SUM_EPSILON};
pub use error::{ErrorKind, SelectionError, UniformError};
pub use seed::{Seed, SEED_BYTES, SEED_HEX_LEN};
pub use selector::{draw_value, select_deterministic_index, DeterministicSelector, HASH_VERSION};
pub use threshold::ThresholdTable;
