use std::{fmt, str::FromStr};

use hex::FromHex;
use sha2::{Digest, Sha256};

use crate::error::SelectionError;

/// Decoded width of a seed in bytes.
pub const SEED_BYTES: usize = 32;
/// Hex-encoded width of a seed in characters.
pub const SEED_HEX_LEN: usize = SEED_BYTES * 2;

/// 256-bit secret that keys every deterministic draw.
///
/// The all-zero value is reserved as a "no seed configured" sentinel. Parsing
/// accepts it (the selection math is well defined for it); services refuse to
/// start with it, see [`Seed::is_unset`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; SEED_BYTES]);

impl Seed {
    /// Parse a 64-character hex string (either case).
    pub fn from_hex(seed_hex: &str) -> Result<Self, SelectionError> {
        if seed_hex.len() != SEED_HEX_LEN {
            return Err(SelectionError::InvalidSeedLength {
                expected: SEED_HEX_LEN,
                actual: seed_hex.len(),
            });
        }
        let bytes = <[u8; SEED_BYTES]>::from_hex(seed_hex).map_err(|err| {
            SelectionError::InvalidSeedEncoding {
                reason: err.to_string(),
            }
        })?;
        Ok(Self(bytes))
    }

    pub const fn from_bytes(bytes: [u8; SEED_BYTES]) -> Self {
        Self(bytes)
    }

    /// The reserved sentinel used when no seed was configured.
    pub const fn unset() -> Self {
        Self([0u8; SEED_BYTES])
    }

    pub fn is_unset(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_BYTES] {
        &self.0
    }

    /// Short, non-reversible identifier that is safe to log or persist.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        hex::encode(&digest[..4])
    }
}

impl From<[u8; SEED_BYTES]> for Seed {
    fn from(bytes: [u8; SEED_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Seed {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(fingerprint={})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_HEX: &str = "9912f3bcf715a55ae5c9d47f9f6562599912f3bcf715a55ae5c9d47f9f656259";

    #[test]
    fn parses_lower_and_upper_case() {
        let lower = Seed::from_hex(SEED_HEX).unwrap();
        let upper = Seed::from_hex(&SEED_HEX.to_ascii_uppercase()).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_bytes()[0], 0x99);
        assert_eq!(lower.as_bytes()[31], 0x59);
    }

    #[test]
    fn length_is_checked_before_encoding() {
        let short = &SEED_HEX[..63];
        assert_eq!(
            Seed::from_hex(short),
            Err(SelectionError::InvalidSeedLength {
                expected: 64,
                actual: 63
            })
        );
        let long = format!("{SEED_HEX}0");
        assert!(matches!(
            Seed::from_hex(&long),
            Err(SelectionError::InvalidSeedLength { actual: 65, .. })
        ));
    }

    #[test]
    fn rejects_non_hex_digits() {
        let bad = format!("g{}", &SEED_HEX[1..]);
        assert!(matches!(
            Seed::from_hex(&bad),
            Err(SelectionError::InvalidSeedEncoding { .. })
        ));
    }

    #[test]
    fn multibyte_characters_are_an_encoding_error() {
        // 62 ASCII digits plus a two-byte character is 64 bytes long.
        let bad = format!("{}é", &SEED_HEX[..62]);
        assert_eq!(bad.len(), 64);
        assert!(matches!(
            Seed::from_hex(&bad),
            Err(SelectionError::InvalidSeedEncoding { .. })
        ));
    }

    #[test]
    fn sentinel_parses_but_reports_unset() {
        let zero = Seed::from_hex(&"0".repeat(64)).unwrap();
        assert!(zero.is_unset());
        assert_eq!(zero, Seed::unset());
        assert!(!Seed::from_hex(SEED_HEX).unwrap().is_unset());
    }

    #[test]
    fn debug_output_never_contains_seed_material() {
        let seed = Seed::from_hex(SEED_HEX).unwrap();
        let rendered = format!("{seed:?}");
        assert!(!rendered.contains("9912f3bc"));
        assert!(rendered.contains(&seed.fingerprint()));
        assert_eq!(seed.fingerprint().len(), 8);
    }
}
