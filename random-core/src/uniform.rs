//! Non-deterministic sampling backed by the operating system CSPRNG.

use rand::{rngs::OsRng, RngCore};

use crate::error::UniformError;

/// Decimal places kept by [`uniform_float64`].
pub const FLOAT_PRECISION: u32 = 9;

/// Largest accepted bound for [`uniform_int64`].
pub const MAX_BOUND: i32 = i32::MAX - 1;

/// Uniform integer from the inclusive range `[min, max]`.
pub fn uniform_int64(min: i32, max: i32) -> Result<i64, UniformError> {
    uniform_int64_with(&mut OsRng, min, max)
}

/// [`uniform_int64`] over a caller-supplied generator.
pub fn uniform_int64_with<R: RngCore + ?Sized>(
    rng: &mut R,
    min: i32,
    max: i32,
) -> Result<i64, UniformError> {
    if min < 0 {
        return Err(UniformError::NegativeMin);
    }
    if max < 0 {
        return Err(UniformError::NegativeMax);
    }
    if min > MAX_BOUND {
        return Err(UniformError::MinTooLarge);
    }
    if max > MAX_BOUND {
        return Err(UniformError::MaxTooLarge);
    }
    if max < min {
        return Err(UniformError::MinExceedsMax);
    }
    if min == max {
        return Ok(i64::from(min));
    }

    let span = (max - min) as u64 + 1;
    Ok(below(rng, span)? as i64 + i64::from(min))
}

/// Uniform float in `[0, 1)`, truncated to [`FLOAT_PRECISION`] decimals.
pub fn uniform_float64() -> Result<f64, UniformError> {
    uniform_float64_with(&mut OsRng)
}

/// [`uniform_float64`] over a caller-supplied generator.
pub fn uniform_float64_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<f64, UniformError> {
    let raw = next_u64_le(rng)?;
    let unit = raw as f64 / 18_446_744_073_709_551_616.0;
    // Values within 2^-53 of one round up to 1.0 in the division above.
    let unit = if unit >= 1.0 { 0.0 } else { unit };
    Ok(truncate(unit, FLOAT_PRECISION))
}

/// Drop decimals past `precision`: `truncate(1.2345678, 5) == 1.23456`.
pub fn truncate(value: f64, precision: u32) -> f64 {
    let multiplier = 10f64.powi(precision as i32);
    (value * multiplier).floor() / multiplier
}

/// Round half away from zero at `precision` decimals.
pub fn round(value: f64, precision: u32) -> f64 {
    let multiplier = 10f64.powi(precision as i32);
    (value * multiplier).round() / multiplier
}

fn next_u64_le<R: RngCore + ?Sized>(rng: &mut R) -> Result<u64, UniformError> {
    let mut buf = [0u8; 8];
    rng.try_fill_bytes(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Unbiased value in `[0, span)` via rejection of the short final stripe.
fn below<R: RngCore + ?Sized>(rng: &mut R, span: u64) -> Result<u64, UniformError> {
    let reject_from = u64::MAX - u64::MAX % span;
    loop {
        let candidate = next_u64_le(rng)?;
        if candidate < reject_from {
            return Ok(candidate % span);
        }
    }
}
