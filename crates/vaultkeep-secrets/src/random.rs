//! Cryptographically secure index source for secret generation.
//!
//! All randomness comes from the operating system CSPRNG. If it cannot be
//! read the call fails with [`VaultError::EntropyUnavailable`]; there is no
//! fallback to a seeded generator.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Result, VaultError};

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Return an index in `[0, bound)`. `bound` must be positive.
    fn next_index(&self, bound: usize) -> Result<usize>;
}

/// [`RandomSource`] backed by the operating system CSPRNG.
///
/// Stateless, so one instance can be shared across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_index(&self, bound: usize) -> Result<usize> {
        if bound == 0 {
            return Err(VaultError::InvalidPolicy(
                "index bound must be positive".to_string(),
            ));
        }
        let index = reduce_unbiased(bound as u64, next_u64)?;
        // index < bound, and bound came from a usize
        Ok(index as usize)
    }
}

/// Fill `buf` from the OS CSPRNG.
pub fn fill_bytes(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| VaultError::EntropyUnavailable(e.to_string()))
}

fn next_u64() -> Result<u64> {
    let mut buf = [0u8; 8];
    fill_bytes(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Map uniform 64-bit draws onto `[0, bound)` without modulo bias.
///
/// Draws below `2^64 mod bound` are rejected so the remaining range is an
/// exact multiple of `bound`.
fn reduce_unbiased(bound: u64, mut draw: impl FnMut() -> Result<u64>) -> Result<u64> {
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let value = draw()?;
        if value >= threshold {
            return Ok(value % bound);
        }
    }
}
