//! Random secret generation from character-class pools.
//!
//! Every position is an independent uniform draw from the union of the
//! enabled classes. There is no per-class quota: a 4-character secret with
//! all classes enabled may well contain no digit.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use vaultkeep_core::config::{GeneratorConfig, MAX_SECRET_LENGTH};
use vaultkeep_core::SecretString;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};
use crate::random::{OsRandom, RandomSource};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Which character classes to draw from, and how many characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    pub length: usize,
    pub use_upper: bool,
    pub use_lower: bool,
    pub use_digits: bool,
    pub use_symbols: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            use_upper: true,
            use_lower: true,
            use_digits: true,
            use_symbols: true,
        }
    }
}

impl From<&GeneratorConfig> for GenerationPolicy {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            use_upper: config.use_upper,
            use_lower: config.use_lower,
            use_digits: config.use_digits,
            use_symbols: config.use_symbols,
        }
    }
}

impl GenerationPolicy {
    /// A policy with the given length and every class enabled.
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Deduplicated union of the enabled classes, in a fixed order.
    pub fn pool(&self) -> Vec<char> {
        let classes = [
            (self.use_upper, UPPERCASE),
            (self.use_lower, LOWERCASE),
            (self.use_digits, DIGITS),
            (self.use_symbols, SYMBOLS),
        ];

        let mut pool: Vec<char> = Vec::new();
        for c in classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, chars)| chars.chars())
        {
            if !pool.contains(&c) {
                pool.push(c);
            }
        }
        pool
    }

    /// Reject policies that cannot produce a secret.
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(VaultError::InvalidPolicy(
                "length must be greater than 0".to_string(),
            ));
        }
        if self.length > MAX_SECRET_LENGTH {
            return Err(VaultError::InvalidPolicy(format!(
                "length {} exceeds maximum of {MAX_SECRET_LENGTH}",
                self.length
            )));
        }
        if !(self.use_upper || self.use_lower || self.use_digits || self.use_symbols) {
            return Err(VaultError::InvalidPolicy(
                "at least one character class must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds secrets by drawing from a [`RandomSource`].
#[derive(Clone)]
pub struct SecretGenerator {
    random: Arc<dyn RandomSource>,
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom))
    }
}

impl SecretGenerator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Generate a secret of exactly `policy.length` characters.
    ///
    /// The policy is validated before any randomness is drawn.
    pub fn generate(&self, policy: &GenerationPolicy) -> Result<SecretString> {
        policy.validate()?;
        let pool = policy.pool();

        let mut secret = Zeroizing::new(String::with_capacity(policy.length));
        for _ in 0..policy.length {
            let index = self.random.next_index(pool.len())?;
            secret.push(pool[index]);
        }

        debug!(length = policy.length, pool_size = pool.len(), "generated secret");
        Ok(SecretString::new(std::mem::take(&mut *secret)))
    }
}
