//! Secure randomness for salts, IVs and padding.
//!
//! The random source is handed to the writer explicitly instead of being
//! reached through global state, so tests can substitute deterministic fakes.

use crate::common::{Error, Result};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// A cryptographically secure byte generator.
///
/// Implementations must be suitable for key material: salts, IVs and padding
/// bytes all come from here.
pub trait SecureRandom {
    /// Fill `dest` entirely with random bytes.
    fn fill(&mut self, dest: &mut [u8]) -> Result<()>;
}

impl<R: SecureRandom + ?Sized> SecureRandom for &mut R {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).fill(dest)
    }
}

/// The operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        let mut rng = OsRng;
        rng.try_fill_bytes(dest)
            .map_err(|e| Error::RandomSource(format!("failed to read OS randomness: {e}")))
    }
}
