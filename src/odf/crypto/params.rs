//! Encryption configuration shared by every entry of one archive.

use super::password::DigestAlgorithm;
use crate::common::{Error, Result};
use crate::odf::constants::{
    ALGORITHM_AES128_CBC, ALGORITHM_AES192_CBC, ALGORITHM_AES256_CBC, CHECKSUM_SHA256,
    CHECKSUM_SHA256_1K, KEY_DERIVATION_PBKDF2,
};

/// AES block size, which is also the IV size
pub const AES_BLOCK_SIZE: usize = 16;

/// Cipher transformation applied to every encrypted entry
pub const CIPHER_TRANSFORMATION: &str = "AES/CBC/ISO10126Padding";

pub const DEFAULT_ITERATION_COUNT: u32 = 100_000;
pub const DEFAULT_KEY_SIZE: usize = 32;
pub const DEFAULT_SALT_SIZE: usize = 32;
pub const MIN_SALT_SIZE: usize = 8;

/// Number of leading compressed bytes covered by [`ChecksumKind::Sha256OneK`]
pub const ONE_K: usize = 1024;

/// What the per-entry checksum in the manifest covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    /// SHA-256 over the whole uncompressed plaintext
    #[default]
    Sha256,
    /// SHA-256 over the first 1024 bytes of the compressed plaintext, as
    /// ODF 1.2 consumers such as LibreOffice expect
    Sha256OneK,
}

impl ChecksumKind {
    /// Checksum type URI written to the manifest
    pub fn uri(self) -> &'static str {
        match self {
            ChecksumKind::Sha256 => CHECKSUM_SHA256,
            ChecksumKind::Sha256OneK => CHECKSUM_SHA256_1K,
        }
    }
}

/// Immutable encryption configuration.
///
/// Built once, validated eagerly, then shared read-only by every entry of an
/// archive. `Default` is AES-256-CBC with ISO 10126 padding, a SHA-256 start
/// key, PBKDF2 with 100 000 iterations and a 32-byte salt.
///
/// # Examples
///
/// ```
/// use odpack::odf::crypto::EncryptionParameters;
///
/// let params = EncryptionParameters::builder()
///     .key_size(16)
///     .iteration_count(1_000)
///     .build()
///     .unwrap();
/// assert_eq!(params.algorithm_uri(), "http://www.w3.org/2001/04/xmlenc#aes128-cbc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionParameters {
    start_key_digest: DigestAlgorithm,
    iteration_count: u32,
    key_size: usize,
    salt_size: usize,
    checksum: ChecksumKind,
}

impl Default for EncryptionParameters {
    fn default() -> Self {
        Self {
            start_key_digest: DigestAlgorithm::Sha256,
            iteration_count: DEFAULT_ITERATION_COUNT,
            key_size: DEFAULT_KEY_SIZE,
            salt_size: DEFAULT_SALT_SIZE,
            checksum: ChecksumKind::Sha256,
        }
    }
}

impl EncryptionParameters {
    pub fn builder() -> EncryptionParametersBuilder {
        EncryptionParametersBuilder::default()
    }

    pub fn start_key_digest(&self) -> DigestAlgorithm {
        self.start_key_digest
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Derived key size in bytes
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn salt_size(&self) -> usize {
        self.salt_size
    }

    pub fn checksum(&self) -> ChecksumKind {
        self.checksum
    }

    pub fn iv_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    pub fn key_derivation(&self) -> &'static str {
        KEY_DERIVATION_PBKDF2
    }

    /// Algorithm URI of the AES-CBC variant selected by the key size
    pub fn algorithm_uri(&self) -> &'static str {
        match self.key_size {
            16 => ALGORITHM_AES128_CBC,
            24 => ALGORITHM_AES192_CBC,
            _ => ALGORITHM_AES256_CBC,
        }
    }
}

/// Builder for [`EncryptionParameters`]
#[derive(Debug, Clone, Default)]
pub struct EncryptionParametersBuilder {
    inner: EncryptionParameters,
}

impl EncryptionParametersBuilder {
    pub fn start_key_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.inner.start_key_digest = digest;
        self
    }

    pub fn iteration_count(mut self, iterations: u32) -> Self {
        self.inner.iteration_count = iterations;
        self
    }

    pub fn key_size(mut self, bytes: usize) -> Self {
        self.inner.key_size = bytes;
        self
    }

    pub fn salt_size(mut self, bytes: usize) -> Self {
        self.inner.salt_size = bytes;
        self
    }

    pub fn checksum(mut self, kind: ChecksumKind) -> Self {
        self.inner.checksum = kind;
        self
    }

    /// Validate every field and freeze the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if the key size is not 16, 24 or 32
    /// bytes, the iteration count is zero, or the salt is shorter than
    /// 8 bytes.
    pub fn build(self) -> Result<EncryptionParameters> {
        let params = self.inner;
        if !matches!(params.key_size, 16 | 24 | 32) {
            return Err(Error::InvalidConfiguration(format!(
                "unsupported AES key size: {} bytes",
                params.key_size
            )));
        }
        if params.iteration_count == 0 {
            return Err(Error::InvalidConfiguration(
                "iteration count must be at least 1".to_string(),
            ));
        }
        if params.salt_size < MIN_SALT_SIZE {
            return Err(Error::InvalidConfiguration(format!(
                "salt must be at least {MIN_SALT_SIZE} bytes, got {}",
                params.salt_size
            )));
        }
        Ok(params)
    }
}
