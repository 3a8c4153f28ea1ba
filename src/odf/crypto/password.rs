//! Password hashing ("start key generation").
//!
//! The user's password is reduced to a fixed-size checksum as soon as it is
//! received; the caller's buffer is wiped before [`hash_password`] returns,
//! whatever the outcome.

use crate::common::{Error, Result};
use crate::odf::constants::{START_KEY_SHA1, START_KEY_SHA256};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Digest used to turn the password into a [`PasswordChecksum`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    Sha1,
    #[default]
    Sha256,
}

impl DigestAlgorithm {
    /// Digest output size in bytes
    pub fn output_size(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
        }
    }

    /// Start key generation name written to the manifest
    pub fn start_key_uri(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => START_KEY_SHA1,
            DigestAlgorithm::Sha256 => START_KEY_SHA256,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA-256" | "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA-1" | "SHA1" => Ok(DigestAlgorithm::Sha1),
            _ => Err(Error::UnsupportedDigest(name.to_string())),
        }
    }
}

/// Fixed-size digest of the user's password.
///
/// Held for the writer's lifetime in place of the password itself; wiped on
/// drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PasswordChecksum {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    algorithm: DigestAlgorithm,
}

impl PasswordChecksum {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PasswordChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChecksum")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// Hash `secret` (UTF-8 password bytes) with the digest called `algorithm`.
///
/// **Every byte of `secret` is overwritten with zero before this returns**,
/// on success and on failure alike.
///
/// # Errors
///
/// - [`Error::UnsupportedDigest`] if `algorithm` is not `SHA-256` or `SHA-1`
/// - [`Error::EmptyPassword`] if `secret` is empty
///
/// # Examples
///
/// ```
/// use odpack::odf::crypto::hash_password;
///
/// let mut password = b"secret".to_vec();
/// let checksum = hash_password(&mut password, "SHA-256").unwrap();
/// assert_eq!(checksum.len(), 32);
/// assert!(password.iter().all(|&b| b == 0));
/// ```
pub fn hash_password(secret: &mut [u8], algorithm: &str) -> Result<PasswordChecksum> {
    match algorithm.parse::<DigestAlgorithm>() {
        Ok(algorithm) => hash_password_with(secret, algorithm),
        Err(e) => {
            secret.zeroize();
            Err(e)
        },
    }
}

/// Hash `secret` with an already resolved digest. Wipes `secret` like
/// [`hash_password`].
pub fn hash_password_with(secret: &mut [u8], algorithm: DigestAlgorithm) -> Result<PasswordChecksum> {
    let result = if secret.is_empty() {
        Err(Error::EmptyPassword)
    } else {
        Ok(PasswordChecksum {
            bytes: algorithm.digest(secret),
            algorithm,
        })
    };
    secret.zeroize();
    result
}
