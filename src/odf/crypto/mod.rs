//! Password-protected ODF packages.
//!
//! The pieces, leaves first:
//!
//! - [`hash_password`] turns the password into a [`PasswordChecksum`] and
//!   wipes the caller's buffer.
//! - [`derive_key`] runs PBKDF2 over the checksum and the archive salt.
//! - [`encrypt_entry`] frames one entry's compressed bytes as AES-CBC with a
//!   fresh IV and ISO 10126 padding.
//! - [`EncryptionManifestBuilder`] records how each entry was encrypted and
//!   renders the manifest.
//! - [`EncryptingPackageWriter`] drives all of the above for a whole package.
//!
//! Nothing here decrypts; [`Manifest::parse`](crate::odf::Manifest::parse)
//! only reads the published parameters back.

mod framer;
mod kdf;
mod manifest;
mod params;
mod password;
mod random;
mod writer;

pub use framer::{EncryptedEntry, PlaintextSummary, encrypt_entry};
pub use kdf::{DerivedKey, derive_key};
pub use manifest::{EncryptionManifestBuilder, EntryEncryptionRecord};
pub use params::{
    AES_BLOCK_SIZE, CIPHER_TRANSFORMATION, ChecksumKind, DEFAULT_ITERATION_COUNT,
    DEFAULT_KEY_SIZE, DEFAULT_SALT_SIZE, EncryptionParameters, EncryptionParametersBuilder,
    MIN_SALT_SIZE,
};
pub use password::{DigestAlgorithm, PasswordChecksum, hash_password, hash_password_with};
pub use random::{OsRandom, SecureRandom};
pub use writer::{EncryptingPackageWriter, EncryptingWriterBuilder};
