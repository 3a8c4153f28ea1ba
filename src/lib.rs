//! odpack - OpenDocument package writer with password protection
//!
//! This library assembles OpenDocument packages (`.ods`, `.odt`, `.odp`, ...):
//! ZIP containers holding the document's XML parts and a manifest. It can
//! write packages in the clear, or password-protect every part with
//! AES-CBC while publishing in the (clear) manifest everything a reader
//! needs to re-derive the key and decrypt.
//!
//! # Features
//!
//! - **Plain packages**: [`odf::PackageWriter`] writes `mimetype` first and
//!   stored, deflates the other parts and renders `META-INF/manifest.xml`.
//! - **Encrypted packages**: [`odf::crypto::EncryptingPackageWriter`] hashes
//!   the password, derives an AES key with PBKDF2 and encrypts each entry
//!   with a fresh IV and randomized (ISO 10126) padding.
//! - **Manifest model**: [`odf::Manifest`] renders and parses manifests,
//!   including `manifest:encryption-data` descriptors.
//!
//! # Example - Writing a protected spreadsheet
//!
//! ```no_run
//! use std::fs::File;
//! use odpack::odf::{DocumentParts, ZipArchiveWriter, write_document};
//! use odpack::odf::constants::ODF_SPREADSHEET;
//! use odpack::odf::crypto::EncryptingWriterBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = ZipArchiveWriter::new(File::create("protected.ods")?);
//! let mut password = b"secret".to_vec();
//! // The password buffer is zeroed as soon as it has been hashed
//! let mut writer = EncryptingWriterBuilder::new(ODF_SPREADSHEET)
//!     .open(archive, &mut password)?;
//!
//! write_document(&mut writer, &DocumentParts::skeleton("office:spreadsheet"))?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

/// Common error type and XML utilities
pub mod common;

/// OpenDocument package writing
///
/// Contains the plain archive collaborator, the manifest model and, with the
/// `odf_encryption` feature, the password-protected package writer.
#[cfg(feature = "odf")]
pub mod odf;

pub use common::{Error, Result};
