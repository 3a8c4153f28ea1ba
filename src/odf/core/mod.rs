//! Core ODF package functionality.
//!
//! Building blocks shared by the plain and the encrypting package writers:
//! the ZIP archive collaborator, raw DEFLATE compression, the manifest model
//! and the unencrypted [`PackageWriter`].
//!
//! # References
//! - ODF 1.2 Part 3: Packages
//! - ZIP format: PKZIP Application Note

/// Plain ZIP archive collaborator
pub(crate) mod archive;
/// Raw DEFLATE compression
pub(crate) mod compress;
/// ODF manifest model
mod manifest;
/// ODF package writing
mod writer;

pub use archive::{ArchiveWriter, EntryMethod, ZipArchiveWriter};
pub use compress::deflate;
pub use manifest::{EncryptionData, Manifest, ManifestEntry};
pub use writer::{DocumentParts, OdfPackageWriter, OdfStructure, PackageWriter, write_document};
pub(crate) use writer::{check_entry_path, validate_mimetype};
