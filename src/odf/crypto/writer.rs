//! Password-protected package writer.
//!
//! [`EncryptingPackageWriter`] stands in for the plain
//! [`PackageWriter`](crate::odf::PackageWriter): it hashes the password once
//! at open time, derives the archive key, and from then on deflates and
//! encrypts every entry it is asked to protect before handing the ciphertext
//! to the archive as a stored entry. The manifest, written in the clear at
//! close, describes how each entry was encrypted.

use super::framer::{EncryptedEntry, PlaintextSummary, encrypt_entry};
use super::kdf::{DerivedKey, derive_key};
use super::manifest::{EncryptionManifestBuilder, EntryEncryptionRecord};
use super::params::EncryptionParameters;
use super::password::{PasswordChecksum, hash_password_with};
use super::random::{OsRandom, SecureRandom};
use crate::common::{Error, Result};
use crate::odf::constants::{ODF_MANIFEST, ODF_MIMETYPE};
use crate::odf::core::{check_entry_path, validate_mimetype};
use crate::odf::{ArchiveWriter, EntryMethod, Manifest, OdfPackageWriter, deflate};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Draws allowed for an IV not yet used in the archive
const MAX_IV_ATTEMPTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Closed,
    /// An entry or the manifest failed to write; the output is unusable
    Aborted,
}

/// Writer for password-protected ODF packages
///
/// Entries are processed strictly one after another. Once any write fails
/// the writer refuses further work with [`Error::ArchiveAborted`] and never
/// writes a manifest, so a reader cannot be pointed at an entry that was not
/// written correctly.
///
/// # Examples
///
/// ```
/// use odpack::odf::ZipArchiveWriter;
/// use odpack::odf::crypto::{EncryptingWriterBuilder, EncryptionParameters};
/// # fn example() -> odpack::Result<()> {
/// let params = EncryptionParameters::builder().iteration_count(1_000).build()?;
/// let mut password = b"secret".to_vec();
/// let mut writer = EncryptingWriterBuilder::new("application/vnd.oasis.opendocument.text")
///     .parameters(params)
///     .open(ZipArchiveWriter::in_memory(), &mut password)?;
/// assert!(password.iter().all(|&b| b == 0));
///
/// writer.write_entry("content.xml", "text/xml", b"<office:document-content/>", true)?;
/// writer.close()?;
/// # Ok(())
/// # }
/// ```
pub struct EncryptingPackageWriter<A: ArchiveWriter, R: SecureRandom = OsRandom> {
    archive: A,
    rng: R,
    params: EncryptionParameters,
    checksum: PasswordChecksum,
    key: DerivedKey,
    salt: Vec<u8>,
    manifest: EncryptionManifestBuilder,
    ivs: HashSet<Vec<u8>>,
    written: HashSet<String>,
    state: WriterState,
}

/// Configures and opens an [`EncryptingPackageWriter`]
#[derive(Debug, Clone)]
pub struct EncryptingWriterBuilder<R: SecureRandom = OsRandom> {
    mimetype: String,
    params: EncryptionParameters,
    rng: R,
}

impl EncryptingWriterBuilder<OsRandom> {
    /// Default parameters and the operating system random source
    pub fn new(mimetype: impl Into<String>) -> Self {
        Self {
            mimetype: mimetype.into(),
            params: EncryptionParameters::default(),
            rng: OsRandom,
        }
    }
}

impl<R: SecureRandom> EncryptingWriterBuilder<R> {
    pub fn parameters(mut self, params: EncryptionParameters) -> Self {
        self.params = params;
        self
    }

    /// Replace the random source used for the salt, IVs and padding
    pub fn random<R2: SecureRandom>(self, rng: R2) -> EncryptingWriterBuilder<R2> {
        EncryptingWriterBuilder {
            mimetype: self.mimetype,
            params: self.params,
            rng,
        }
    }

    /// Hash `password`, derive the archive key and write the `mimetype` entry.
    ///
    /// `password` is zeroed before this returns, whether or not opening
    /// succeeds.
    pub fn open<A: ArchiveWriter>(
        self,
        archive: A,
        password: &mut [u8],
    ) -> Result<EncryptingPackageWriter<A, R>> {
        let checksum = hash_password_with(password, self.params.start_key_digest())?;
        self.open_with_checksum(archive, &checksum)
    }

    /// Open with an already hashed password.
    ///
    /// The archive still gets its own salt and therefore its own key.
    pub fn open_with_checksum<A: ArchiveWriter>(
        mut self,
        mut archive: A,
        checksum: &PasswordChecksum,
    ) -> Result<EncryptingPackageWriter<A, R>> {
        validate_mimetype(&self.mimetype)?;
        if checksum.algorithm() != self.params.start_key_digest() {
            return Err(Error::InvalidConfiguration(format!(
                "password was hashed with {:?} but the parameters name {:?}",
                checksum.algorithm(),
                self.params.start_key_digest()
            )));
        }

        let mut salt = vec![0u8; self.params.salt_size()];
        self.rng.fill(&mut salt)?;

        let key = derive_key(
            checksum,
            &salt,
            self.params.iteration_count(),
            self.params.key_size(),
        )?;
        if key.len() != self.params.key_size() {
            return Err(Error::InvalidConfiguration(format!(
                "derived key is {} bytes, cipher needs {}",
                key.len(),
                self.params.key_size()
            )));
        }

        archive.write_entry(ODF_MIMETYPE, self.mimetype.as_bytes(), EntryMethod::Stored)?;
        debug!(
            "opened encrypted package ({}, {} iterations, {}-byte key, {}-byte salt)",
            self.mimetype,
            self.params.iteration_count(),
            self.params.key_size(),
            salt.len()
        );

        let manifest = EncryptionManifestBuilder::new(&self.mimetype, self.params.clone(), salt.clone());
        Ok(EncryptingPackageWriter {
            archive,
            rng: self.rng,
            params: self.params,
            checksum: checksum.clone(),
            key,
            salt,
            manifest,
            ivs: HashSet::new(),
            written: HashSet::new(),
            state: WriterState::Open,
        })
    }
}

impl<A: ArchiveWriter> EncryptingPackageWriter<A, OsRandom> {
    /// Open with default parameters and the operating system random source
    pub fn open(archive: A, mimetype: &str, password: &mut [u8]) -> Result<Self> {
        EncryptingWriterBuilder::new(mimetype).open(archive, password)
    }

    /// Open a further archive protected by an already hashed password
    pub fn with_checksum(archive: A, mimetype: &str, checksum: &PasswordChecksum) -> Result<Self> {
        EncryptingWriterBuilder::new(mimetype).open_with_checksum(archive, checksum)
    }
}

impl<A: ArchiveWriter, R: SecureRandom> EncryptingPackageWriter<A, R> {
    /// Write one entry.
    ///
    /// With `encrypt` the bytes are deflated, encrypted and stored, and the
    /// manifest gets an encryption descriptor for them. Without it they are
    /// handed to the archive to deflate and listed in the manifest as is.
    ///
    /// # Errors
    ///
    /// - [`Error::WriterClosed`] after [`close`](Self::close)
    /// - [`Error::ArchiveAborted`] after an earlier failure
    /// - [`Error::InvalidFormat`] for reserved, empty or duplicate paths;
    ///   the writer stays usable
    /// - anything raised by compression, encryption or the archive, which
    ///   aborts the writer
    pub fn write_entry(
        &mut self,
        path: &str,
        media_type: &str,
        plaintext: &[u8],
        encrypt: bool,
    ) -> Result<()> {
        self.ensure_open()?;
        check_entry_path(path, &self.written)?;

        let result = if encrypt {
            self.write_encrypted(path, media_type, plaintext)
        } else {
            self.write_clear(path, media_type, plaintext)
        };

        match result {
            Ok(()) => {
                self.written.insert(path.to_string());
                Ok(())
            },
            Err(e) => {
                warn!("aborting package, failed to write {path}: {e}");
                self.state = WriterState::Aborted;
                Err(e)
            },
        }
    }

    /// Write the manifest and finalize the archive.
    ///
    /// Finalizes the archive exactly once; a second call fails with
    /// [`Error::WriterClosed`] and leaves the output untouched.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;

        let manifest = self.manifest.render();
        let result = self
            .archive
            .write_entry(ODF_MANIFEST, manifest.as_bytes(), EntryMethod::Deflated)
            .and_then(|()| self.archive.finish());

        match result {
            Ok(()) => {
                self.state = WriterState::Closed;
                debug!(
                    "closed encrypted package: {} entries, {} encrypted",
                    self.written.len(),
                    self.manifest.records().len()
                );
                Ok(())
            },
            Err(e) => {
                warn!("aborting package, failed to write manifest: {e}");
                self.state = WriterState::Aborted;
                Err(e)
            },
        }
    }

    pub fn parameters(&self) -> &EncryptionParameters {
        &self.params
    }

    /// Archive salt, as published in the manifest
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Password checksum, for opening further archives with
    /// [`open_with_checksum`](EncryptingWriterBuilder::open_with_checksum)
    pub fn password_checksum(&self) -> &PasswordChecksum {
        &self.checksum
    }

    /// The manifest accumulated so far
    pub fn manifest(&self) -> &Manifest {
        self.manifest.manifest()
    }

    pub fn records(&self) -> &[EntryEncryptionRecord] {
        self.manifest.records()
    }

    pub fn is_closed(&self) -> bool {
        self.state == WriterState::Closed
    }

    /// Give back the archive collaborator
    pub fn into_inner(self) -> A {
        self.archive
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Closed => Err(Error::WriterClosed),
            WriterState::Aborted => Err(Error::ArchiveAborted),
        }
    }

    fn write_encrypted(&mut self, path: &str, media_type: &str, plaintext: &[u8]) -> Result<()> {
        let summary = PlaintextSummary::of(plaintext);
        let compressed = deflate(plaintext)?;
        let encrypted = self.encrypt_with_fresh_iv(&compressed, &summary)?;

        self.archive
            .write_entry(path, &encrypted.ciphertext, EntryMethod::Stored)?;
        debug!(
            "wrote encrypted entry {path} ({} bytes plain, {} compressed, {} stored)",
            encrypted.plain_len,
            encrypted.compressed_len,
            encrypted.ciphertext.len()
        );

        self.manifest.record(EntryEncryptionRecord {
            path: path.to_string(),
            media_type: media_type.to_string(),
            algorithm: self.params.algorithm_uri().to_string(),
            iv: encrypted.iv,
            plain_len: encrypted.plain_len,
            checksum_type: self.params.checksum().uri().to_string(),
            checksum: encrypted.checksum,
            compressed_len: encrypted.compressed_len,
        })
    }

    fn write_clear(&mut self, path: &str, media_type: &str, data: &[u8]) -> Result<()> {
        self.archive.write_entry(path, data, EntryMethod::Deflated)?;
        self.manifest.add_clear(path, media_type);
        debug!("wrote clear entry {path} ({} bytes)", data.len());
        Ok(())
    }

    /// Encrypt, redrawing while the IV was already used in this archive.
    fn encrypt_with_fresh_iv(
        &mut self,
        compressed: &[u8],
        summary: &PlaintextSummary,
    ) -> Result<EncryptedEntry> {
        for _ in 0..MAX_IV_ATTEMPTS {
            let entry = encrypt_entry(compressed, summary, &self.params, &self.key, &mut self.rng)?;
            if self.ivs.insert(entry.iv.clone()) {
                return Ok(entry);
            }
            debug!("IV collision, drawing again");
        }
        Err(Error::RandomSource(format!(
            "no unused IV after {MAX_IV_ATTEMPTS} attempts"
        )))
    }
}

impl<A: ArchiveWriter, R: SecureRandom> OdfPackageWriter for EncryptingPackageWriter<A, R> {
    /// Encrypts every file added through the trait
    fn add_file(&mut self, path: &str, media_type: &str, content: &[u8]) -> Result<()> {
        self.write_entry(path, media_type, content, true)
    }

    fn close(&mut self) -> Result<()> {
        EncryptingPackageWriter::close(self)
    }
}
