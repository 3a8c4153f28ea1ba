//! Encryption manifest builder.
//!
//! Collects one [`EntryEncryptionRecord`] per encrypted entry and turns the
//! lot, together with the archive-wide parameters and salt, into the
//! package's `META-INF/manifest.xml`.

use super::params::EncryptionParameters;
use crate::common::{Error, Result};
use crate::odf::constants::is_reserved_entry;
use crate::odf::{EncryptionData, Manifest, ManifestEntry};

/// What the manifest needs to know about one encrypted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryEncryptionRecord {
    pub path: String,
    pub media_type: String,
    /// Cipher algorithm URI
    pub algorithm: String,
    pub iv: Vec<u8>,
    /// Uncompressed plaintext length
    pub plain_len: u64,
    /// Checksum type URI
    pub checksum_type: String,
    pub checksum: Vec<u8>,
    /// Compressed plaintext length, before padding
    pub compressed_len: u64,
}

/// Accumulates manifest entries for one archive
#[derive(Debug, Clone)]
pub struct EncryptionManifestBuilder {
    params: EncryptionParameters,
    salt: Vec<u8>,
    records: Vec<EntryEncryptionRecord>,
    manifest: Manifest,
}

impl EncryptionManifestBuilder {
    pub fn new(mimetype: &str, params: EncryptionParameters, salt: Vec<u8>) -> Self {
        Self {
            params,
            salt,
            records: Vec::new(),
            manifest: Manifest::new(mimetype),
        }
    }

    /// Record an encrypted entry.
    ///
    /// The `mimetype` marker and the manifest itself always stay in the
    /// clear and are refused here.
    pub fn record(&mut self, record: EntryEncryptionRecord) -> Result<()> {
        if is_reserved_entry(&record.path) {
            return Err(Error::InvalidFormat(format!(
                "'{}' must not be encrypted",
                record.path
            )));
        }

        self.manifest.push(ManifestEntry {
            full_path: record.path.clone(),
            media_type: record.media_type.clone(),
            size: Some(record.plain_len),
            encryption: Some(self.encryption_data(&record)),
        });
        self.records.push(record);
        Ok(())
    }

    /// List an entry that was written in the clear
    pub fn add_clear(&mut self, path: &str, media_type: &str) {
        self.manifest.push_clear(path, media_type);
    }

    /// Encrypted entries, in write order
    pub fn records(&self) -> &[EntryEncryptionRecord] {
        &self.records
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Render `META-INF/manifest.xml`
    pub fn render(&self) -> String {
        self.manifest.to_xml()
    }

    fn encryption_data(&self, record: &EntryEncryptionRecord) -> EncryptionData {
        let digest = self.params.start_key_digest();
        EncryptionData {
            checksum_type: record.checksum_type.clone(),
            checksum: record.checksum.clone(),
            algorithm: record.algorithm.clone(),
            initialisation_vector: record.iv.clone(),
            start_key_generation: digest.start_key_uri().to_string(),
            start_key_size: digest.output_size(),
            key_derivation: self.params.key_derivation().to_string(),
            key_size: self.params.key_size(),
            iteration_count: self.params.iteration_count(),
            salt: self.salt.clone(),
            compressed_size: Some(record.compressed_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::constants::{
        ALGORITHM_AES256_CBC, CHECKSUM_SHA256, ODF_SPREADSHEET, START_KEY_SHA256,
    };

    fn record(path: &str) -> EntryEncryptionRecord {
        EntryEncryptionRecord {
            path: path.to_string(),
            media_type: "text/xml".to_string(),
            algorithm: ALGORITHM_AES256_CBC.to_string(),
            iv: vec![1; 16],
            plain_len: 18,
            checksum_type: CHECKSUM_SHA256.to_string(),
            checksum: vec![2; 32],
            compressed_len: 20,
        }
    }

    fn builder() -> EncryptionManifestBuilder {
        EncryptionManifestBuilder::new(ODF_SPREADSHEET, EncryptionParameters::default(), vec![5; 32])
    }

    #[test]
    fn test_record_fills_archive_parameters() {
        let mut builder = builder();
        builder.record(record("content.xml")).unwrap();

        let entry = builder.manifest().get_entry("content.xml").unwrap();
        assert_eq!(entry.size, Some(18));
        let data = entry.encryption.as_ref().unwrap();
        assert_eq!(data.salt, vec![5; 32]);
        assert_eq!(data.iteration_count, 100_000);
        assert_eq!(data.key_size, 32);
        assert_eq!(data.key_derivation, "PBKDF2");
        assert_eq!(data.start_key_generation, START_KEY_SHA256);
        assert_eq!(data.start_key_size, 32);
        assert_eq!(data.compressed_size, Some(20));
        assert_eq!(builder.records().len(), 1);
    }

    #[test]
    fn test_reserved_paths_refused() {
        let mut builder = builder();
        for path in ["mimetype", "META-INF/manifest.xml"] {
            assert!(matches!(
                builder.record(record(path)),
                Err(Error::InvalidFormat(_))
            ));
        }
        assert!(builder.records().is_empty());
        assert!(builder.manifest().entries.is_empty());
    }

    #[test]
    fn test_render_keeps_write_order_and_parses_back() {
        let mut builder = builder();
        builder.record(record("content.xml")).unwrap();
        builder.add_clear("Thumbnails/thumbnail.png", "image/png");
        builder.record(record("styles.xml")).unwrap();

        let parsed = Manifest::parse(&builder.render()).unwrap();
        let paths: Vec<_> = parsed.entries.iter().map(|e| e.full_path.as_str()).collect();
        assert_eq!(paths, ["content.xml", "Thumbnails/thumbnail.png", "styles.xml"]);
        assert_eq!(parsed.encrypted_entries().count(), 2);
        assert_eq!(&parsed, builder.manifest());
    }

    #[test]
    fn test_empty_manifest_renders() {
        let xml = builder().render();
        let parsed = Manifest::parse(&xml).unwrap();
        assert_eq!(parsed.mimetype, ODF_SPREADSHEET);
        assert!(parsed.entries.is_empty());
    }
}
