//! ODF manifest model.
//!
//! The manifest (META-INF/manifest.xml) lists every entry of the package with
//! its media type. Encrypted entries carry a `manifest:encryption-data`
//! descriptor holding everything a reader needs, besides the password, to
//! re-derive the key and decrypt: algorithm, IV, salt, iteration count, key
//! size and plaintext checksum.

use crate::common::xml::{XmlWriter, unescape_xml};
use crate::common::{Error, Result};
use crate::odf::constants::{MANIFEST_NS, ODF_MANIFEST, ODPACK_NS, OFFICE_VERSION};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::io::{Read, Seek};

/// ODF manifest (META-INF/manifest.xml)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Media type of the package root (`/`)
    pub mimetype: String,
    /// File entries in the order they were written
    pub entries: Vec<ManifestEntry>,
}

/// Entry in the ODF manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
    /// Uncompressed, unencrypted size; only written for encrypted entries
    pub size: Option<u64>,
    pub encryption: Option<EncryptionData>,
}

/// `manifest:encryption-data` descriptor of one encrypted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionData {
    /// Checksum type URI
    pub checksum_type: String,
    pub checksum: Vec<u8>,
    /// Cipher algorithm URI
    pub algorithm: String,
    pub initialisation_vector: Vec<u8>,
    /// Digest applied to the password before key derivation
    pub start_key_generation: String,
    pub start_key_size: usize,
    /// Key derivation name (`PBKDF2`)
    pub key_derivation: String,
    pub key_size: usize,
    pub iteration_count: u32,
    pub salt: Vec<u8>,
    /// Length of the compressed plaintext, before padding and encryption
    pub compressed_size: Option<u64>,
}

impl ManifestEntry {
    /// Whether the entry carries an encryption descriptor
    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }
}

impl Manifest {
    /// Create an empty manifest for a package of the given media type
    pub fn new(mimetype: impl Into<String>) -> Self {
        Self {
            mimetype: mimetype.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    /// Append an entry stored in the clear
    pub fn push_clear(&mut self, full_path: &str, media_type: &str) {
        self.push(ManifestEntry {
            full_path: full_path.to_string(),
            media_type: media_type.to_string(),
            size: None,
            encryption: None,
        });
    }

    /// Get entry for a path
    pub fn get_entry(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.full_path == path)
    }

    /// Check if a path exists in manifest
    pub fn has_path(&self, path: &str) -> bool {
        self.get_entry(path).is_some()
    }

    /// Entries that carry an encryption descriptor
    pub fn encrypted_entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|entry| entry.is_encrypted())
    }

    /// Render the manifest document
    pub fn to_xml(&self) -> String {
        let has_extension = self
            .encrypted_entries()
            .any(|entry| entry.encryption.as_ref().is_some_and(|e| e.compressed_size.is_some()));

        let mut xml = XmlWriter::new();
        xml.declaration();
        xml.start("manifest:manifest")
            .attr("xmlns:manifest", MANIFEST_NS);
        if has_extension {
            xml.attr("xmlns:odpack", ODPACK_NS);
        }
        xml.attr("manifest:version", OFFICE_VERSION);

        xml.start("manifest:file-entry")
            .attr("manifest:full-path", "/")
            .attr("manifest:version", OFFICE_VERSION)
            .attr("manifest:media-type", &self.mimetype)
            .end();

        for entry in &self.entries {
            xml.start("manifest:file-entry")
                .attr("manifest:full-path", &entry.full_path)
                .attr("manifest:media-type", &entry.media_type);
            if let Some(size) = entry.size {
                xml.attr("manifest:size", size.to_string());
            }
            if let Some(data) = &entry.encryption {
                write_encryption_data(&mut xml, data);
            }
            xml.end();
        }

        xml.finish()
    }

    /// Parse manifest from a ZIP archive
    pub fn from_archive<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Self> {
        let mut file = archive
            .by_name(ODF_MANIFEST)
            .map_err(|_| Error::InvalidFormat("No manifest.xml found in ODF package".to_string()))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Parse manifest XML content
    pub fn parse(xml_content: &str) -> Result<Self> {
        use quick_xml::Reader;
        use quick_xml::events::Event;

        let mut reader = Reader::from_str(xml_content);
        let mut buf = Vec::new();

        let mut mimetype = None;
        let mut entries: Vec<ManifestEntry> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let attrs = collect_attributes(e)?;
                    match e.name().as_ref() {
                        b"manifest:file-entry" => {
                            let full_path = attr(&attrs, "manifest:full-path")?;
                            let media_type = attr_or_default(&attrs, "manifest:media-type");
                            if full_path == "/" {
                                mimetype = Some(media_type);
                            } else {
                                let size = attrs
                                    .iter()
                                    .find(|(k, _)| k == "manifest:size")
                                    .map(|(_, v)| parse_number(v))
                                    .transpose()?;
                                entries.push(ManifestEntry {
                                    full_path,
                                    media_type,
                                    size,
                                    encryption: None,
                                });
                            }
                        },
                        b"manifest:encryption-data" => {
                            let entry = entries.last_mut().ok_or_else(|| {
                                Error::InvalidFormat("encryption-data outside file-entry".to_string())
                            })?;
                            entry.encryption = Some(EncryptionData {
                                checksum_type: attr(&attrs, "manifest:checksum-type")?,
                                checksum: decode_base64(&attr(&attrs, "manifest:checksum")?)?,
                                algorithm: String::new(),
                                initialisation_vector: Vec::new(),
                                start_key_generation: String::new(),
                                start_key_size: 0,
                                key_derivation: String::new(),
                                key_size: 0,
                                iteration_count: 0,
                                salt: Vec::new(),
                                compressed_size: attrs
                                    .iter()
                                    .find(|(k, _)| k == "odpack:compressed-size")
                                    .map(|(_, v)| parse_number(v))
                                    .transpose()?,
                            });
                        },
                        b"manifest:algorithm" => {
                            let data = current_encryption(&mut entries)?;
                            data.algorithm = attr(&attrs, "manifest:algorithm-name")?;
                            data.initialisation_vector =
                                decode_base64(&attr(&attrs, "manifest:initialisation-vector")?)?;
                        },
                        b"manifest:start-key-generation" => {
                            let data = current_encryption(&mut entries)?;
                            data.start_key_generation =
                                attr(&attrs, "manifest:start-key-generation-name")?;
                            data.start_key_size = parse_number(&attr(&attrs, "manifest:key-size")?)?;
                        },
                        b"manifest:key-derivation" => {
                            let data = current_encryption(&mut entries)?;
                            data.key_derivation = attr(&attrs, "manifest:key-derivation-name")?;
                            data.key_size = parse_number(&attr(&attrs, "manifest:key-size")?)?;
                            data.iteration_count =
                                parse_number(&attr(&attrs, "manifest:iteration-count")?)?;
                            data.salt = decode_base64(&attr(&attrs, "manifest:salt")?)?;
                        },
                        _ => {},
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("manifest parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        let mimetype = mimetype
            .ok_or_else(|| Error::InvalidFormat("manifest has no root entry".to_string()))?;
        Ok(Self { mimetype, entries })
    }
}

fn write_encryption_data(xml: &mut XmlWriter, data: &EncryptionData) {
    xml.start("manifest:encryption-data")
        .attr("manifest:checksum-type", &data.checksum_type)
        .attr("manifest:checksum", BASE64_STANDARD.encode(&data.checksum));
    if let Some(compressed) = data.compressed_size {
        xml.attr("odpack:compressed-size", compressed.to_string());
    }

    xml.start("manifest:algorithm")
        .attr("manifest:algorithm-name", &data.algorithm)
        .attr(
            "manifest:initialisation-vector",
            BASE64_STANDARD.encode(&data.initialisation_vector),
        )
        .end();
    xml.start("manifest:start-key-generation")
        .attr("manifest:start-key-generation-name", &data.start_key_generation)
        .attr("manifest:key-size", data.start_key_size.to_string())
        .end();
    xml.start("manifest:key-derivation")
        .attr("manifest:key-derivation-name", &data.key_derivation)
        .attr("manifest:key-size", data.key_size.to_string())
        .attr("manifest:iteration-count", data.iteration_count.to_string())
        .attr("manifest:salt", BASE64_STANDARD.encode(&data.salt))
        .end();
    xml.end();
}

fn collect_attributes(e: &quick_xml::events::BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result
            .map_err(|_| Error::InvalidFormat("Invalid attribute in manifest".to_string()))?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())
            .map_err(|_| Error::InvalidFormat("Invalid UTF-8 in manifest".to_string()))?;
        let value = String::from_utf8(attr.value.to_vec())
            .map_err(|_| Error::InvalidFormat("Invalid UTF-8 in manifest".to_string()))?;
        attrs.push((key, unescape_xml(&value)));
    }
    Ok(attrs)
}

fn attr(attrs: &[(String, String)], name: &str) -> Result<String> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
        .ok_or_else(|| Error::InvalidFormat(format!("missing attribute {}", name)))
}

fn attr_or_default(attrs: &[(String, String)], name: &str) -> String {
    attr(attrs, name).unwrap_or_default()
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFormat(format!("invalid number in manifest: {}", value)))
}

fn decode_base64(value: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(value.trim())
        .map_err(|e| Error::InvalidFormat(format!("invalid base64 in manifest: {}", e)))
}

fn current_encryption(entries: &mut [ManifestEntry]) -> Result<&mut EncryptionData> {
    entries
        .last_mut()
        .and_then(|entry| entry.encryption.as_mut())
        .ok_or_else(|| Error::InvalidFormat("encryption element outside encryption-data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::constants::{ALGORITHM_AES256_CBC, CHECKSUM_SHA256, ODF_SPREADSHEET};

    fn sample_encryption() -> EncryptionData {
        EncryptionData {
            checksum_type: CHECKSUM_SHA256.to_string(),
            checksum: vec![7; 32],
            algorithm: ALGORITHM_AES256_CBC.to_string(),
            initialisation_vector: (0..16).collect(),
            start_key_generation: "http://www.w3.org/2000/09/xmldsig#sha256".to_string(),
            start_key_size: 32,
            key_derivation: "PBKDF2".to_string(),
            key_size: 32,
            iteration_count: 100_000,
            salt: vec![9; 32],
            compressed_size: Some(61),
        }
    }

    #[test]
    fn test_render_clear_manifest() {
        let mut manifest = Manifest::new(ODF_SPREADSHEET);
        manifest.push_clear("styles.xml", "text/xml");
        let xml = manifest.to_xml();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"manifest:full-path="/""#));
        assert!(xml.contains(&format!(r#"manifest:media-type="{}""#, ODF_SPREADSHEET)));
        assert!(xml.contains(r#"manifest:full-path="styles.xml""#));
        assert!(!xml.contains("encryption-data"));
        assert!(!xml.contains("xmlns:odpack"));
    }

    #[test]
    fn test_render_encrypted_entry() {
        let mut manifest = Manifest::new(ODF_SPREADSHEET);
        manifest.push(ManifestEntry {
            full_path: "content.xml".to_string(),
            media_type: "text/xml".to_string(),
            size: Some(1234),
            encryption: Some(sample_encryption()),
        });
        let xml = manifest.to_xml();

        assert!(xml.contains(r#"manifest:size="1234""#));
        assert!(xml.contains(r#"manifest:iteration-count="100000""#));
        assert!(xml.contains(r#"manifest:key-derivation-name="PBKDF2""#));
        assert!(xml.contains(r#"odpack:compressed-size="61""#));
        assert!(xml.contains(&format!(
            r#"manifest:initialisation-vector="{}""#,
            BASE64_STANDARD.encode((0..16).collect::<Vec<u8>>())
        )));
    }

    #[test]
    fn test_parse_reads_back_rendered_manifest() {
        let mut manifest = Manifest::new(ODF_SPREADSHEET);
        manifest.push_clear("Pictures/a&b.png", "image/png");
        manifest.push(ManifestEntry {
            full_path: "content.xml".to_string(),
            media_type: "text/xml".to_string(),
            size: Some(18),
            encryption: Some(sample_encryption()),
        });

        let parsed = Manifest::parse(&manifest.to_xml()).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.encrypted_entries().count(), 1);
        assert!(parsed.has_path("Pictures/a&b.png"));
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = Manifest::new(ODF_SPREADSHEET);
        let parsed = Manifest::parse(&manifest.to_xml()).unwrap();
        assert_eq!(parsed.mimetype, ODF_SPREADSHEET);
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_root() {
        let xml = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0"/>"#;
        assert!(matches!(Manifest::parse(xml), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_rejects_bad_base64() {
        let xml = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
 <manifest:file-entry manifest:full-path="/" manifest:media-type="x"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml">
  <manifest:encryption-data manifest:checksum-type="t" manifest:checksum="!!!"/>
 </manifest:file-entry>
</manifest:manifest>"#;
        assert!(matches!(Manifest::parse(xml), Err(Error::InvalidFormat(_))));
    }
}
