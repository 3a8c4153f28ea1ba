//! ODF package writing functionality.
//!
//! This module provides the unencrypted package writer, the
//! [`OdfPackageWriter`] trait shared with the encrypting writer, and helpers
//! that emit the fixed set of document parts.

use super::archive::{ArchiveWriter, EntryMethod};
use super::manifest::Manifest;
use crate::common::{Error, Result};
use crate::odf::constants::{
    ODF_CONTENT, ODF_MANIFEST, ODF_META, ODF_MIMETYPE, ODF_SETTINGS, ODF_STYLES, OFFICE_VERSION,
    XML_MEDIA_TYPE, is_reserved_entry,
};
use std::collections::HashSet;
use tracing::debug;

/// Common surface of the plain and the encrypting package writers.
///
/// Code that assembles a document writes through this trait, so a
/// password-protected writer can be dropped in place of a plain one.
pub trait OdfPackageWriter {
    /// Add a file to the package
    fn add_file(&mut self, path: &str, media_type: &str, content: &[u8]) -> Result<()>;

    /// Write the manifest and finalize the archive
    fn close(&mut self) -> Result<()>;
}

/// Writer for unencrypted ODF packages
///
/// The `mimetype` entry is written first and stored, every other entry is
/// deflated, and the manifest is written on [`close`](OdfPackageWriter::close).
///
/// # Examples
///
/// ```
/// # use odpack::odf::{OdfPackageWriter, PackageWriter, ZipArchiveWriter};
/// # use odpack::Result;
/// # fn example() -> Result<()> {
/// let archive = ZipArchiveWriter::in_memory();
/// let mut writer = PackageWriter::new(archive, "application/vnd.oasis.opendocument.text")?;
/// writer.add_file("content.xml", "text/xml", b"<office:document-content/>")?;
/// writer.close()?;
///
/// let bytes = writer.into_inner().into_inner()?.into_inner();
/// assert_eq!(&bytes[..2], b"PK");
/// # Ok(())
/// # }
/// ```
pub struct PackageWriter<A: ArchiveWriter> {
    archive: A,
    manifest: Manifest,
    written: HashSet<String>,
    closed: bool,
}

impl<A: ArchiveWriter> PackageWriter<A> {
    /// Create a package writer and write the `mimetype` marker entry
    pub fn new(mut archive: A, mimetype: &str) -> Result<Self> {
        validate_mimetype(mimetype)?;
        archive.write_entry(ODF_MIMETYPE, mimetype.as_bytes(), EntryMethod::Stored)?;
        Ok(Self {
            archive,
            manifest: Manifest::new(mimetype),
            written: HashSet::new(),
            closed: false,
        })
    }

    /// The manifest accumulated so far
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Give back the archive collaborator
    pub fn into_inner(self) -> A {
        self.archive
    }
}

impl<A: ArchiveWriter> OdfPackageWriter for PackageWriter<A> {
    fn add_file(&mut self, path: &str, media_type: &str, content: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        check_entry_path(path, &self.written)?;

        self.archive.write_entry(path, content, EntryMethod::Deflated)?;
        self.written.insert(path.to_string());
        self.manifest.push_clear(path, media_type);
        debug!("wrote clear entry {path} ({} bytes)", content.len());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        self.closed = true;

        let manifest = self.manifest.to_xml();
        self.archive
            .write_entry(ODF_MANIFEST, manifest.as_bytes(), EntryMethod::Deflated)?;
        self.archive.finish()?;
        debug!("closed package with {} entries", self.manifest.entries.len());
        Ok(())
    }
}

pub(crate) fn validate_mimetype(mimetype: &str) -> Result<()> {
    if mimetype.trim().is_empty() {
        return Err(Error::InvalidConfiguration("MIME type not set".to_string()));
    }
    Ok(())
}

/// Reject reserved, empty and already written entry paths.
pub(crate) fn check_entry_path(path: &str, written: &HashSet<String>) -> Result<()> {
    if path.is_empty() || path.starts_with('/') {
        return Err(Error::InvalidFormat(format!("invalid entry path '{path}'")));
    }
    if is_reserved_entry(path) {
        return Err(Error::InvalidFormat(format!(
            "'{path}' is written by the package writer"
        )));
    }
    if written.contains(path) {
        return Err(Error::InvalidFormat(format!("duplicate entry '{path}'")));
    }
    Ok(())
}

/// The fixed XML parts of an ODF document
#[derive(Debug, Clone)]
pub struct DocumentParts {
    pub content: String,
    pub styles: String,
    pub meta: String,
    pub settings: String,
}

impl DocumentParts {
    /// Minimal parts for a document whose body element is `office_type`
    /// (e.g. `office:spreadsheet`, `office:text`)
    pub fn skeleton(office_type: &str) -> Self {
        Self {
            content: OdfStructure::default_content_xml(office_type),
            styles: OdfStructure::default_styles_xml(),
            meta: OdfStructure::default_meta_xml(),
            settings: OdfStructure::default_settings_xml(),
        }
    }
}

/// Write meta, styles, content and settings through any package writer.
pub fn write_document<P: OdfPackageWriter + ?Sized>(
    writer: &mut P,
    parts: &DocumentParts,
) -> Result<()> {
    writer.add_file(ODF_META, XML_MEDIA_TYPE, parts.meta.as_bytes())?;
    writer.add_file(ODF_STYLES, XML_MEDIA_TYPE, parts.styles.as_bytes())?;
    writer.add_file(ODF_CONTENT, XML_MEDIA_TYPE, parts.content.as_bytes())?;
    writer.add_file(ODF_SETTINGS, XML_MEDIA_TYPE, parts.settings.as_bytes())?;
    Ok(())
}

const OFFICE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";

/// Skeleton XML for the standard ODF parts
pub struct OdfStructure;

impl OdfStructure {
    /// Generate a content.xml skeleton with an empty body of `office_type`
    pub fn default_content_xml(office_type: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="{OFFICE_NS}"
                          xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0"
                          xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
                          office:version="{OFFICE_VERSION}">
  <office:automatic-styles/>
  <office:body>
    <{office_type}/>
  </office:body>
</office:document-content>
"#
        )
    }

    /// Generate a styles.xml skeleton
    pub fn default_styles_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles xmlns:office="{OFFICE_NS}"
                         xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
                         office:version="{OFFICE_VERSION}">
  <office:styles/>
  <office:automatic-styles/>
  <office:master-styles/>
</office:document-styles>
"#
        )
    }

    /// Generate a meta.xml skeleton
    pub fn default_meta_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="{OFFICE_NS}"
                       xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0"
                       office:version="{OFFICE_VERSION}">
  <office:meta>
    <meta:generator>odpack/{}</meta:generator>
  </office:meta>
</office:document-meta>
"#,
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Generate a settings.xml skeleton
    pub fn default_settings_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-settings xmlns:office="{OFFICE_NS}"
                           xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0"
                           office:version="{OFFICE_VERSION}">
  <office:settings/>
</office:document-settings>
"#
        )
    }
}
