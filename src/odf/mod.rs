//! OpenDocument package writing.
//!
//! Plain packages are written with [`PackageWriter`]; password-protected ones
//! with [`crypto::EncryptingPackageWriter`]. Both implement
//! [`OdfPackageWriter`], so document assembly code does not care which one
//! it is given.

/// ODF MIME types, part paths and manifest vocabulary
pub mod constants;
/// Core ODF package functionality
mod core;
/// Password-protected packages
#[cfg(feature = "odf_encryption")]
pub mod crypto;

pub use self::core::{
    ArchiveWriter, DocumentParts, EncryptionData, EntryMethod, Manifest, ManifestEntry,
    OdfPackageWriter, OdfStructure, PackageWriter, ZipArchiveWriter, deflate, write_document,
};

/// ODF format types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdfFormat {
    /// OpenDocument Text (.odt)
    Text,
    /// OpenDocument Spreadsheet (.ods)
    Spreadsheet,
    /// OpenDocument Presentation (.odp)
    Presentation,
    /// OpenDocument Drawing (.odg)
    Drawing,
    /// OpenDocument Chart (.odc)
    Chart,
    /// OpenDocument Formula (.odf)
    Formula,
}

impl OdfFormat {
    /// Package MIME type written to the `mimetype` entry
    pub fn mime_type(self) -> &'static str {
        match self {
            OdfFormat::Text => constants::ODF_TEXT,
            OdfFormat::Spreadsheet => constants::ODF_SPREADSHEET,
            OdfFormat::Presentation => constants::ODF_PRESENTATION,
            OdfFormat::Drawing => constants::ODF_DRAWING,
            OdfFormat::Chart => constants::ODF_CHART,
            OdfFormat::Formula => constants::ODF_FORMULA,
        }
    }

    /// Body element of content.xml for this format
    pub fn body_element(self) -> &'static str {
        match self {
            OdfFormat::Text => "office:text",
            OdfFormat::Spreadsheet => "office:spreadsheet",
            OdfFormat::Presentation => "office:presentation",
            OdfFormat::Drawing => "office:drawing",
            OdfFormat::Chart => "office:chart",
            OdfFormat::Formula => "office:formula",
        }
    }
}

/// Detect ODF format from MIME type
pub fn detect_format_from_mime(mime_type: &str) -> Option<OdfFormat> {
    [
        OdfFormat::Text,
        OdfFormat::Spreadsheet,
        OdfFormat::Presentation,
        OdfFormat::Drawing,
        OdfFormat::Chart,
        OdfFormat::Formula,
    ]
    .into_iter()
    .find(|format| format.mime_type() == mime_type)
}
