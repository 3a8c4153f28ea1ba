//! ODF constants: MIME types, package part paths and manifest vocabulary.
//!
//! # References
//!
//! - ODF 1.2 Part 3 (Packages), §3 (Manifest) and §4 (Encryption)

/// ODF specification version written into manifests
pub const OFFICE_VERSION: &str = "1.2";

// ============================================================================
// MIME TYPES
// ============================================================================

/// MIME type for OpenDocument Text (.odt)
pub const ODF_TEXT: &str = "application/vnd.oasis.opendocument.text";

/// MIME type for OpenDocument Spreadsheet (.ods)
pub const ODF_SPREADSHEET: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// MIME type for OpenDocument Presentation (.odp)
pub const ODF_PRESENTATION: &str = "application/vnd.oasis.opendocument.presentation";

/// MIME type for OpenDocument Drawing (.odg)
pub const ODF_DRAWING: &str = "application/vnd.oasis.opendocument.graphics";

/// MIME type for OpenDocument Chart (.odc)
pub const ODF_CHART: &str = "application/vnd.oasis.opendocument.chart";

/// MIME type for OpenDocument Formula (.odf)
pub const ODF_FORMULA: &str = "application/vnd.oasis.opendocument.formula";

/// Document MIME types paired with their file extension
pub const ODF_MIMETYPES: &[(&str, &str)] = &[
    (ODF_TEXT, "odt"),
    (ODF_SPREADSHEET, "ods"),
    (ODF_PRESENTATION, "odp"),
    (ODF_DRAWING, "odg"),
    (ODF_CHART, "odc"),
    (ODF_FORMULA, "odf"),
];

/// Media type of the XML parts
pub const XML_MEDIA_TYPE: &str = "text/xml";

// ============================================================================
// STANDARD ODF PARTS PATHS
// ============================================================================

/// Path of the mimetype marker entry (always first, stored, never encrypted)
pub const ODF_MIMETYPE: &str = "mimetype";

/// Path to content.xml (main document content)
pub const ODF_CONTENT: &str = "content.xml";

/// Path to meta.xml (document metadata)
pub const ODF_META: &str = "meta.xml";

/// Path to settings.xml (application settings)
pub const ODF_SETTINGS: &str = "settings.xml";

/// Path to styles.xml (document styles)
pub const ODF_STYLES: &str = "styles.xml";

/// Path to manifest.xml (package manifest, never encrypted)
pub const ODF_MANIFEST: &str = "META-INF/manifest.xml";

/// Entries written by the package writers themselves and always left in the clear
pub const RESERVED_ENTRIES: [&str; 2] = [ODF_MIMETYPE, ODF_MANIFEST];

// ============================================================================
// MANIFEST VOCABULARY
// ============================================================================

/// Manifest namespace URI
pub const MANIFEST_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0";

/// Namespace for odpack's own manifest extension attributes
pub const ODPACK_NS: &str = "urn:odpack:xmlns:manifest-ext:1.0";

/// AES-128 in CBC mode
pub const ALGORITHM_AES128_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes128-cbc";

/// AES-192 in CBC mode
pub const ALGORITHM_AES192_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes192-cbc";

/// AES-256 in CBC mode
pub const ALGORITHM_AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";

/// SHA-256 start key generation
pub const START_KEY_SHA256: &str = "http://www.w3.org/2000/09/xmldsig#sha256";

/// SHA-1 start key generation
pub const START_KEY_SHA1: &str = "SHA1";

/// PBKDF2 key derivation
pub const KEY_DERIVATION_PBKDF2: &str = "PBKDF2";

/// SHA-256 over the whole uncompressed plaintext
pub const CHECKSUM_SHA256: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0#sha256";

/// SHA-256 over the first 1024 bytes of the compressed plaintext (ODF 1.2)
pub const CHECKSUM_SHA256_1K: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0#sha256-1k";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Get the file extension for an ODF document MIME type
///
/// # Examples
///
/// ```
/// use odpack::odf::constants::get_extension_from_mime_type;
///
/// let ext = get_extension_from_mime_type("application/vnd.oasis.opendocument.spreadsheet");
/// assert_eq!(ext, Some("ods"));
/// ```
#[inline]
pub fn get_extension_from_mime_type(mime_type: &str) -> Option<&'static str> {
    ODF_MIMETYPES
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, ext)| *ext)
}

/// Check if a given MIME type is a known ODF document MIME type
#[inline]
pub fn is_odf_mime_type(mime_type: &str) -> bool {
    get_extension_from_mime_type(mime_type).is_some()
}

/// Check if a path is written by the package writer itself
#[inline]
pub fn is_reserved_entry(path: &str) -> bool {
    RESERVED_ENTRIES.contains(&path)
}
