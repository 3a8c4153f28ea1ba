//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from
//! third-party error types to the unified Error type.

#[cfg(feature = "odf")]
use super::types::Error;

#[cfg(feature = "odf")]
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(feature = "odf")]
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipError(other.to_string()),
        }
    }
}
