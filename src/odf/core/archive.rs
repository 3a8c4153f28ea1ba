//! Plain ZIP archive collaborator.
//!
//! The package writers never build ZIP structures themselves: they hand
//! finished entry payloads to an [`ArchiveWriter`], which owns local headers,
//! CRCs and the central directory.

use crate::common::{Error, Result};
use std::io::{Seek, Write};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// How an entry's bytes are laid down in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMethod {
    /// Bytes are stored as given (mimetype marker, encrypted payloads)
    Stored,
    /// The archive writer deflates the bytes
    Deflated,
}

/// A sink for package entries.
///
/// Implementations write one complete entry per call and produce the
/// central directory in [`finish`](ArchiveWriter::finish).
pub trait ArchiveWriter {
    /// Append one entry.
    fn write_entry(&mut self, path: &str, data: &[u8], method: EntryMethod) -> Result<()>;

    /// Write the central directory. Called exactly once by the package writers.
    fn finish(&mut self) -> Result<()>;
}

/// [`ArchiveWriter`] backed by the `zip` crate.
///
/// # Examples
///
/// ```
/// use odpack::odf::{ArchiveWriter, EntryMethod, ZipArchiveWriter};
/// # fn example() -> odpack::Result<()> {
/// let mut archive = ZipArchiveWriter::in_memory();
/// archive.write_entry("mimetype", b"application/vnd.oasis.opendocument.text", EntryMethod::Stored)?;
/// archive.finish()?;
/// let bytes = archive.into_inner()?.into_inner();
/// assert_eq!(&bytes[..2], b"PK");
/// # Ok(())
/// # }
/// ```
pub struct ZipArchiveWriter<W: Write + Seek> {
    zip_writer: Option<ZipWriter<W>>,
    output: Option<W>,
}

impl ZipArchiveWriter<std::io::Cursor<Vec<u8>>> {
    /// Create an archive writer that writes to memory
    pub fn in_memory() -> Self {
        Self::new(std::io::Cursor::new(Vec::new()))
    }
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    /// Create an archive writer over any seekable sink
    pub fn new(writer: W) -> Self {
        Self {
            zip_writer: Some(ZipWriter::new(writer)),
            output: None,
        }
    }

    /// Whether [`finish`](ArchiveWriter::finish) has completed
    pub fn is_finished(&self) -> bool {
        self.output.is_some()
    }

    /// Return the sink once the archive is finished
    pub fn into_inner(self) -> Result<W> {
        self.output
            .ok_or_else(|| Error::ZipError("archive has not been finished".to_string()))
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    fn write_entry(&mut self, path: &str, data: &[u8], method: EntryMethod) -> Result<()> {
        let zip_writer = self
            .zip_writer
            .as_mut()
            .ok_or_else(|| Error::ZipError("archive already finished".to_string()))?;

        let compression = match method {
            EntryMethod::Stored => CompressionMethod::Stored,
            EntryMethod::Deflated => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(compression);

        zip_writer.start_file(path, options)?;
        zip_writer.write_all(data)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let zip_writer = self
            .zip_writer
            .take()
            .ok_or_else(|| Error::ZipError("archive already finished".to_string()))?;
        self.output = Some(zip_writer.finish()?);
        Ok(())
    }
}
