//! Raw DEFLATE compression for package entries.
//!
//! ODF stores compressed parts as raw DEFLATE streams (no zlib header), both
//! for plain deflated ZIP entries and for the compress-then-encrypt path.

use crate::common::Result;
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

/// Compress `data` into a raw DEFLATE stream.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let buf = Vec::with_capacity(data.len() / 2 + 64);
    let mut encoder = DeflateEncoder::new(buf, Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
