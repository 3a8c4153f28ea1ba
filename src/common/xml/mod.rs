//! XML escaping and markup writing utilities.

mod escape;
mod writer;

pub use escape::{escape_xml, unescape_xml};
pub use writer::XmlWriter;
