//! Minimal streaming XML markup writer.
//!
//! Produces indented markup into a `String`. Attribute values and text are
//! always escaped through [`escape_xml`](super::escape_xml), so callers pass
//! raw values.

use super::escape::escape_xml;

/// Streaming XML writer with one-space indentation per nesting level.
#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
    stack: Vec<String>,
    /// An element start tag is open and still accepts attributes.
    tag_open: bool,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the standard UTF-8 XML declaration.
    pub fn declaration(&mut self) -> &mut Self {
        self.buf
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self
    }

    /// Open a new element. Attributes may follow until the next structural call.
    pub fn start(&mut self, name: &str) -> &mut Self {
        self.close_start_tag();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.stack.push(name.to_string());
        self.tag_open = true;
        self
    }

    /// Add an attribute to the element opened by the last [`start`](Self::start).
    ///
    /// Ignored when no start tag is open.
    pub fn attr(&mut self, name: &str, value: impl AsRef<str>) -> &mut Self {
        if self.tag_open {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_xml(value.as_ref()));
            self.buf.push('"');
        }
        self
    }

    /// Close the innermost element, as `<x/>` when it has no children.
    pub fn end(&mut self) -> &mut Self {
        let Some(name) = self.stack.pop() else {
            return self;
        };
        if self.tag_open {
            self.buf.push_str("/>\n");
            self.tag_open = false;
        } else {
            self.indent();
            self.buf.push_str("</");
            self.buf.push_str(&name);
            self.buf.push_str(">\n");
        }
        self
    }

    /// Close every element still open and return the document.
    pub fn finish(mut self) -> String {
        while !self.stack.is_empty() {
            self.end();
        }
        self.buf
    }

    fn close_start_tag(&mut self) {
        if self.tag_open {
            self.buf.push_str(">\n");
            self.tag_open = false;
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.buf.push(' ');
        }
    }
}
