//! HTML writer implementation

use crate::tree::Attributes;

use super::Writer;

/// Writes the tree as HTML.
///
/// Text and attribute values are escaped; MathML is trusted and written
/// verbatim.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buffer: String,
}

impl HtmlWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn start_tag(&mut self, tag: &str, attributes: &Attributes) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        for (key, value) in attributes {
            self.buffer.push(' ');
            self.buffer.push_str(key);
            self.buffer.push_str("=\"");
            self.buffer
                .push_str(html_escape::encode_double_quoted_attribute(value).as_ref());
            self.buffer.push('"');
        }
        self.buffer.push('>');
    }
}

impl Writer for HtmlWriter {
    fn open(&mut self, tag: &str, attributes: &Attributes) {
        self.start_tag(tag, attributes);
    }

    fn close(&mut self, tag: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    fn self_closing(&mut self, tag: &str, attributes: &Attributes) {
        self.start_tag(tag, attributes);
    }

    fn text(&mut self, value: &str) {
        self.buffer
            .push_str(html_escape::encode_text(value).as_ref());
    }

    fn mathml(&mut self, value: &str) {
        self.buffer.push_str(value);
    }

    fn as_string(&self) -> String {
        self.buffer.clone()
    }
}
