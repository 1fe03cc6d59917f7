/*!
Segment tokenizer.

Splits raw wire text into segments and each segment into ordered fields.
Tokenizing never fails; field counts are checked by the decoder.
*/

use crate::protocol::HEADER_TAG;
use crate::wire::WireFormat;

/// One tokenized segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    fields: Vec<String>,
}

impl Segment {
    /// Build a segment from already-split fields
    pub fn from_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// The segment tag (field 0)
    pub fn tag(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    /// All fields, tag included
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at a token index
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Splits wire text according to a [`WireFormat`]
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    wire: &'a WireFormat,
}

impl<'a> Tokenizer<'a> {
    pub fn new(wire: &'a WireFormat) -> Self {
        Self { wire }
    }

    /// Split `input` into trimmed, non-empty segment strings
    pub fn segments<'s>(&self, input: &'s str) -> Vec<&'s str> {
        input
            .split(self.wire.segment_terminator.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Split one segment into fields
    pub fn split_segment(&self, segment: &str) -> Segment {
        let separator = self.wire.field_separator;

        if let Some(rest) = segment.strip_prefix(HEADER_TAG) {
            let mut fields = vec![HEADER_TAG.to_string()];
            let mut chars = rest.chars();
            if let Some(header_separator) = chars.next() {
                fields.push(header_separator.to_string());
                fields.extend(chars.as_str().split(separator).map(str::to_string));
            }
            return Segment::from_fields(fields);
        }

        Segment::from_fields(segment.split(separator).map(str::to_string).collect())
    }

    /// Tokenize a whole message
    pub fn tokenize(&self, input: &str) -> Vec<Segment> {
        self.segments(input)
            .into_iter()
            .map(|s| self.split_segment(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_splitting() {
        let wire = WireFormat::default();
        let tokenizer = Tokenizer::new(&wire);

        let segments = tokenizer.segments("MSH|^~\\&|A<CR>  PID|1 <CR><CR>   <CR>\nOBX|1|NM<CR>");
        assert_eq!(segments, vec!["MSH|^~\\&|A", "PID|1", "OBX|1|NM"]);
    }

    #[test]
    fn test_header_field_rule() {
        let wire = WireFormat::default();
        let tokenizer = Tokenizer::new(&wire);

        let segment = tokenizer.split_segment("MSH|^~\\&|SMT|VChmey|||20201207150940||ORU^R01|9|P|2.3.1|");
        assert_eq!(segment.tag(), "MSH");
        assert_eq!(segment.field(1), Some("|"));
        assert_eq!(segment.field(2), Some("^~\\&"));
        assert_eq!(segment.field(3), Some("SMT"));
        assert_eq!(segment.field(4), Some("VChmey"));
        assert_eq!(segment.field(7), Some("20201207150940"));
        assert_eq!(segment.field(9), Some("ORU^R01"));
        assert_eq!(segment.field(12), Some("2.3.1"));
        assert_eq!(segment.field(13), Some(""));
        assert_eq!(segment.len(), 14);
    }

    #[test]
    fn test_bare_header_tag() {
        let wire = WireFormat::default();
        let tokenizer = Tokenizer::new(&wire);

        let segment = tokenizer.split_segment("MSH");
        assert_eq!(segment.fields(), &["MSH".to_string()]);
    }

    #[test]
    fn test_fields_are_verbatim() {
        let wire = WireFormat::default();
        let tokenizer = Tokenizer::new(&wire);

        let segment = tokenizer.split_segment("OBX| 1 |NM|GLU|GLU| 19|mg/dL||N |||F|");
        assert_eq!(segment.tag(), "OBX");
        assert_eq!(segment.field(1), Some(" 1 "));
        assert_eq!(segment.field(5), Some(" 19"));
        assert_eq!(segment.field(8), Some("N "));
        assert_eq!(segment.field(20), None);
    }

    #[test]
    fn test_custom_terminator() {
        let wire = WireFormat::new().with_segment_terminator("\r");
        let tokenizer = Tokenizer::new(&wire);

        let segments = tokenizer.tokenize("MSH|^~\\&|A\rPID|1||9\r");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].tag(), "PID");
        assert_eq!(segments[1].field(3), Some("9"));
    }
}
