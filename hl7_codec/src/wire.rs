/*!
Wire-level delimiters.

The segment terminator is a configurable literal. Bedside devices in the
field emit the four characters `<CR>` rather than a carriage return, so that
is the default; set it to `"\r"` for a standard HL7 stream.
*/

use crate::error::{Hl7Error, Result};
use crate::protocol;
use serde::{Deserialize, Serialize};

/// Delimiter set used by the tokenizer, encoder and decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireFormat {
    /// Literal text placed between (and after) segments
    pub segment_terminator: String,

    /// Separator between fields within a segment
    pub field_separator: char,

    /// Separator between components of a composite field
    pub component_separator: char,

    /// Content of MSH-2
    pub encoding_characters: String,
}

impl WireFormat {
    /// Create a wire format with the default delimiters
    pub fn new() -> Self {
        Self {
            segment_terminator: protocol::DEFAULT_SEGMENT_TERMINATOR.to_string(),
            field_separator: protocol::FIELD_SEPARATOR,
            component_separator: protocol::COMPONENT_SEPARATOR,
            encoding_characters: protocol::ENCODING_CHARACTERS.to_string(),
        }
    }

    /// Replace the segment terminator
    pub fn with_segment_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.segment_terminator = terminator.into();
        self
    }

    /// Check that the delimiters can be told apart from each other
    pub fn validate(&self) -> Result<()> {
        if self.segment_terminator.is_empty() {
            return Err(Hl7Error::invalid_field(
                "WIRE",
                "segment_terminator",
                "must not be empty",
            ));
        }
        if self.field_separator == self.component_separator {
            return Err(Hl7Error::invalid_field(
                "WIRE",
                "component_separator",
                "must differ from the field separator",
            ));
        }
        if self.segment_terminator.contains(self.field_separator) {
            return Err(Hl7Error::invalid_field(
                "WIRE",
                "segment_terminator",
                "must not contain the field separator",
            ));
        }
        if self.encoding_characters.contains(self.field_separator) {
            return Err(Hl7Error::invalid_field(
                "WIRE",
                "encoding_characters",
                "must not contain the field separator",
            ));
        }
        Ok(())
    }
}

impl Default for WireFormat {
    fn default() -> Self {
        Self::new()
    }
}
