/*!
# HL7 Codec

Message model and codec for the pipe-delimited HL7 v2 subset exchanged between
a bedside point-of-care device and the receiving server: `MSH`, `PID`, `OBR`
and repeating `OBX` segments.

## Core Types

- [`Message`] - One result report (header, patient, order, results)
- [`Encoder`] / [`Decoder`] - Wire codec bound to a [`WireFormat`]
- [`Report`] - Human-readable projection of a decoded message

## Modules

- [`model`] - Message model
- [`wire`] - Delimiter configuration
- [`schema`] - Per-segment field positions
- [`tokenizer`] - Segment and field splitting
- [`encoder`] - Message to wire text
- [`decoder`] - Wire text to message
- [`formatter`] - Report lines
- [`timestamp`] - `YYYYMMDDHHMMSS` helpers
- [`error`] - Error types

## Example

```
use hl7_codec::{decode, encode, Message, ObxResult, Patient, Sex};

let message = Message::new("SMT", "VChmey", "20201207150940", "ORU^R01", "9", "2.3.1")
    .with_patient(Patient::new("9", "John Doe", "25", Sex::Male))
    .with_result(ObxResult::numeric("1", "GLU", "19", "F").with_units("mg/dL"));

let wire = encode(&message)?;
assert!(wire.starts_with("MSH|^~\\&|SMT|VChmey|"));
assert_eq!(decode(&wire)?, message);
# Ok::<(), hl7_codec::Hl7Error>(())
```
*/

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod formatter;
pub mod model;
pub mod schema;
pub mod timestamp;
pub mod tokenizer;
pub mod wire;

// Re-export commonly used types
pub use decoder::{decode, DecodeWarning, Decoded, Decoder};
pub use encoder::{encode, Encoder};
pub use error::{Hl7Error, Result};
pub use formatter::{format_message, Report};
pub use model::{Message, ObxResult, OrderInfo, Patient, Sex};
pub use tokenizer::{Segment, Tokenizer};
pub use wire::WireFormat;

/// Version information for the codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol constants
pub mod protocol {
    /// Tag of the mandatory header segment
    pub const HEADER_TAG: &str = "MSH";

    /// Default segment terminator, as emitted by the bedside boards
    pub const DEFAULT_SEGMENT_TERMINATOR: &str = "<CR>";

    /// Field separator (MSH-1)
    pub const FIELD_SEPARATOR: char = '|';

    /// Component separator
    pub const COMPONENT_SEPARATOR: char = '^';

    /// Encoding characters (MSH-2)
    pub const ENCODING_CHARACTERS: &str = "^~\\&";

    /// Processing ID (MSH-11): production
    pub const PROCESSING_ID: &str = "P";

    /// PID-1; one patient per message
    pub const PATIENT_SET_ID: &str = "1";

    /// OBX-2 value type for numeric results
    pub const VALUE_TYPE_NUMERIC: &str = "NM";

    /// Default message type for unsolicited observation results
    pub const DEFAULT_MESSAGE_TYPE: &str = "ORU^R01";

    /// Default HL7 version
    pub const DEFAULT_VERSION: &str = "2.3.1";

    /// OBX-11 result status: final
    pub const RESULT_STATUS_FINAL: &str = "F";
}
