/*!
Message decoder.

Tokenizes wire text and rebuilds a [`Message`] by reading fixed positions from
each segment. The first `MSH`, `PID` and `OBR` segments are used and later
duplicates are skipped; every `OBX` segment is decoded in the order it
appears.

Any segment shorter than its template fails the whole call with
[`Hl7Error::MalformedSegment`]; no partially decoded message is returned.
Recoverable oddities such as duplicate or unknown segments, an empty patient
identifier or an unrecognized sex code are collected as [`DecodeWarning`]s.
The warning hook only sees them once the whole message has decoded.
*/

use crate::error::{Hl7Error, Result};
use crate::model::{Message, ObxResult, OrderInfo, Patient, Sex};
use crate::schema::{self, msh, obr, obx, pid, SegmentSchema};
use crate::tokenizer::{Segment, Tokenizer};
use crate::wire::WireFormat;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A non-fatal finding reported while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A singleton segment appeared again; the later copy was ignored
    DuplicateSegment { tag: String, position: usize },

    /// A segment with an unsupported tag was skipped
    UnknownSegment { tag: String, position: usize },

    /// A value is empty or could not be interpreted; decoding carried on
    InvalidFieldValue {
        segment: String,
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSegment { tag, position } => {
                write!(f, "duplicate {} segment at position {} ignored", tag, position)
            }
            Self::UnknownSegment { tag, position } => {
                write!(f, "unsupported segment '{}' at position {} skipped", tag, position)
            }
            Self::InvalidFieldValue { segment, field, value, reason } => {
                write!(f, "{}.{} value {:?}: {}", segment, field, value, reason)
            }
        }
    }
}

/// Result of a decode together with its warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub message: Message,
    pub warnings: Vec<DecodeWarning>,
}

/// Callback invoked once per warning
pub type WarningHook = Arc<dyn Fn(&DecodeWarning) + Send + Sync>;

/// Bounds-checked positional access to one segment
struct FieldReader<'s> {
    segment: &'s Segment,
}

impl<'s> FieldReader<'s> {
    fn new(segment: &'s Segment, schema: &SegmentSchema, position: usize) -> Result<Self> {
        let required = schema.required_fields();
        if segment.len() < required {
            return Err(Hl7Error::malformed_segment(schema.tag, position, required, segment.len()));
        }
        Ok(Self { segment })
    }

    fn text(&self, index: usize) -> &'s str {
        self.segment.field(index).unwrap_or_default()
    }

    fn string(&self, index: usize) -> String {
        self.text(index).to_string()
    }

    /// Empty text maps to `None`
    fn optional(&self, index: usize) -> Option<String> {
        match self.text(index) {
            "" => None,
            text => Some(text.to_string()),
        }
    }
}

/// Decodes wire text with a fixed [`WireFormat`]
#[derive(Clone, Default)]
pub struct Decoder {
    wire: WireFormat,
    hook: Option<WarningHook>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("wire", &self.wire)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Decoder {
    /// Build a decoder, rejecting delimiter sets that cannot round-trip
    pub fn new(wire: WireFormat) -> Result<Self> {
        wire.validate()?;
        Ok(Self { wire, hook: None })
    }

    /// Register a callback that sees every warning of a successful decode
    pub fn with_warning_hook(mut self, hook: impl Fn(&DecodeWarning) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn wire(&self) -> &WireFormat {
        &self.wire
    }

    /// Decode a message, logging any warnings
    pub fn decode(&self, input: &str) -> Result<Message> {
        let decoded = self.decode_with_warnings(input)?;
        for warning in &decoded.warnings {
            warn!(message_id = %decoded.message.message_id, "{}", warning);
        }
        Ok(decoded.message)
    }

    /// Decode a message and return the warnings alongside it
    pub fn decode_with_warnings(&self, input: &str) -> Result<Decoded> {
        let segments = Tokenizer::new(&self.wire).tokenize(input);
        let mut warnings = Vec::new();

        let mut header: Option<(usize, &Segment)> = None;
        let mut patient: Option<(usize, &Segment)> = None;
        let mut order: Option<(usize, &Segment)> = None;
        let mut results: Vec<(usize, &Segment)> = Vec::new();

        for (position, segment) in segments.iter().enumerate() {
            let slot = match schema::for_tag(segment.tag()) {
                Some(template) if *template == schema::MSH => &mut header,
                Some(template) if *template == schema::PID => &mut patient,
                Some(template) if *template == schema::OBR => &mut order,
                Some(_) => {
                    results.push((position, segment));
                    continue;
                }
                None => {
                    warnings.push(DecodeWarning::UnknownSegment { tag: segment.tag().to_string(), position });
                    continue;
                }
            };

            if slot.is_some() {
                warnings.push(DecodeWarning::DuplicateSegment { tag: segment.tag().to_string(), position });
            } else {
                *slot = Some((position, segment));
            }
        }

        let (header_position, header_segment) = header.ok_or(Hl7Error::MissingHeaderSegment)?;
        let mut message = self.decode_header(header_segment, header_position)?;

        if let Some((position, segment)) = patient {
            message.patient = Some(self.decode_patient(segment, position, &mut warnings)?);
        }
        if let Some((position, segment)) = order {
            message.order = Some(self.decode_order(segment, position)?);
        }
        message.results = results
            .into_iter()
            .map(|(position, segment)| self.decode_result(segment, position))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            message_id = %message.message_id,
            segments = segments.len(),
            results = message.results.len(),
            warnings = warnings.len(),
            "Decoded HL7 message"
        );

        if let Some(hook) = &self.hook {
            for warning in &warnings {
                hook(warning);
            }
        }
        Ok(Decoded { message, warnings })
    }

    fn decode_header(&self, segment: &Segment, position: usize) -> Result<Message> {
        let fields = FieldReader::new(segment, &schema::MSH, position)?;
        Ok(Message::new(
            fields.text(msh::SENDING_APP),
            fields.text(msh::SENDING_FACILITY),
            fields.text(msh::TIMESTAMP),
            fields.text(msh::MESSAGE_TYPE),
            fields.text(msh::MESSAGE_ID),
            fields.text(msh::VERSION),
        ))
    }

    fn decode_patient(
        &self,
        segment: &Segment,
        position: usize,
        warnings: &mut Vec<DecodeWarning>,
    ) -> Result<Patient> {
        let fields = FieldReader::new(segment, &schema::PID, position)?;

        for (index, name) in [(pid::PATIENT_ID, "id"), (pid::NAME, "name")] {
            let value = fields.text(index);
            if value.trim().is_empty() {
                warnings.push(DecodeWarning::InvalidFieldValue {
                    segment: schema::PID.tag.to_string(),
                    field: name.to_string(),
                    value: value.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        let age_sex = fields.text(pid::AGE_SEX);
        let (age, sex_code) = age_sex
            .split_once(self.wire.component_separator)
            .unwrap_or((age_sex, ""));

        let sex = match sex_code.parse::<Sex>() {
            Ok(sex) => sex,
            Err(err) => {
                let reason = match err {
                    Hl7Error::InvalidFieldValue { reason, .. } => reason,
                    other => other.to_string(),
                };
                warnings.push(DecodeWarning::InvalidFieldValue {
                    segment: schema::PID.tag.to_string(),
                    field: "sex".to_string(),
                    value: sex_code.to_string(),
                    reason: format!("{}; using U", reason),
                });
                Sex::Unknown
            }
        };

        Ok(Patient {
            id: fields.string(pid::PATIENT_ID),
            name: fields.string(pid::NAME),
            age: age.to_string(),
            sex,
            race: fields.optional(pid::RACE),
        })
    }

    fn decode_order(&self, segment: &Segment, position: usize) -> Result<OrderInfo> {
        let fields = FieldReader::new(segment, &schema::OBR, position)?;
        Ok(OrderInfo {
            set_id: fields.string(obr::SET_ID),
            sample_number: fields.string(obr::SAMPLE_NUMBER),
            device_id: fields.string(obr::DEVICE_ID),
            collection_time: fields.string(obr::COLLECTION_TIME),
            specimen_type: fields.string(obr::SPECIMEN_TYPE),
            examiner: fields.string(obr::EXAMINER),
            department: fields.string(obr::DEPARTMENT),
        })
    }

    fn decode_result(&self, segment: &Segment, position: usize) -> Result<ObxResult> {
        let fields = FieldReader::new(segment, &schema::OBX, position)?;
        Ok(ObxResult {
            set_id: fields.string(obx::SET_ID),
            value_type: fields.string(obx::VALUE_TYPE),
            observation_identifier: fields.string(obx::OBSERVATION_IDENTIFIER),
            observation_name: fields.string(obx::OBSERVATION_NAME),
            value: fields.string(obx::VALUE),
            units: fields.optional(obx::UNITS),
            reference_range: fields.optional(obx::REFERENCE_RANGE),
            abnormal_flags: fields.optional(obx::ABNORMAL_FLAGS),
            status: fields.string(obx::STATUS),
        })
    }
}

/// Decode with the default wire format
pub fn decode(input: &str) -> Result<Message> {
    Decoder::default().decode(input)
}
