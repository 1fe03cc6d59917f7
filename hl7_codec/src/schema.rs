/*!
Positional segment templates.

Each supported segment is described once here: which token index holds which
model field, and how many tokens the encoder emits. Token indices follow HL7
field numbering, so for `MSH` index 1 is the field separator itself and
index 2 the encoding characters. Encoder and decoder both read these tables,
which keeps the wire layout in one place.
*/

/// One named position within a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub index: usize,
    /// Whether the value may legitimately carry the component separator
    pub composite: bool,
}

impl FieldSpec {
    const fn plain(name: &'static str, index: usize) -> Self {
        Self { name, index, composite: false }
    }

    const fn composite(name: &'static str, index: usize) -> Self {
        Self { name, index, composite: true }
    }
}

/// Layout of one segment type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSchema {
    pub tag: &'static str,
    /// Number of tokens rendered, including the trailing empty field
    pub width: usize,
    pub fields: &'static [FieldSpec],
}

impl SegmentSchema {
    /// Minimum token count a decoded segment must have
    pub fn required_fields(&self) -> usize {
        self.fields.iter().map(|f| f.index + 1).max().unwrap_or(1)
    }

    /// Look up a field by token index
    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.index == index)
    }

    /// Name of the field at `index`, or its HL7 position when unnamed
    pub fn field_name(&self, index: usize) -> String {
        match self.field(index) {
            Some(spec) => spec.name.to_string(),
            None => format!("{}-{}", self.tag, index),
        }
    }
}

/// Token indices of the message header
pub mod msh {
    pub const FIELD_SEPARATOR: usize = 1;
    pub const ENCODING_CHARACTERS: usize = 2;
    pub const SENDING_APP: usize = 3;
    pub const SENDING_FACILITY: usize = 4;
    pub const TIMESTAMP: usize = 7;
    pub const MESSAGE_TYPE: usize = 9;
    pub const MESSAGE_ID: usize = 10;
    pub const PROCESSING_ID: usize = 11;
    pub const VERSION: usize = 12;
}

/// Token indices of the patient identification segment
pub mod pid {
    pub const SET_ID: usize = 1;
    pub const PATIENT_ID: usize = 3;
    pub const NAME: usize = 7;
    pub const AGE_SEX: usize = 10;
    pub const RACE: usize = 11;
}

/// Token indices of the observation request segment
pub mod obr {
    pub const SET_ID: usize = 1;
    pub const SAMPLE_NUMBER: usize = 3;
    pub const DEVICE_ID: usize = 4;
    pub const COLLECTION_TIME: usize = 7;
    pub const SPECIMEN_TYPE: usize = 15;
    pub const EXAMINER: usize = 16;
    pub const DEPARTMENT: usize = 17;
}

/// Token indices of the observation result segment
pub mod obx {
    pub const SET_ID: usize = 1;
    pub const VALUE_TYPE: usize = 2;
    pub const OBSERVATION_IDENTIFIER: usize = 3;
    pub const OBSERVATION_NAME: usize = 4;
    pub const VALUE: usize = 5;
    pub const UNITS: usize = 6;
    pub const REFERENCE_RANGE: usize = 7;
    pub const ABNORMAL_FLAGS: usize = 8;
    pub const STATUS: usize = 11;
}

pub const MSH: SegmentSchema = SegmentSchema {
    tag: "MSH",
    width: 14,
    fields: &[
        FieldSpec::composite("encoding_characters", msh::ENCODING_CHARACTERS),
        FieldSpec::plain("sending_app", msh::SENDING_APP),
        FieldSpec::plain("sending_facility", msh::SENDING_FACILITY),
        FieldSpec::plain("timestamp", msh::TIMESTAMP),
        FieldSpec::composite("message_type", msh::MESSAGE_TYPE),
        FieldSpec::plain("message_id", msh::MESSAGE_ID),
        FieldSpec::plain("processing_id", msh::PROCESSING_ID),
        FieldSpec::plain("version", msh::VERSION),
    ],
};

pub const PID: SegmentSchema = SegmentSchema {
    tag: "PID",
    width: 13,
    fields: &[
        FieldSpec::plain("set_id", pid::SET_ID),
        FieldSpec::plain("id", pid::PATIENT_ID),
        FieldSpec::plain("name", pid::NAME),
        FieldSpec::composite("age_sex", pid::AGE_SEX),
        FieldSpec::plain("race", pid::RACE),
    ],
};

pub const OBR: SegmentSchema = SegmentSchema {
    tag: "OBR",
    width: 19,
    fields: &[
        FieldSpec::plain("set_id", obr::SET_ID),
        FieldSpec::plain("sample_number", obr::SAMPLE_NUMBER),
        FieldSpec::plain("device_id", obr::DEVICE_ID),
        FieldSpec::plain("collection_time", obr::COLLECTION_TIME),
        FieldSpec::plain("specimen_type", obr::SPECIMEN_TYPE),
        FieldSpec::plain("examiner", obr::EXAMINER),
        FieldSpec::plain("department", obr::DEPARTMENT),
    ],
};

pub const OBX: SegmentSchema = SegmentSchema {
    tag: "OBX",
    width: 13,
    fields: &[
        FieldSpec::plain("set_id", obx::SET_ID),
        FieldSpec::plain("value_type", obx::VALUE_TYPE),
        FieldSpec::plain("observation_identifier", obx::OBSERVATION_IDENTIFIER),
        FieldSpec::plain("observation_name", obx::OBSERVATION_NAME),
        FieldSpec::plain("value", obx::VALUE),
        FieldSpec::plain("units", obx::UNITS),
        FieldSpec::plain("reference_range", obx::REFERENCE_RANGE),
        FieldSpec::plain("abnormal_flags", obx::ABNORMAL_FLAGS),
        FieldSpec::plain("status", obx::STATUS),
    ],
};

/// Look up the template for a segment tag
pub fn for_tag(tag: &str) -> Option<&'static SegmentSchema> {
    match tag {
        "MSH" => Some(&MSH),
        "PID" => Some(&PID),
        "OBR" => Some(&OBR),
        "OBX" => Some(&OBX),
        _ => None,
    }
}
