/*!
Message encoder.

Renders a [`Message`] into terminated, pipe-delimited wire text using the
layouts in [`crate::schema`]. Values are not escaped; any value that would
break field boundaries is rejected instead.
*/

use crate::error::{Hl7Error, Result};
use crate::model::{Message, ObxResult, OrderInfo, Patient};
use crate::protocol::PROCESSING_ID;
use crate::schema::{self, msh, obr, obx, pid, SegmentSchema};
use crate::wire::WireFormat;
use tracing::debug;

/// Fixed-width token buffer for one segment
struct SegmentWriter<'w> {
    schema: &'static SegmentSchema,
    wire: &'w WireFormat,
    tokens: Vec<String>,
}

impl<'w> SegmentWriter<'w> {
    fn new(schema: &'static SegmentSchema, wire: &'w WireFormat) -> Self {
        let mut tokens = vec![String::new(); schema.width];
        tokens[0] = schema.tag.to_string();
        Self { schema, wire, tokens }
    }

    /// Place a value at a token index after checking it is wire-safe
    fn set(&mut self, index: usize, value: &str) -> Result<&mut Self> {
        let composite = self.schema.field(index).is_some_and(|f| f.composite);
        check_value(self.wire, self.schema.tag, &self.schema.field_name(index), value, composite)?;
        self.tokens[index] = value.to_string();
        Ok(self)
    }

    fn set_optional(&mut self, index: usize, value: Option<&str>) -> Result<&mut Self> {
        self.set(index, value.unwrap_or(""))
    }

    fn render(self) -> String {
        let separator = self.wire.field_separator.to_string();
        if self.schema.tag == schema::MSH.tag {
            // MSH-1 is the separator itself and is not rendered as a token
            let mut out = self.tokens[0].clone();
            for token in &self.tokens[msh::FIELD_SEPARATOR + 1..] {
                out.push_str(&separator);
                out.push_str(token);
            }
            out
        } else {
            self.tokens.join(&separator)
        }
    }
}

/// Reject values that would be split differently on decode
fn check_value(wire: &WireFormat, segment: &str, field: &str, value: &str, composite: bool) -> Result<()> {
    if value.contains(wire.field_separator) {
        return Err(Hl7Error::invalid_field(
            segment,
            field,
            format!("contains field separator '{}'", wire.field_separator),
        ));
    }
    if value.contains(wire.segment_terminator.as_str()) {
        return Err(Hl7Error::invalid_field(
            segment,
            field,
            format!("contains segment terminator {:?}", wire.segment_terminator),
        ));
    }
    if !composite && value.contains(wire.component_separator) {
        return Err(Hl7Error::invalid_field(
            segment,
            field,
            format!("contains component separator '{}'", wire.component_separator),
        ));
    }
    Ok(())
}

/// Encodes messages with a fixed [`WireFormat`]
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    wire: WireFormat,
}

impl Encoder {
    /// Build an encoder, rejecting delimiter sets that cannot round-trip
    pub fn new(wire: WireFormat) -> Result<Self> {
        wire.validate()?;
        Ok(Self { wire })
    }

    pub fn wire(&self) -> &WireFormat {
        &self.wire
    }

    /// Encode a complete message.
    ///
    /// Segments are emitted as MSH, PID (if present), OBR (if present), then
    /// one OBX per result in order, each followed by the segment terminator.
    pub fn encode(&self, message: &Message) -> Result<String> {
        let mut segments = Vec::with_capacity(3 + message.results.len());

        segments.push(self.encode_header(message)?);
        if let Some(patient) = &message.patient {
            segments.push(self.encode_patient(patient)?);
        }
        if let Some(order) = &message.order {
            segments.push(self.encode_order(order)?);
        }
        for result in &message.results {
            segments.push(self.encode_result(result)?);
        }

        debug!(
            message_id = %message.message_id,
            segments = segments.len(),
            "Encoded HL7 message"
        );

        let terminator = &self.wire.segment_terminator;
        let mut out = segments.join(terminator);
        out.push_str(terminator);
        Ok(out)
    }

    fn encode_header(&self, message: &Message) -> Result<String> {
        let mut writer = SegmentWriter::new(&schema::MSH, &self.wire);
        writer
            .set(msh::ENCODING_CHARACTERS, &self.wire.encoding_characters)?
            .set(msh::SENDING_APP, &message.sending_app)?
            .set(msh::SENDING_FACILITY, &message.sending_facility)?
            .set(msh::TIMESTAMP, &message.timestamp)?
            .set(msh::MESSAGE_TYPE, &message.message_type)?
            .set(msh::MESSAGE_ID, &message.message_id)?
            .set(msh::PROCESSING_ID, PROCESSING_ID)?
            .set(msh::VERSION, &message.version)?;
        Ok(writer.render())
    }

    fn encode_patient(&self, patient: &Patient) -> Result<String> {
        for (name, value) in [("id", &patient.id), ("name", &patient.name)] {
            if value.trim().is_empty() {
                return Err(Hl7Error::invalid_field(schema::PID.tag, name, "must not be empty"));
            }
        }
        // Age is composed with sex below, so it must not carry a component of its own
        check_value(&self.wire, schema::PID.tag, "age", &patient.age, false)?;
        let age_sex = format!("{}{}{}", patient.age, self.wire.component_separator, patient.sex.code());

        let mut writer = SegmentWriter::new(&schema::PID, &self.wire);
        writer
            .set(pid::SET_ID, crate::protocol::PATIENT_SET_ID)?
            .set(pid::PATIENT_ID, &patient.id)?
            .set(pid::NAME, &patient.name)?
            .set(pid::AGE_SEX, &age_sex)?
            .set_optional(pid::RACE, patient.race.as_deref())?;
        Ok(writer.render())
    }

    fn encode_order(&self, order: &OrderInfo) -> Result<String> {
        let mut writer = SegmentWriter::new(&schema::OBR, &self.wire);
        writer
            .set(obr::SET_ID, &order.set_id)?
            .set(obr::SAMPLE_NUMBER, &order.sample_number)?
            .set(obr::DEVICE_ID, &order.device_id)?
            .set(obr::COLLECTION_TIME, &order.collection_time)?
            .set(obr::SPECIMEN_TYPE, &order.specimen_type)?
            .set(obr::EXAMINER, &order.examiner)?
            .set(obr::DEPARTMENT, &order.department)?;
        Ok(writer.render())
    }

    fn encode_result(&self, result: &ObxResult) -> Result<String> {
        let mut writer = SegmentWriter::new(&schema::OBX, &self.wire);
        writer
            .set(obx::SET_ID, &result.set_id)?
            .set(obx::VALUE_TYPE, &result.value_type)?
            .set(obx::OBSERVATION_IDENTIFIER, &result.observation_identifier)?
            .set(obx::OBSERVATION_NAME, &result.observation_name)?
            .set(obx::VALUE, &result.value)?
            .set_optional(obx::UNITS, result.units.as_deref())?
            .set_optional(obx::REFERENCE_RANGE, result.reference_range.as_deref())?
            .set_optional(obx::ABNORMAL_FLAGS, result.abnormal_flags.as_deref())?
            .set(obx::STATUS, &result.status)?;
        Ok(writer.render())
    }
}

/// Encode with the default wire format
pub fn encode(message: &Message) -> Result<String> {
    Encoder::default().encode(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sex;

    fn sample_message() -> Message {
        Message::new("SMT", "VChmey", "20201207150940", "ORU^R01", "9", "2.3.1")
            .with_patient(Patient::new("9", "John Doe", "25", Sex::Male).with_race("White"))
            .with_order(OrderInfo {
                set_id: "1".to_string(),
                sample_number: "120000001".to_string(),
                device_id: "board-1".to_string(),
                collection_time: "20201207150640".to_string(),
                specimen_type: "Serum".to_string(),
                examiner: "QC1".to_string(),
                department: "Lab".to_string(),
            })
            .with_result(
                ObxResult::numeric("1", "AST", "323", "F")
                    .with_units("U/L")
                    .with_reference_range("200-300")
                    .with_abnormal_flags("H"),
            )
    }

    #[test]
    fn test_segment_layouts() {
        let wire = encode(&sample_message()).unwrap();
        let segments: Vec<&str> = wire.split("<CR>").collect();

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], "MSH|^~\\&|SMT|VChmey|||20201207150940||ORU^R01|9|P|2.3.1|");
        assert_eq!(segments[1], "PID|1||9||||John Doe|||25^M|White|");
        assert_eq!(
            segments[2],
            "OBR|1||120000001|board-1|||20201207150640||||||||Serum|QC1|Lab|"
        );
        assert_eq!(segments[3], "OBX|1|NM|AST|AST|323|U/L|200-300|H|||F|");
        assert_eq!(segments[4], "");
    }

    #[test]
    fn test_optional_segments_omitted() {
        let message = Message::new("SMT", "VChmey", "20201207150940", "ORU^R01", "9", "2.3.1");
        let wire = encode(&message).unwrap();
        assert_eq!(wire, "MSH|^~\\&|SMT|VChmey|||20201207150940||ORU^R01|9|P|2.3.1|<CR>");
    }

    #[test]
    fn test_absent_optionals_render_empty() {
        let message = Message::new("A", "B", "20240101000000", "ORU^R01", "1", "2.3.1")
            .with_patient(Patient::new("7", "Jane Roe", "40", Sex::Female))
            .with_result(ObxResult::numeric("1", "GLU", "19", "F"));
        let wire = encode(&message).unwrap();

        assert!(wire.contains("<CR>PID|1||7||||Jane Roe|||40^F||<CR>"));
        assert!(wire.contains("<CR>OBX|1|NM|GLU|GLU|19||||||F|<CR>"));
    }

    #[test]
    fn test_rejects_field_separator() {
        let mut message = sample_message();
        message.patient.as_mut().unwrap().name = "John|Doe".to_string();

        let err = encode(&message).unwrap_err();
        assert_eq!(
            err,
            Hl7Error::invalid_field("PID", "name", "contains field separator '|'")
        );
    }

    #[test]
    fn test_rejects_component_separator_outside_composites() {
        let mut message = sample_message();
        message.results[0].reference_range = Some("300^200".to_string());
        assert!(matches!(
            encode(&message),
            Err(Hl7Error::InvalidFieldValue { ref field, .. }) if field == "reference_range"
        ));

        let mut message = sample_message();
        message.patient.as_mut().unwrap().age = "25^Y".to_string();
        assert!(matches!(
            encode(&message),
            Err(Hl7Error::InvalidFieldValue { ref field, .. }) if field == "age"
        ));
    }

    #[test]
    fn test_rejects_segment_terminator() {
        let mut message = sample_message();
        message.sending_facility = "Ward<CR>7".to_string();
        assert!(matches!(
            encode(&message),
            Err(Hl7Error::InvalidFieldValue { ref field, .. }) if field == "sending_facility"
        ));
    }

    #[test]
    fn test_custom_terminator() {
        let encoder = Encoder::new(WireFormat::new().with_segment_terminator("\r")).unwrap();
        let wire = encoder.encode(&sample_message()).unwrap();
        assert_eq!(wire.matches('\r').count(), 4);
        assert!(wire.ends_with("|F|\r"));
        assert!(!wire.contains("<CR>"));
    }

    #[test]
    fn test_rejects_empty_patient_id_and_name() {
        let mut message = sample_message();
        message.patient.as_mut().unwrap().id = String::new();
        assert_eq!(
            encode(&message),
            Err(Hl7Error::invalid_field("PID", "id", "must not be empty"))
        );

        let mut message = sample_message();
        message.patient.as_mut().unwrap().name = "  ".to_string();
        assert_eq!(
            encode(&message),
            Err(Hl7Error::invalid_field("PID", "name", "must not be empty"))
        );
    }

    #[test]
    fn test_new_rejects_invalid_wire_format() {
        let err = Encoder::new(WireFormat::new().with_segment_terminator("")).unwrap_err();
        assert_eq!(
            err,
            Hl7Error::invalid_field("WIRE", "segment_terminator", "must not be empty")
        );
        assert!(Encoder::new(WireFormat::new()).is_ok());
    }
}
