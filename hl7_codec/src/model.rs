/*!
Message model.

Plain owned values for one clinical report: header fields, an optional
patient, an optional order and the ordered list of observation results.
A message is built once per transaction, encoded, and dropped; decoding
always produces a fresh instance.
*/

use crate::error::{Hl7Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative sex code (PID-8 table 0001 subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    /// One-letter wire code
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
            Self::Unknown => "U",
        }
    }
}

impl FromStr for Sex {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            "O" => Ok(Self::Other),
            "U" => Ok(Self::Unknown),
            other => Err(Hl7Error::invalid_field(
                "PID",
                "sex",
                format!("unrecognized sex code '{}' (expected M, F, O or U)", other),
            )),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Patient demographics (PID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: String,
    pub sex: Sex,
    #[serde(default)]
    pub race: Option<String>,
}

impl Patient {
    /// Create a patient without a race entry
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: age.into(),
            sex,
            race: None,
        }
    }

    /// Set the race entry
    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = Some(race.into());
        self
    }
}

/// Order / specimen information (OBR)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub set_id: String,
    pub sample_number: String,
    pub device_id: String,
    /// `YYYYMMDDHHMMSS`
    pub collection_time: String,
    pub specimen_type: String,
    pub examiner: String,
    pub department: String,
}

/// One observation result (OBX)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObxResult {
    pub set_id: String,
    /// Governs how consumers read `value`; the codec treats the value as text
    pub value_type: String,
    pub observation_identifier: String,
    pub observation_name: String,
    pub value: String,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    #[serde(default)]
    pub abnormal_flags: Option<String>,
    pub status: String,
}

impl ObxResult {
    /// Create a numeric result with identifier and name set to the same code
    pub fn numeric(
        set_id: impl Into<String>,
        code: impl Into<String>,
        value: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let code = code.into();
        Self {
            set_id: set_id.into(),
            value_type: crate::protocol::VALUE_TYPE_NUMERIC.to_string(),
            observation_identifier: code.clone(),
            observation_name: code,
            value: value.into(),
            units: None,
            reference_range: None,
            abnormal_flags: None,
            status: status.into(),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_reference_range(mut self, range: impl Into<String>) -> Self {
        self.reference_range = Some(range.into());
        self
    }

    pub fn with_abnormal_flags(mut self, flags: impl Into<String>) -> Self {
        self.abnormal_flags = Some(flags.into());
        self
    }
}

/// A complete result message (MSH + optional PID/OBR + OBX*)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sending_app: String,
    pub sending_facility: String,
    /// `YYYYMMDDHHMMSS`
    pub timestamp: String,
    /// Composite type, e.g. `ORU^R01`
    pub message_type: String,
    pub message_id: String,
    pub version: String,
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub order: Option<OrderInfo>,
    #[serde(default)]
    pub results: Vec<ObxResult>,
}

impl Message {
    /// Create a message with header fields only
    pub fn new(
        sending_app: impl Into<String>,
        sending_facility: impl Into<String>,
        timestamp: impl Into<String>,
        message_type: impl Into<String>,
        message_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            sending_app: sending_app.into(),
            sending_facility: sending_facility.into(),
            timestamp: timestamp.into(),
            message_type: message_type.into(),
            message_id: message_id.into(),
            version: version.into(),
            patient: None,
            order: None,
            results: Vec::new(),
        }
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn with_order(mut self, order: OrderInfo) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_result(mut self, result: ObxResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_results(mut self, results: impl IntoIterator<Item = ObxResult>) -> Self {
        self.results.extend(results);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_codes() {
        assert_eq!("m".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(" O ".parse::<Sex>().unwrap(), Sex::Other);
        assert_eq!("U".parse::<Sex>().unwrap(), Sex::Unknown);
        assert!("X".parse::<Sex>().is_err());
        assert!("".parse::<Sex>().is_err());
        assert_eq!(Sex::Female.to_string(), "F");
    }

    #[test]
    fn test_builders() {
        let message = Message::new("SMT", "VChmey", "20240101120000", "ORU^R01", "42", "2.3.1")
            .with_patient(Patient::new("9", "John Doe", "25", Sex::Male).with_race("White"))
            .with_result(ObxResult::numeric("1", "GLU", "19", "F").with_units("mg/dL"))
            .with_result(ObxResult::numeric("2", "BUN", "37", "F"));

        let patient = message.patient.as_ref().unwrap();
        assert_eq!(patient.race.as_deref(), Some("White"));
        assert!(message.order.is_none());
        assert_eq!(message.results.len(), 2);
        assert_eq!(message.results[0].value_type, "NM");
        assert_eq!(message.results[0].observation_name, "GLU");
        assert_eq!(message.results[0].units.as_deref(), Some("mg/dL"));
        assert!(message.results[1].units.is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "sending_app": "SMT",
            "sending_facility": "VChmey",
            "timestamp": "20240101120000",
            "message_type": "ORU^R01",
            "message_id": "1",
            "version": "2.3.1",
            "patient": {"id": "9", "name": "John Doe", "age": "25", "sex": "M"}
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        let patient = message.patient.unwrap();
        assert_eq!(patient.sex, Sex::Male);
        assert!(patient.race.is_none());
        assert!(message.order.is_none());
        assert!(message.results.is_empty());
    }
}
