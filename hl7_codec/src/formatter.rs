/*!
Human-readable report for a decoded message.

This is a display projection only; it has no wire-format meaning.
*/

use crate::model::Message;
use std::fmt;

/// Line-oriented report over a borrowed [`Message`]
#[derive(Debug, Clone, Copy)]
pub struct Report<'m> {
    message: &'m Message,
}

impl<'m> Report<'m> {
    pub fn new(message: &'m Message) -> Self {
        Self { message }
    }

    /// Report lines; every call starts from the first line again
    pub fn lines(&self) -> impl Iterator<Item = String> + 'm {
        let message = self.message;
        let mut lines = vec![
            "Message Details:".to_string(),
            format!("Sending Application: {}", message.sending_app),
            format!("Sending Facility: {}", message.sending_facility),
            format!("DateTime: {}", message.timestamp),
            format!("Message Type: {}", message.message_type),
            format!("Version: {}", message.version),
            String::new(),
        ];

        if let Some(patient) = &message.patient {
            lines.push("Patient Information:".to_string());
            lines.push(format!("Name: {}", patient.name));
            lines.push(format!("ID: {}", patient.id));
            lines.push(format!("Age: {}", patient.age));
            lines.push(format!("Sex: {}", patient.sex));
            if let Some(race) = present(&patient.race) {
                lines.push(format!("Race: {}", race));
            }
            lines.push(String::new());
        }

        if let Some(order) = &message.order {
            lines.push("Order Information:".to_string());
            lines.push(format!("Sample Number: {}", order.sample_number));
            lines.push(format!("Collection Time: {}", order.collection_time));
            lines.push(format!("Specimen Type: {}", order.specimen_type));
            lines.push(format!("Examiner: {}", order.examiner));
            lines.push(format!("Department: {}", order.department));
            lines.push(String::new());
        }

        lines.push("Test Results:".to_string());
        for result in &message.results {
            lines.push(format!("{}:", result.observation_name));
            lines.push(format!("  Value: {}", result.value));
            if let Some(units) = present(&result.units) {
                lines.push(format!("  Units: {}", units));
            }
            if let Some(range) = present(&result.reference_range) {
                lines.push(format!("  Reference Range: {}", range));
            }
            if let Some(flags) = present(&result.abnormal_flags) {
                lines.push(format!("  Flag: {}", flags));
            }
            lines.push(String::new());
        }

        lines.into_iter()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in self.lines() {
            if !first {
                f.write_str("\n")?;
            }
            f.write_str(&line)?;
            first = false;
        }
        Ok(())
    }
}

/// Render a message report as one string
pub fn format_message(message: &Message) -> String {
    Report::new(message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObxResult, OrderInfo, Patient, Sex};

    fn message() -> Message {
        Message::new("SMT", "VChmey", "20201207150940", "ORU^R01", "9", "2.3.1")
            .with_patient(Patient::new("9", "John Doe", "25", Sex::Male))
            .with_order(OrderInfo {
                set_id: "1".to_string(),
                sample_number: "120000001".to_string(),
                device_id: "board".to_string(),
                collection_time: "20201207150640".to_string(),
                specimen_type: "Serum".to_string(),
                examiner: "QC1".to_string(),
                department: "Lab".to_string(),
            })
            .with_result(
                ObxResult::numeric("1", "ALT", "650", "F")
                    .with_units("U/L")
                    .with_reference_range("600")
                    .with_abnormal_flags("N"),
            )
            .with_result(ObxResult::numeric("2", "U/C", "68", "F").with_units(""))
    }

    #[test]
    fn test_report_layout() {
        let lines: Vec<String> = Report::new(&message()).lines().collect();
        let expected = [
            "Message Details:",
            "Sending Application: SMT",
            "Sending Facility: VChmey",
            "DateTime: 20201207150940",
            "Message Type: ORU^R01",
            "Version: 2.3.1",
            "",
            "Patient Information:",
            "Name: John Doe",
            "ID: 9",
            "Age: 25",
            "Sex: M",
            "",
            "Order Information:",
            "Sample Number: 120000001",
            "Collection Time: 20201207150640",
            "Specimen Type: Serum",
            "Examiner: QC1",
            "Department: Lab",
            "",
            "Test Results:",
            "ALT:",
            "  Value: 650",
            "  Units: U/L",
            "  Reference Range: 600",
            "  Flag: N",
            "",
            "U/C:",
            "  Value: 68",
            "",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_absent_sections_omitted() {
        let message = Message::new("SMT", "VChmey", "20201207150940", "ORU^R01", "9", "2.3.1");
        let text = format_message(&message);
        assert!(!text.contains("Patient Information:"));
        assert!(!text.contains("Order Information:"));
        assert!(text.ends_with("Test Results:"));
    }

    #[test]
    fn test_race_shown_when_present() {
        let message = message().with_patient(Patient::new("9", "John Doe", "25", Sex::Male).with_race("White"));
        assert!(format_message(&message).contains("\nRace: White\n"));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let message = message();
        let report = Report::new(&message);
        let first: Vec<String> = report.lines().collect();
        let second: Vec<String> = report.lines().collect();
        assert_eq!(first, second);
        assert_eq!(format_message(&message), format_message(&message));
    }
}
