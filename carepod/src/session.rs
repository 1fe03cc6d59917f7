/*!
Assembles one result message from device, patient and configuration data.
*/

use crate::config::{OrderDefaults, SenderConfig};
use crate::ids::IdProvider;
use hl7_codec::{Message, ObxResult, OrderInfo, Patient};

/// Builds messages for a single board
pub struct Assembler<'a> {
    order: &'a OrderDefaults,
    ids: &'a mut dyn IdProvider,
    device_id: String,
}

impl<'a> Assembler<'a> {
    pub fn new(order: &'a OrderDefaults, ids: &'a mut dyn IdProvider, device_id: impl Into<String>) -> Self {
        Self {
            order,
            ids,
            device_id: device_id.into(),
        }
    }

    /// Build a message stamped with `timestamp`; the same time is used as the
    /// specimen collection time.
    pub fn assemble(
        &mut self,
        sender: &SenderConfig,
        timestamp: &str,
        patient: Option<Patient>,
        results: Vec<ObxResult>,
    ) -> Message {
        let message_id = self.ids.next_id();
        let order = OrderInfo {
            set_id: self.order.set_id.clone(),
            sample_number: self.ids.next_id(),
            device_id: self.device_id.clone(),
            collection_time: timestamp.to_string(),
            specimen_type: self.order.specimen_type.clone(),
            examiner: self.order.examiner.clone(),
            department: self.order.department.clone(),
        };

        let mut message = Message::new(
            &sender.sending_app,
            &sender.sending_facility,
            timestamp,
            &sender.message_type,
            message_id,
            &sender.version,
        )
        .with_order(order)
        .with_results(results);
        message.patient = patient;
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdProvider;
    use hl7_codec::Sex;

    #[test]
    fn test_assemble() {
        let order_defaults = OrderDefaults::default();
        let mut ids = SequentialIdProvider::new("id-");
        let mut assembler = Assembler::new(&order_defaults, &mut ids, "board-9");

        let patient = Patient::new("9", "John Doe", "25", Sex::Male);
        let results = vec![ObxResult::numeric("r1", "GLU", "19", "F")];
        let message = assembler.assemble(&SenderConfig::default(), "20240101120000", Some(patient), results);

        assert_eq!(message.message_id, "id-1");
        assert_eq!(message.timestamp, "20240101120000");
        assert_eq!(message.message_type, "ORU^R01");
        let order = message.order.as_ref().unwrap();
        assert_eq!(order.sample_number, "id-2");
        assert_eq!(order.device_id, "board-9");
        assert_eq!(order.collection_time, "20240101120000");
        assert_eq!(order.set_id, "1");
        assert_eq!(order.specimen_type, "TBD");
        assert_eq!(message.patient.as_ref().unwrap().name, "John Doe");
        assert_eq!(message.results.len(), 1);
    }
}
