/*!
Point-of-care testing device interface.

Real analyzers are attached over serial or GPIO; [`SimulatedDevice`] produces
a fixed panel of numeric results so the rest of the pipeline can run without
hardware.
*/

use crate::ids::IdProvider;
use anyhow::Result;
use hl7_codec::protocol::RESULT_STATUS_FINAL;
use hl7_codec::ObxResult;
use tracing::info;

/// A device that yields observation results
pub trait PoctDevice {
    /// Identifier written to OBR-4
    fn device_id(&self) -> &str;

    /// Read one batch of results
    fn read_results(&mut self, ids: &mut dyn IdProvider) -> Result<Vec<ObxResult>>;
}

/// Deterministic stand-in for an analyzer
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    device_id: String,
    result_count: usize,
}

impl SimulatedDevice {
    pub fn new(device_id: impl Into<String>, result_count: usize) -> Self {
        Self {
            device_id: device_id.into(),
            result_count,
        }
    }
}

impl PoctDevice for SimulatedDevice {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Even-numbered tests carry units and a reference range and read normal;
    /// odd-numbered ones carry neither and read high.
    fn read_results(&mut self, ids: &mut dyn IdProvider) -> Result<Vec<ObxResult>> {
        let results: Vec<ObxResult> = (1..=self.result_count)
            .map(|i| {
                let mut result = ObxResult::numeric(
                    ids.next_id(),
                    format!("Test{}", i),
                    (i * 10).to_string(),
                    RESULT_STATUS_FINAL,
                );
                result.observation_name = format!("Test{} Name", i);
                if i % 2 == 0 {
                    result
                        .with_units("mg/dL")
                        .with_reference_range("10-100")
                        .with_abnormal_flags("N")
                } else {
                    result.with_abnormal_flags("H")
                }
            })
            .collect();

        info!(device_id = %self.device_id, results = results.len(), "Read results from simulated POCT device");
        Ok(results)
    }
}
