/*!
Interactive data collection at the bedside console.

Prompts are written to `W` and answers read line by line from `R`, so the
collector runs against stdin/stdout in the binary and against in-memory
buffers in tests.
*/

use crate::config::SenderConfig;
use crate::ids::IdProvider;
use anyhow::{bail, Context, Result};
use hl7_codec::protocol::{RESULT_STATUS_FINAL, VALUE_TYPE_NUMERIC};
use hl7_codec::{ObxResult, Patient, Sex};
use std::io::{BufRead, Write};

/// Word that ends result entry
pub const DONE: &str = "done";

pub struct Collector<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Collector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt and read one trimmed line; `None` at end of input
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read from console")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn require(&mut self, prompt: &str) -> Result<String> {
        match self.ask(prompt)? {
            Some(answer) => Ok(answer),
            None => bail!("Input ended while waiting for '{}'", prompt),
        }
    }

    /// Ask again until the answer is not blank
    fn non_empty(&mut self, prompt: &str) -> Result<String> {
        loop {
            let answer = self.require(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "{} is required", prompt)?;
        }
    }

    fn optional(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer = self.require(&format!("{} (Optional, leave blank if none)", prompt))?;
        Ok(if answer.is_empty() { None } else { Some(answer) })
    }

    fn with_default(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.require(&format!("{} [{}]", prompt, default))?;
        Ok(if answer.is_empty() { default.to_string() } else { answer })
    }

    /// Collect PID data
    pub fn patient(&mut self) -> Result<Patient> {
        writeln!(self.output, "Enter Patient Information:")?;
        let id = self.non_empty("Patient ID")?;
        let name = self.non_empty("Patient Name")?;
        let age = self.require("Age")?;
        let sex = loop {
            let answer = self.require("Sex (M/F/O/U)")?;
            match answer.parse::<Sex>() {
                Ok(sex) => break sex,
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        };
        let race = self.optional("Race")?;

        Ok(Patient { id, name, age, sex, race })
    }

    /// Collect MSH values, offering the configured ones as defaults
    pub fn sender(&mut self, defaults: &SenderConfig) -> Result<SenderConfig> {
        writeln!(self.output, "Enter Message Header Details:")?;
        Ok(SenderConfig {
            sending_app: self.with_default("Sending Application", &defaults.sending_app)?,
            sending_facility: self.with_default("Sending Facility", &defaults.sending_facility)?,
            message_type: self.with_default("Message Type (e.g., ORU^R01)", &defaults.message_type)?,
            version: self.with_default("HL7 Version (e.g., 2.3.1)", &defaults.version)?,
        })
    }

    /// Collect OBX rows until `done` or end of input
    pub fn results(&mut self, ids: &mut dyn IdProvider) -> Result<Vec<ObxResult>> {
        writeln!(self.output, "Enter Observation Results (OBX):")?;
        let mut results = Vec::new();

        loop {
            let name = match self.ask(&format!("Observation Name (or '{}' to finish)", DONE))? {
                Some(name) if !name.eq_ignore_ascii_case(DONE) => name,
                _ => break,
            };
            if name.is_empty() {
                continue;
            }

            let value = self.require(&format!("Value for {}", name))?;
            let units = self.optional(&format!("Units for {}", name))?;
            let reference_range = self.optional(&format!("Reference Range for {}", name))?;
            let abnormal_flags = self.optional(&format!("Abnormal Flags for {}", name))?;
            let status = self.with_default(&format!("Status for {} (e.g., F - Final)", name), RESULT_STATUS_FINAL)?;

            results.push(ObxResult {
                set_id: ids.next_id(),
                value_type: VALUE_TYPE_NUMERIC.to_string(),
                observation_identifier: name.clone(),
                observation_name: name,
                value,
                units,
                reference_range,
                abnormal_flags,
                status,
            });
        }

        Ok(results)
    }
}
