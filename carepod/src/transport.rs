/*!
Message output.

Delivery to the receiving server is not implemented here. Every encoded
message is echoed to the console together with its report, and may also be
dropped into a directory for a separate forwarder to pick up.
*/

use anyhow::{Context, Result};
use hl7_codec::{Message, Report};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for encoded messages
pub trait MessageSink {
    fn send(&mut self, message_id: &str, wire: &str) -> Result<()>;
}

/// Prints each message to a console writer, then hands it to an optional sink
pub struct Publisher<W: Write> {
    console: W,
    outbox: Option<Box<dyn MessageSink>>,
}

impl<W: Write> Publisher<W> {
    pub fn new(console: W, outbox: Option<Box<dyn MessageSink>>) -> Self {
        Self { console, outbox }
    }

    pub fn into_console(self) -> W {
        self.console
    }

    /// Print the raw wire text and the report, then deliver to the outbox
    pub fn publish(&mut self, message: &Message, wire: &str) -> Result<()> {
        writeln!(self.console, "Raw HL7 Message:")?;
        writeln!(self.console, "{}", wire)?;
        writeln!(self.console)?;
        writeln!(self.console, "Formatted HL7 Message:")?;
        writeln!(self.console, "{}", Report::new(message))?;
        writeln!(self.console)?;
        self.console.flush().context("Failed to write to console")?;

        if let Some(outbox) = self.outbox.as_mut() {
            outbox.send(&message.message_id, wire)?;
        }
        Ok(())
    }
}

impl Publisher<std::io::Stdout> {
    pub fn stdout(outbox: Option<Box<dyn MessageSink>>) -> Self {
        Self::new(std::io::stdout(), outbox)
    }
}

/// Writes each message to `<directory>/<message_id>.hl7`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Path a message with this ID will be written to
    pub fn path_for(&self, message_id: &str) -> PathBuf {
        let file_stem: String = message_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let file_stem = if file_stem.is_empty() { "message".to_string() } else { file_stem };
        self.directory.join(format!("{}.hl7", file_stem))
    }
}

impl MessageSink for DirectorySink {
    fn send(&mut self, message_id: &str, wire: &str) -> Result<()> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create output directory: {}", self.directory.display()))?;

        let path = self.path_for(message_id);
        std::fs::write(&path, wire).with_context(|| format!("Failed to write message file: {}", path.display()))?;

        info!("📁 Wrote message {} to {}", message_id, path.display());
        Ok(())
    }
}
