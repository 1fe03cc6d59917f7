/*!
# CarePod

Bedside tool that builds HL7 result messages from patient and point-of-care
device data, and decodes received messages into a readable report.

## Usage

### Simulated board run (mock server data + simulated POCT device)
```bash
carepod simulate --count 5
```

### Interactive collection at the console
```bash
carepod collect
```

### Encode a message described as JSON
```bash
carepod encode --input message.json
```

### Decode wire text (file or `-` for stdin)
```bash
carepod decode --input message.hl7
carepod decode --input - --json
```

### Generate a configuration file
```bash
carepod config --output carepod.toml
```
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod collect;
mod config;
mod device;
mod ids;
mod session;
mod transport;

use collect::Collector;
use config::AppConfig;
use device::{PoctDevice, SimulatedDevice};
use hl7_codec::{timestamp, Decoder, Encoder, Message, Patient, Report, Sex};
use ids::{IdProvider, UuidIdProvider};
use session::Assembler;
use transport::{DirectorySink, MessageSink, Publisher};

#[derive(Parser)]
#[command(name = "carepod")]
#[command(about = "Build, send and decode HL7 point-of-care result messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "carepod.toml", global = true)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON message description into HL7 wire text
    Encode {
        /// JSON file holding the message
        #[arg(short, long)]
        input: PathBuf,

        /// Write the message into this directory instead of the configured sink
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Decode HL7 wire text and print a report
    Decode {
        /// File to read, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Print the decoded message as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Collect patient, header and results interactively
    Collect {
        /// Write the message into this directory instead of the configured sink
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the board flow against a simulated POCT device
    Simulate {
        /// Number of simulated results
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Write the message into this directory instead of the configured sink
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "carepod.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only messages and reports
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode { input, output_dir } => run_encode(&load_config(&cli.config), input, output_dir),
        Commands::Decode { input, json } => run_decode(&load_config(&cli.config), &input, json),
        Commands::Collect { output_dir } => run_collect(&load_config(&cli.config), output_dir),
        Commands::Simulate { count, output_dir } => {
            run_simulate(&load_config(&cli.config), count, output_dir)
        }
        Commands::Config { output } => generate_config_file(output),
    }
}

/// Load the config file, falling back to defaults when it is missing or unreadable
fn load_config(path: &Path) -> AppConfig {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return AppConfig::new();
    }
    AppConfig::load_from_file(path).unwrap_or_else(|e| {
        warn!("⚠️ Failed to load config ({:#}), using defaults", e);
        AppConfig::new()
    })
}

/// Directory sink from `--output-dir` or the config; `None` prints only
fn make_outbox(config: &AppConfig, output_dir: Option<PathBuf>) -> Option<Box<dyn MessageSink>> {
    let directory = match output_dir {
        Some(dir) => dir,
        None if config.output.write_files => PathBuf::from(&config.output.directory),
        None => return None,
    };
    Some(Box::new(DirectorySink::new(directory)))
}

/// Encode, print the raw text and report, and hand the wire text to the outbox
fn publish(config: &AppConfig, message: &Message, output_dir: Option<PathBuf>) -> Result<()> {
    let wire = Encoder::new(config.wire.clone())
        .and_then(|encoder| encoder.encode(message))
        .context("Failed to encode HL7 message")?;

    Publisher::stdout(make_outbox(config, output_dir)).publish(message, &wire)?;
    info!(
        "✅ Sent message {} ({} results, {} bytes)",
        message.message_id,
        message.results.len(),
        wire.len()
    );
    Ok(())
}

fn run_encode(config: &AppConfig, input: PathBuf, output_dir: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read message file: {}", input.display()))?;
    let message: Message = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse message JSON: {}", input.display()))?;

    if let Err(e) = timestamp::parse(&message.timestamp, "timestamp") {
        warn!("{}", e);
    }

    publish(config, &message, output_dir)
}

fn run_decode(config: &AppConfig, input: &str, json: bool) -> Result<()> {
    let text = if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read message from stdin")?;
        text
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read message file: {}", input))?
    };

    let decoder = Decoder::new(config.wire.clone()).context("Invalid wire format")?;
    let decoded = decoder.decode_with_warnings(&text).context("Failed to decode HL7 message")?;
    for warning in &decoded.warnings {
        warn!("⚠️ {}", warning);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded.message)?);
    } else {
        println!("{}", Report::new(&decoded.message));
    }
    Ok(())
}

fn run_collect(config: &AppConfig, output_dir: Option<PathBuf>) -> Result<()> {
    let mut ids = UuidIdProvider;
    let board_id = ids.next_id();
    println!("Starting CarePod data gathering...");
    println!("Board Unique ID: {}", board_id);

    let stdin = std::io::stdin();
    let mut collector = Collector::new(stdin.lock(), std::io::stdout());
    let patient = collector.patient()?;
    let sender = collector.sender(&config.sender)?;
    let results = collector.results(&mut ids)?;

    let now = timestamp::now();
    let message = Assembler::new(&config.order, &mut ids, board_id).assemble(&sender, &now, Some(patient), results);

    publish(config, &message, output_dir)
}

fn run_simulate(config: &AppConfig, count: usize, output_dir: Option<PathBuf>) -> Result<()> {
    let mut ids = UuidIdProvider;
    let board_id = ids.next_id();
    info!("🚀 Starting simulated board run, board ID {}", board_id);

    // Stand-in for the demographics the server would provide
    let patient = Patient::new("9", "John Doe", "25", Sex::Male).with_race("White");

    let mut device = SimulatedDevice::new(board_id, count);
    let results = device.read_results(&mut ids)?;

    let now = timestamp::now();
    let message = Assembler::new(&config.order, &mut ids, device.device_id())
        .assemble(&config.sender, &now, Some(patient), results);

    publish(config, &message, output_dir)
}

/// Generate a default configuration file
fn generate_config_file(output_path: PathBuf) -> Result<()> {
    let config = AppConfig::new();
    config.save_to_file(&output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   carepod --config {} simulate", output_path.display());

    Ok(())
}
