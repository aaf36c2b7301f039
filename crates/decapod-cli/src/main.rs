use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use decapod_core::decode::DecodeConfig;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DECAPOD_BUILD_COMMIT"),
    " ",
    env!("DECAPOD_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "decapod")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Layered protocol dissector for packet captures.",
    long_about = None,
    after_help = "Examples:\n  decapod pcap dissect capture.pcapng -o report.json\n  decapod pcap dissect capture.pcap --stdout --pretty"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Dissect a capture file and generate a versioned JSON report.
    #[command(
        after_help = "Examples:\n  decapod pcap dissect capture.pcapng -o report.json\n  decapod pcap dissect capture.pcap --stdout --max-depth 4"
    )]
    Dissect {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if malformed or limit-exceeded packets
        /// are present
        #[arg(long)]
        strict: bool,

        /// Maximum nested-encapsulation depth per packet
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Dissect {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                max_depth,
            } => cmd_pcap_dissect(
                input, report, stdout, pretty, compact, quiet, strict, max_depth,
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_pcap_dissect(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    max_depth: Option<usize>,
) -> Result<(), CliError> {
    validate_input_file(&input)?;

    let meta = fs::metadata(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }

    let mut config = DecodeConfig::default();
    if let Some(depth) = max_depth {
        config.max_encap_depth = depth;
    }

    let rep = decapod_core::dissect_pcap_file(&input, config)
        .context("PCAP/PCAPNG dissection failed")?;
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        return finish(&rep, strict);
    }

    let report = report.expect("report required when not using stdout");
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    finish(&rep, strict)
}

fn finish(rep: &decapod_core::Report, strict: bool) -> Result<(), CliError> {
    if strict && has_suspicious_packets(rep) {
        return Err(CliError::new(
            "suspicious packets detected",
            Some("inspect the statuses section of the report".to_string()),
        ));
    }
    Ok(())
}

fn has_suspicious_packets(rep: &decapod_core::Report) -> bool {
    rep.statuses.malformed > 0 || rep.statuses.encapsulation_limit_exceeded > 0
}

fn serialize_report(
    rep: &decapod_core::Report,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}
