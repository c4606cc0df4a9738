use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kadm5_tools::{
    decode_record, format_decode_pretty, inspect_record, read_input, InspectReport, RecordKind,
};
use marshal::{EntryMask, MarshalLimits, MaskField};
use storage::Limits;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kadm5-tools",
    version,
    about = "kadm5 record inspection and decoding tools"
)]
struct Cli {
    /// Log decoder activity at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect record layout: mask bits and field offsets.
    Inspect {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decode a record into structured output.
    Decode {
        #[command(flatten)]
        input: InputArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to the record bytes.
    path: PathBuf,
    /// Kind of record in the file.
    #[arg(long, value_enum, default_value_t = KindArg::Entry)]
    kind: KindArg,
    /// The file holds a hex dump instead of raw bytes.
    #[arg(long)]
    hex: bool,
    /// Maximum number of key records per entry.
    #[arg(long)]
    max_keys: Option<usize>,
    /// Maximum number of extension records per entry.
    #[arg(long)]
    max_tl_data: Option<usize>,
    /// Maximum length of a single data or string value.
    #[arg(long)]
    max_data_len: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Entry,
    Params,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

impl InputArgs {
    fn kind(&self) -> RecordKind {
        match self.kind {
            KindArg::Entry => RecordKind::Entry,
            KindArg::Params => RecordKind::Params,
        }
    }

    fn limits(&self) -> MarshalLimits {
        let mut limits = MarshalLimits::default();
        if let Some(max_keys) = self.max_keys {
            limits.max_keys = max_keys;
        }
        if let Some(max_tl_data) = self.max_tl_data {
            limits.max_tl_data = max_tl_data;
        }
        limits
    }

    fn storage_limits(&self) -> Limits {
        let mut limits = Limits::default();
        if let Some(max_data_len) = self.max_data_len {
            limits.max_data_len = max_data_len;
        }
        limits
    }

    fn load(&self) -> Result<Vec<u8>> {
        let contents =
            fs::read(&self.path).with_context(|| format!("read record {}", self.path.display()))?;
        read_input(&contents, self.hex)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Inspect { input } => {
            let bytes = input.load()?;
            let report = inspect_record(
                &bytes,
                input.kind(),
                &input.storage_limits(),
                &input.limits(),
            )?;
            print_inspect_report(&report);
        }
        Command::Decode { input, format } => {
            let bytes = input.load()?;
            let record = decode_record(
                &bytes,
                input.kind(),
                &input.storage_limits(),
                &input.limits(),
            )?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&record).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&record));
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_inspect_report(report: &InspectReport) {
    let kind = match report.kind {
        RecordKind::Entry => "entry",
        RecordKind::Params => "params",
    };
    println!(
        "{kind}: mask 0x{:08x}, {} bytes",
        report.mask, report.total_bytes
    );
    if report.kind == RecordKind::Entry {
        let known = EntryMask::from_raw(report.mask)
            .fields()
            .fold(0, |acc, field| acc | field.bit());
        let unknown = report.mask & !known & !EntryMask::POLICY_CLR;
        if unknown != 0 {
            println!("  unknown mask bits: 0x{unknown:08x}");
        }
    }
    println!("fields:");
    for field in &report.fields {
        println!(
            "  {:<20} offset {:>5} ({} bytes)",
            field.name, field.offset, field.byte_len
        );
    }
    if report.trailing_bytes > 0 {
        println!("trailing: {} bytes", report.trailing_bytes);
    }
}
