//! s7trace - S7COMM capture labelling tool
//!
//! Reads an S7COMM capture and labels it according to a PLC mapping file,
//! either by annotating a copy of the capture or by exporting a CSV table.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use s7trace::capture::tshark::FrameStream;
use s7trace::output::{Annotator, Tabulator};
use s7trace::{config, AddressIndex, CorrelationEngine};

#[derive(Parser)]
#[command(name = "s7trace")]
#[command(
    about = "Reads an S7COMM capture and labels it according to a PLC mapping file"
)]
struct Cli {
    /// Capture file to read
    #[arg(short, long)]
    file: PathBuf,

    /// PLC mapping configuration file (YAML)
    #[arg(short, long)]
    configuration: PathBuf,

    #[command(flatten)]
    mode: Mode,

    /// Output path (defaults to output.csv / output.pcapng)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Mode {
    /// Generate a CSV table of the S7COMM communication
    #[arg(short, long)]
    table: bool,

    /// Attach variable-name comments to a copy of the capture file
    #[arg(short, long)]
    pcap: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.file.exists() {
        bail!("capture file not found: {}", cli.file.display());
    }

    let document = config::load(&cli.configuration)
        .with_context(|| format!("loading {}", cli.configuration.display()))?;
    let index = AddressIndex::build(&document)?;
    info!(
        "mapping loaded: {} PLCs, {} variables",
        index.plc_count(),
        index.variable_count()
    );

    let mut stream = FrameStream::open(&cli.file)?;
    let mut engine = CorrelationEngine::new(&index);

    if cli.mode.table {
        let output = cli.output.unwrap_or_else(|| PathBuf::from("output.csv"));
        let mut table = Tabulator::new();
        for frame in &mut stream {
            let record = engine.process(&frame);
            table.push(&record);
        }
        table.write_csv(&output)?;
    } else {
        let output = cli.output.unwrap_or_else(|| PathBuf::from("output.pcapng"));
        let annotator = Annotator::new(&cli.file, &output)?;
        for frame in &mut stream {
            let record = engine.process(&frame);
            annotator.render(&record)?;
        }
        info!("annotated capture written to {}", annotator.path().display());
    }

    let skipped = stream.finish()?;
    if skipped > 0 {
        warn!("{skipped} frames could not be structured and were skipped");
    }

    let stats = engine.stats();
    info!(
        "{} frames processed, {} unresolved, {} decode failures, {} requests left pending",
        stats.frames, stats.unresolved, stats.decode_failures, engine.pending_count()
    );

    Ok(())
}
