//! Command-line entry point: compress a recorded raw input log into a
//! semantic event stream.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use open_screentrace::{
    CompressionSession, CompressorConfig, EventCompressor, JsonlFileSource, JsonlWriter,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "screentrace",
    about = "Compress raw screen-activity input logs into semantic event streams",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a raw event log (newline-delimited JSON)
    Compress(CompressArgs),
}

#[derive(Args)]
struct CompressArgs {
    /// Raw input events, newline-delimited JSON
    #[arg(short, long)]
    input: PathBuf,

    /// Destination for the compressed event stream
    #[arg(short, long)]
    output: PathBuf,

    /// Threshold configuration (JSON); built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    open_screentrace::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compress(args) => compress(args).await,
    }
}

async fn compress(args: CompressArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => CompressorConfig::default(),
    };

    let writer = JsonlWriter::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let session = CompressionSession::new(EventCompressor::new(config, writer));
    let source = Box::new(JsonlFileSource::new(&args.input));

    let (writer, summary) = session.run(vec![source]).await?;
    writer.finish()?;

    println!(
        "Compressed {} raw events into {} records ({} malformed lines skipped)",
        summary.events_in, summary.events_out, summary.lines_skipped
    );
    println!("Compressed events written to {}", args.output.display());
    Ok(())
}
