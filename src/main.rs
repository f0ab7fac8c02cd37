use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use locstat::{PipelineConfig, count_archive_with_config, list_entries, scan_archive_with_config};

/// Line-of-code statistics for zip archives.
#[derive(Debug, Parser)]
#[command(name = "locstat", version, about)]
struct Cli {
    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    /// Classify and count on the calling thread only.
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the text file extensions found in an archive.
    Scan { archive: PathBuf },
    /// Count lines for the selected extensions.
    Count {
        archive: PathBuf,
        /// Extension to include; repeat or comma-separate for several.
        #[arg(short, long = "ext", required = true, value_delimiter = ',')]
        extensions: Vec<String>,
    },
    /// Show the entries stored in an archive without extracting it.
    List { archive: PathBuf },
}

#[derive(Serialize)]
struct ScanOutput {
    extensions: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut cfg = PipelineConfig::default();
    cfg.count.parallel = !cli.sequential;

    let rendered = match &cli.command {
        Command::Scan { archive } => {
            let bytes = read_archive(archive)?;
            let extensions = scan_archive_with_config(&bytes, &cfg)?;
            render(&ScanOutput { extensions }, cli.pretty)?
        }
        Command::Count {
            archive,
            extensions,
        } => {
            let bytes = read_archive(archive)?;
            let result = count_archive_with_config(&bytes, extensions, &cfg)?;
            render(&result, cli.pretty)?
        }
        Command::List { archive } => {
            let bytes = read_archive(archive)?;
            render(&list_entries(&bytes, &cfg.extract)?, cli.pretty)?
        }
    };

    println!("{rendered}");
    Ok(())
}

// Serialized directly so ranked maps keep their order.
fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn read_archive(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read archive {}", path.display()))
}
