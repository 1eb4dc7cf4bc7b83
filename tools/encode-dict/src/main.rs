//! Encodes a plain-text dictionary (`word pos1,pos2,... count`-per-line) into
//! the encrypted binary format `knowledge::KnowledgePaths::system_dict`
//! expects. No training logic lives here, only the codec.

use anyhow::{Context, Result};
use clap::Parser;
use libchinese_cma::dict::encode_system_dict;
use std::path::PathBuf;

/// Encode a plain-text system dictionary into the analyzer's binary format.
#[derive(Parser, Debug)]
#[command(name = "encode-dict", author, version, about)]
struct Cli {
    /// Plain-text source, one `word pos1,pos2 count` entry per line.
    text_path: PathBuf,

    /// Destination for the encrypted binary dictionary.
    bin_path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let count = encode_system_dict(&cli.text_path, &cli.bin_path).with_context(|| {
        format!(
            "encoding {} into {}",
            cli.text_path.display(),
            cli.bin_path.display()
        )
    })?;
    tracing::info!(entries = count, path = %cli.bin_path.display(), "wrote system dictionary");
    println!("wrote {} entries to {}", count, cli.bin_path.display());
    Ok(())
}
