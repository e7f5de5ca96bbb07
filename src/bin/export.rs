//! MEDS Schema Export CLI
//!
//! Writes the patient, label and dataset metadata schemas to a directory.

use std::path::PathBuf;

use clap::Parser;
use meds_schema::config::parse_data_type;
use meds_schema::{MedsConfig, OutputFormat, SchemaRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meds-export")]
#[command(about = "Export MEDS schemas as JSON")]
struct Cli {
    /// Output directory (defaults to export.output_dir from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Arrow type of the per-measurement metadata column, e.g. "Utf8"
    #[arg(short, long)]
    per_event_metadata: Option<String>,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Skip the checksums.sha256 manifest
    #[arg(long)]
    no_checksums: bool,

    /// List what would be exported without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = MedsConfig::load_from(cli.config.as_deref())?;

    if let Some(ref metadata_type) = cli.per_event_metadata {
        config.patient.per_event_metadata = parse_data_type(metadata_type)?;
    }
    if cli.compact {
        config.export.output_format = OutputFormat::Compact;
    }
    if cli.no_checksums {
        config.export.include_checksums = false;
    }
    let output = cli.output.unwrap_or_else(|| config.export.output_dir.clone());

    println!("📦 MEDS Schema Export");
    println!("  Metadata type: {}", config.patient.per_event_metadata);
    println!("  Output: {:?}", output);
    println!();

    let registry = SchemaRegistry::from_config(&config);

    if cli.dry_run {
        for entry in registry.entries() {
            println!("  - {} ({})", entry.filename(), entry.checksum);
        }
        println!();
        println!("🔍 Dry run - nothing written");
        return Ok(());
    }

    let written = registry.export_to(
        &output,
        config.export.output_format,
        config.export.include_checksums,
    )?;

    for path in &written {
        println!("  ✅ {}", path.display());
    }
    println!();
    println!("✅ Exported {} files", written.len());
    Ok(())
}
