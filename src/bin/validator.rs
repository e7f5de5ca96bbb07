//! MEDS Validator CLI
//!
//! Validates dataset metadata documents and exported schema checksums.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meds_schema::{verify_export, DatasetMetadata, MedsConfig, SchemaError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meds-validate")]
#[command(about = "Validate MEDS dataset metadata and exported schemas")]
struct Cli {
    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate metadata.json in a dataset folder
    Metadata {
        /// Dataset root (defaults to dataset.root from config)
        dataset: Option<PathBuf>,
    },

    /// Verify the checksums of an exported schema directory
    Checksums {
        /// Export directory (defaults to export.output_dir from config)
        dir: Option<PathBuf>,
    },
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
    let config = MedsConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Metadata { dataset } => {
            let root = dataset
                .or(config.dataset.root)
                .ok_or("No dataset given and dataset.root is not configured")?;

            println!("🔍 Validating {:?}", DatasetMetadata::path_in(&root));

            match DatasetMetadata::load(&root) {
                Ok(metadata) => {
                    println!(
                        "✅ {} {}",
                        metadata.dataset_name.as_deref().unwrap_or("(unnamed dataset)"),
                        metadata.dataset_version.as_deref().unwrap_or("")
                    );
                    let codes = metadata.code_metadata.as_ref().map_or(0, |c| c.len());
                    println!("   {} code descriptions", codes);
                    Ok(())
                }
                Err(SchemaError::Validation { errors, .. }) => {
                    println!("❌ metadata.json is invalid:");
                    for error in &errors {
                        println!("   └─ {}", error);
                    }
                    std::process::exit(1);
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Checksums { dir } => {
            let dir = dir.unwrap_or(config.export.output_dir);
            println!("🔍 Verifying checksums in {:?}", dir);

            if verify_export(&dir)? {
                println!("✅ All checksums valid");
                Ok(())
            } else {
                println!("❌ Checksum validation FAILED");
                std::process::exit(1);
            }
        }
    }
}
