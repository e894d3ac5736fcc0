//! Registry command - seed and inspect the accreditation registry.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use labcert_core::CertificateRegistry;

use super::{load_config, open_store};

/// Arguments for the registry command.
#[derive(Args)]
pub struct RegistryArgs {
    /// Database holding the registry
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: RegistryCommand,
}

#[derive(Subcommand)]
enum RegistryCommand {
    /// Load registry entries from a JSON array of certificate records
    Load {
        /// JSON file to load
        file: PathBuf,
    },

    /// Show the registry entries for a certificate number
    Show {
        /// Certificate number (e.g., "TC-5589")
        certificate_number: String,
    },
}

pub async fn run(args: RegistryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(args.db.as_ref(), &config)?;

    match args.command {
        RegistryCommand::Load { file } => {
            let json = fs::read_to_string(&file)?;
            let loaded = store.load_registry_json(&json)?;
            println!(
                "{} Loaded {} entries from {} ({} in registry)",
                style("✓").green(),
                loaded,
                file.display(),
                store.certificate_count()?
            );
        }
        RegistryCommand::Show { certificate_number } => {
            let normalized = certificate_number.trim().to_uppercase();
            let records = store.find_by_certificate_number(&normalized)?;
            if records.is_empty() {
                anyhow::bail!("No registry entry for {}", normalized);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
