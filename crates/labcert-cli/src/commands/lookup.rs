//! Lookup command - latest verdict recorded for a registration number.

use std::path::PathBuf;

use clap::Args;

use super::{load_config, open_store, service};
use crate::output::{OutputFormat, Verified, format_responses};

/// Arguments for the lookup command.
#[derive(Args)]
pub struct LookupArgs {
    /// Unique registration number (ULR)
    #[arg(required = true)]
    ulr: String,

    /// Database holding the registry and stored reports
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: LookupArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(args.db.as_ref(), &config)?;

    match service(&store, &config).lookup(&args.ulr)? {
        Some(response) => {
            let item = Verified { path: None, response: &response };
            println!("{}", format_responses(&[item], args.format)?);
            Ok(())
        }
        None => anyhow::bail!("No report found for {}", args.ulr.trim()),
    }
}
