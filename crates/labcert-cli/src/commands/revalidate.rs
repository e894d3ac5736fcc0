//! Revalidate command - re-run validation for a stored report.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use labcert_core::read_document;

use super::{load_config, open_store, service};
use crate::output::{OutputFormat, Verified, format_responses};

/// Arguments for the revalidate command.
#[derive(Args)]
pub struct RevalidateArgs {
    /// Id of the stored report
    #[arg(required = true)]
    report_id: i64,

    /// Document to re-read (text, PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Database holding the registry and stored reports
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Check expiry as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

pub async fn run(args: RevalidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(args.db.as_ref(), &config)?;

    let mut verifier = service(&store, &config);
    if let Some(date) = args.as_of {
        verifier = verifier.with_today(date);
    }

    info!("Re-validating report {} from {}", args.report_id, args.input.display());
    let document = read_document(&args.input, &config.ocr)?;
    let response = verifier.revalidate(args.report_id, &document.bytes, &document.text)?;

    let item = Verified { path: None, response: &response };
    println!("{}", format_responses(&[item], args.format)?);

    Ok(())
}
