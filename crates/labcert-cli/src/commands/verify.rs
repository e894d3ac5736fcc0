//! Verify command - validate one or more certificate documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use labcert_core::{
    CertificateRegistry, LabcertConfig, ReportStore, VerificationResponse, VerificationService, read_document,
};

use super::{load_config, open_store, service};
use crate::output::{OutputFormat, Verified, format_responses};

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Input files or glob patterns (text, PDF or image)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Database holding the registry and stored reports
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Check expiry as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Continue with the remaining files when one fails
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: VerifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    let store = open_store(args.db.as_ref(), &config)?;
    let mut verifier = service(&store, &config);
    if let Some(date) = args.as_of {
        verifier = verifier.with_today(date);
    }

    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut verified = Vec::with_capacity(files.len());
    let mut failed = Vec::new();

    for path in &files {
        match verify_file(path, &config, &verifier) {
            Ok(response) => verified.push((path, response)),
            Err(e) => {
                if args.continue_on_error {
                    warn!("Failed to process {}: {:#}", path.display(), e);
                    failed.push(path);
                } else {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    pb.abandon();
                    anyhow::bail!("Processing error: could not verify {}", path.display());
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let items: Vec<Verified<'_>> = verified
        .iter()
        .map(|(path, response)| Verified {
            path: (files.len() > 1).then_some(path.as_path()),
            response,
        })
        .collect();

    if !items.is_empty() {
        let output = format_responses(&items, args.format)?;
        if let Some(output_path) = &args.output {
            fs::write(output_path, &output)?;
            eprintln!("{} Output written to {}", style("✓").green(), output_path.display());
        } else {
            println!("{}", output);
        }
    }

    debug!("Verified {} files in {:?}", verified.len(), start.elapsed());

    if !failed.is_empty() {
        eprintln!("{}", style("Failed files:").red());
        for path in &failed {
            eprintln!("  - {}", path.display());
        }
        anyhow::bail!("Processing error: {} of {} files could not be verified", failed.len(), files.len());
    }

    Ok(())
}

fn verify_file<R, S>(
    path: &Path,
    config: &LabcertConfig,
    verifier: &VerificationService<R, S>,
) -> anyhow::Result<VerificationResponse>
where
    R: CertificateRegistry,
    S: ReportStore,
{
    info!("Verifying {}", path.display());
    let document = read_document(path, &config.ocr)?;
    let response = verifier.verify_document(&document.bytes, &document.text)?;
    info!("{}: {}", path.display(), response.status);
    Ok(response)
}

/// Expand glob patterns; plain paths that match nothing are kept so the
/// missing file is reported by name.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let matches: Vec<PathBuf> = glob(input)?.filter_map(|r| r.ok()).filter(|p| p.is_file()).collect();
        if matches.is_empty() {
            files.push(PathBuf::from(input));
        } else {
            files.extend(matches);
        }
    }

    if files.is_empty() {
        anyhow::bail!("No input files given");
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_glob_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("c.pdf"), "c").unwrap();

        let pattern = dir.path().join("*.txt").display().to_string();
        let files = expand_inputs(&[pattern]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().is_some_and(|e| e == "txt")));
    }

    #[test]
    fn test_unmatched_path_is_kept() {
        let files = expand_inputs(&["missing.txt".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("missing.txt")]);
    }
}
