//! Extract command - show the fields found in a document without validating.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use labcert_core::{CertificateParser, ExtractedFields, FieldParser, read_document};

use super::{load_config, open_store, service};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (text, PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Match laboratory names against the registry in this database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExtractFormat,

    /// Also print the normalized text the patterns ran on
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ExtractFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    info!("Extracting fields from {}", args.input.display());
    let document = read_document(&args.input, &config.ocr)?;

    let result = match &args.db {
        Some(db) => {
            let store = open_store(Some(db), &config)?;
            service(&store, &config).extract(&document.text)
        }
        None => CertificateParser::from_config(&config.extraction).parse(&document.text),
    };

    match args.format {
        ExtractFormat::Json => println!("{}", serde_json::to_string_pretty(&result.fields)?),
        ExtractFormat::Text => print!("{}", format_fields(&result.fields)),
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    if args.show_text {
        eprintln!();
        eprintln!("{}", style("Normalized text:").blue());
        eprintln!("{}", result.normalized_text);
    }

    Ok(())
}

fn format_fields(fields: &ExtractedFields) -> String {
    let value = |v: Option<&str>| v.unwrap_or("-").to_string();

    let mut output = String::new();
    output.push_str(&format!("Certificate number: {}\n", value(fields.certificate_number.as_deref())));
    output.push_str(&format!("Registration (ULR): {}\n", value(fields.unique_registration_number.as_deref())));
    output.push_str(&format!("Issue date:         {}\n", value(fields.issue_date_text.as_deref())));
    output.push_str(&format!(
        "Category:           {}\n",
        fields.category.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    if let Some(name) = &fields.laboratory_name {
        output.push_str(&format!("Laboratory:         {}\n", name));
    }
    output
}
