//! CLI application for laboratory accreditation certificate verification.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, extract, lookup, registry, revalidate, verify};

/// Laboratory certificate verification - validate accreditation certificates against the registry
#[derive(Parser)]
#[command(name = "labcert")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify one or more certificate documents
    Verify(verify::VerifyArgs),

    /// Show the fields extracted from a document without validating
    Extract(extract::ExtractArgs),

    /// Re-run validation for a stored report
    Revalidate(revalidate::RevalidateArgs),

    /// Show the latest verdict for a registration number
    Lookup(lookup::LookupArgs),

    /// Manage the accreditation registry
    Registry(registry::RegistryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Verify(args) => verify::run(args, config_path).await,
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Revalidate(args) => revalidate::run(args, config_path).await,
        Commands::Lookup(args) => lookup::run(args, config_path).await,
        Commands::Registry(args) => registry::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
