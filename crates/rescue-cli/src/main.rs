//! CLI application for disaster-report intake.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, edit, extract, normalize, ocr, phone, show};

/// Rescue intake - turn pasted messages and screenshots into structured reports
#[derive(Parser)]
#[command(name = "rescue")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean up pasted or typed text
    Normalize(normalize::NormalizeArgs),

    /// Format Thai phone numbers
    Phone(phone::PhoneArgs),

    /// Recognize text in screenshots
    Ocr(ocr::OcrArgs),

    /// Extract reports from text and images and store them
    Extract(extract::ExtractArgs),

    /// Edit a stored report
    Edit(edit::EditArgs),

    /// Show a stored report
    Show(show::ShowArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

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
        Commands::Normalize(args) => normalize::run(args),
        Commands::Phone(args) => phone::run(args),
        Commands::Ocr(args) => ocr::run(args, config_path).await,
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Edit(args) => edit::run(args, config_path).await,
        Commands::Show(args) => show::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path),
    }
}
