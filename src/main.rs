use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use adsmart::adgroups::{AdGroupBuilder, RuleBasedClassifier};
use adsmart::config::{ApiCredentials, AppConfig};
use adsmart::core::AdSmartPipeline;
use adsmart::export::{ExportManager, ReportContext};
use adsmart::logging::{init_logging, LoggingConfig};
use adsmart::model::KeywordRecord;
use adsmart::processor::KeywordProcessor;

#[derive(Parser)]
#[command(name = "adsmart")]
#[command(about = "AI-assisted keyword research for search campaigns")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a full research run: scrape, research, score, categorize, export
    Run {
        #[arg(short, long, help = "Configuration file path")]
        config: String,

        #[arg(short, long, help = "Override the output directory")]
        output: Option<PathBuf>,
    },

    /// Process a JSON file of raw keyword records offline (no network calls)
    Process {
        #[arg(help = "Path to a JSON array of keyword records")]
        input: PathBuf,

        #[arg(short, long, help = "Configuration file path")]
        config: String,

        #[arg(short, long, help = "Override the output directory")]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        #[arg(help = "Configuration file path")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging_config = LoggingConfig {
        level: if cli.verbose { "debug" } else { "info" }.to_string(),
        ..LoggingConfig::default()
    };
    init_logging(&logging_config)?;

    info!("AdSmart v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { config, output } => {
            let mut config = AppConfig::load_from_file(&config).await?;
            if let Some(dir) = output {
                config.export.output_directory = dir;
            }

            // Credentials come from the environment here and nowhere else
            let credentials = ApiCredentials::from_env();
            let pipeline = AdSmartPipeline::new(config, credentials)?;
            let outcome = pipeline.run().await?;

            println!("Run {} complete.", outcome.run_id);
            println!(
                "{} keywords across {} ad groups.",
                outcome.summary.total_keywords, outcome.summary.total_ad_groups
            );
            for path in &outcome.written_files {
                println!("  {}", path.display());
            }
        }
        Commands::Process {
            input,
            config,
            output,
        } => {
            let mut config = AppConfig::load_from_file(&config).await?;
            if let Some(dir) = output {
                config.export.output_directory = dir;
            }

            process_offline(&config, &input).await?;
        }
        Commands::Validate { config } => match AppConfig::load_from_file(&config).await {
            Ok(_) => println!("Configuration is valid."),
            Err(e) => {
                eprintln!("Configuration is invalid: {e}");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Offline processing of pre-fetched keyword records. Uses the rule-based
/// classifier so no API keys are needed.
async fn process_offline(config: &AppConfig, input: &PathBuf) -> Result<()> {
    let content = tokio::fs::read_to_string(input).await?;
    let raw: Vec<KeywordRecord> = serde_json::from_str(&content)?;
    info!("Loaded {} raw keyword records from {}", raw.len(), input.display());

    let processor = KeywordProcessor::new(config);
    let builder = AdGroupBuilder::new(config.keyword_settings.conversion_rate);

    let keywords = processor.process(raw);
    let ad_groups = builder
        .build_ad_groups(keywords.clone(), &RuleBasedClassifier)
        .await;
    let summary = builder.generate_summary(&ad_groups);

    let exporter = ExportManager::new(&config.export);
    let files = exporter.generate_files(
        &ad_groups,
        &summary,
        &keywords,
        &ReportContext {
            mode: config.keyword_settings.mode.clone(),
            min_search_volume: config.keyword_settings.min_search_volume,
        },
    )?;
    let written = exporter.write_all(&files).await?;

    println!(
        "{} keywords across {} ad groups.",
        summary.total_keywords, summary.total_ad_groups
    );
    for path in written {
        println!("  {}", path.display());
    }

    Ok(())
}
