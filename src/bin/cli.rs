//! Flavor Scout CLI
//!
//! Local entry point for scraping, report generation and offline checks of
//! post text.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use flavor_scout::{
    browser::SnapshotFactory,
    error::{AppError, Result},
    models::{Config, FlavorReport, LocationRegistry},
    pipeline,
    services::{FlavorExtractor, RecencyClassifier},
};

/// Flavor Scout - daily flavor finder for custard shops
#[derive(Parser, Debug)]
#[command(
    name = "flavor-scout",
    version,
    about = "Finds today's flavor announcement on custard shops' social pages"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the location registry
    #[arg(short, long, default_value = "locations.toml")]
    locations: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one brand and print its records as JSON
    Scrape {
        /// Brand key from the location registry
        brand: String,

        /// Replay a saved page instead of launching Chrome
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Scrape several brands and write the combined report
    Generate {
        /// Report destination
        #[arg(short, long, default_value = "flavors.json")]
        output: PathBuf,

        /// Replay a saved page instead of launching Chrome
        #[arg(long)]
        html: Option<PathBuf>,

        /// Brand keys (default: every brand in the registry)
        brands: Vec<String>,
    },

    /// Extract a flavor from post text (file or stdin)
    Extract { file: Option<PathBuf> },

    /// Classify the age of a post from its text (file or stdin)
    Classify { file: Option<PathBuf> },

    /// Validate configuration and location registry
    Validate,
}

/// Initialize logging with the given default level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Read a whole file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Run the batch runner against a saved page or live Chrome.
async fn scrape_brands(
    html: Option<&Path>,
    config: Arc<Config>,
    registry: &LocationRegistry,
    brands: &[String],
) -> Result<FlavorReport> {
    if let Some(path) = html {
        log::info!("Replaying saved page {}", path.display());
        let factory = SnapshotFactory::from_file(path)?;
        return Ok(pipeline::run_generate(factory, config, registry, brands).await);
    }

    #[cfg(feature = "chrome")]
    {
        let factory = flavor_scout::browser::ChromeLauncher::new(config.browser.clone());
        Ok(pipeline::run_generate(factory, config, registry, brands).await)
    }

    #[cfg(not(feature = "chrome"))]
    {
        let _ = (config, registry, brands);
        Err(AppError::config(
            "built without the `chrome` feature; pass --html to replay a saved page",
        ))
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    });
    if let Some(e) = config_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }

    let config = Arc::new(config);

    match cli.command {
        Command::Scrape { brand, html } => {
            let registry = LocationRegistry::load_or_default(&cli.locations);
            let report =
                scrape_brands(html.as_deref(), Arc::clone(&config), &registry, &[brand]).await?;
            println!("{}", serde_json::to_string_pretty(&report.flavors)?);
        }

        Command::Generate {
            output,
            html,
            brands,
        } => {
            let registry = LocationRegistry::load_or_default(&cli.locations);
            let brands = if brands.is_empty() {
                registry.brands().map(str::to_string).collect()
            } else {
                brands
            };
            if brands.is_empty() {
                return Err(AppError::config(format!(
                    "No brands to scrape; is {} empty?",
                    cli.locations.display()
                )));
            }

            let report =
                scrape_brands(html.as_deref(), Arc::clone(&config), &registry, &brands).await?;
            pipeline::write_report(&output, &report).await?;
        }

        Command::Extract { file } => {
            let text = read_input(file.as_deref())?;
            let found = FlavorExtractor::new().extract(&text);
            println!("{}", serde_json::to_string_pretty(&found)?);
        }

        Command::Classify { file } => {
            let text = read_input(file.as_deref())?;
            let recency = RecencyClassifier::new(config.collector.header_chars).classify(&text);
            println!("{:?} (from today: {})", recency, recency.is_today());
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let registry = LocationRegistry::load(&cli.locations)?;
            if let Err(e) = registry.validate() {
                log::error!("Registry validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Registry OK ({} brands)", registry.brands().count());

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
