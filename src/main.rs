use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, warn};

use urnavi_ingest::config::Settings;
use urnavi_ingest::logging;
use urnavi_ingest::pipeline::Pipeline;
use urnavi_ingest::registry;

#[derive(Parser)]
#[command(name = "urnavi-ingest")]
#[command(about = "UrNavi event map data ingester")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all configured sources and write the event data files
    Run {
        /// Path to the source configuration file
        #[arg(long, default_value = "config/sources.json")]
        config: PathBuf,
        /// Directory the data files are written into
        #[arg(long, default_value = "client/src/data")]
        output_dir: PathBuf,
        /// Specific source ids to run (comma-separated)
        #[arg(long)]
        sources: Option<String>,
        /// Override the per-run fetch concurrency bound
        #[arg(long)]
        concurrency: Option<usize>,
        /// Override the horizon window in months
        #[arg(long)]
        horizon_months: Option<u32>,
    },
    /// List the configured sources
    Sources {
        /// Path to the source configuration file
        #[arg(long, default_value = "config/sources.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            sources,
            concurrency,
            horizon_months,
        } => {
            let mut settings = Settings::from_env();
            if let Some(n) = concurrency {
                settings.concurrency = n.max(1);
            }
            if let Some(n) = horizon_months {
                settings.horizon_months = n;
            }

            // Configuration problems are fatal before any network activity
            let mut descriptors = registry::load_sources(&config)?;
            if let Some(filter) = sources {
                let wanted: Vec<&str> = filter.split(',').map(str::trim).collect();
                for id in &wanted {
                    if !descriptors.iter().any(|s| s.id == *id) {
                        warn!(source = %id, "requested source not in configuration");
                    }
                }
                descriptors.retain(|s| wanted.contains(&s.id.as_str()));
            }

            println!("🔄 Running ingest for {} sources...", descriptors.len());
            let pipeline = Pipeline::new(settings)?;
            match pipeline.run(descriptors, &output_dir).await {
                Ok(summary) => {
                    println!("\n📊 Ingest results:");
                    println!(
                        "   Sources: {} ({} failed)",
                        summary.sources, summary.failed_sources
                    );
                    println!("   Collected: {}", summary.collected);
                    println!("   Unique after dedup: {}", summary.unique);
                    println!(
                        "   Written: {} -> {}",
                        summary.written,
                        summary.output_file.display()
                    );
                    println!(
                        "   Upcoming: {} -> {}",
                        summary.upcoming,
                        summary.horizon_file.display()
                    );
                    Ok(())
                }
                Err(e) => {
                    error!("ingest run failed: {}", e);
                    Err(e.into())
                }
            }
        }
        Commands::Sources { config } => {
            let descriptors = registry::load_sources(&config)?;
            println!("Configured sources ({}):", descriptors.len());
            for source in &descriptors {
                let region = source
                    .region
                    .as_deref()
                    .map(|r| format!(", {r}"))
                    .unwrap_or_default();
                println!(
                    "   {} [{}] {} ({}{})",
                    source.id, source.source_type, source.url, source.country, region
                );
            }
            Ok(())
        }
    }
}
