use clap::{Parser, Subcommand};
use sales_etl::infra::csv_extractor::CsvFileExtractor;
use sales_etl::infra::sqlite_loader::SqliteLoader;
use sales_etl::{Config, EtlOrchestrator, RunStatus};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

#[derive(Parser)]
#[command(name = "sales_etl")]
#[command(about = "Batch ETL pipeline for sales CSV exports")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extract-transform-load pipeline
    Run {
        /// Path to the run configuration file
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    sales_etl::logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = Config::load(&config)?;

            let extractor = Arc::new(CsvFileExtractor::new());
            let loader = Arc::new(SqliteLoader::new(
                config.target.database.clone(),
                Duration::from_secs(config.target.clear_timeout_secs),
                Duration::from_secs(config.target.bulk_timeout_secs),
            )?);
            let orchestrator = EtlOrchestrator::new(extractor, loader, config);

            println!("🚚 Running sales ETL pipeline...");
            match orchestrator.run().await {
                Ok(summary) => {
                    println!("\n📊 Run summary:");
                    for (name, counts) in [
                        ("customers", &summary.customers),
                        ("products", &summary.products),
                        ("orders", &summary.orders),
                        ("order_details", &summary.order_details),
                    ] {
                        println!(
                            "   {name}: {} extracted, {} invalid, {} duplicates, {} loaded",
                            counts.extracted,
                            counts.invalid_dropped,
                            counts.duplicates_removed,
                            counts.loaded
                        );
                    }
                    match summary.status {
                        RunStatus::Succeeded => println!("✅ ETL run completed successfully"),
                        RunStatus::SucceededWithWarning => {
                            println!("⚠️  ETL run completed with referential integrity warnings")
                        }
                    }
                }
                Err(e) => {
                    error!("ETL run failed: {}", e);
                    println!("❌ ETL run failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
