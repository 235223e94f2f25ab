use anyhow::{Context, Result};
use bikehire_core::config::PipelineConfig;
use bikehire_core::{db, distances, journeys, loader, quality, sql, stations, weather};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "London bike-hire ETL and warehouse loader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the transform stages and write the partitioned parquet outputs
    Etl,
    /// Rebuild the warehouse tables from the parquet outputs, then verify them
    Load,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env().context("incomplete pipeline configuration")?;

    match cli.command {
        Command::Etl => run_etl(&config),
        Command::Load => run_load(&config).await,
    }
}

fn run_etl(config: &PipelineConfig) -> Result<()> {
    info!("Processing docking station data");
    stations::run(config)?;

    info!("Processing journey data");
    journeys::run(config)?;

    // Reads the station and journey outputs back from storage, so it must
    // not start before both stages have finished writing.
    info!("Calculating journey distances");
    distances::run(config)?;

    info!("Processing weather data");
    weather::run(config)?;

    info!("All data processed");
    Ok(())
}

async fn run_load(config: &PipelineConfig) -> Result<()> {
    let pool = db::connect(&config.database_url).await?;
    let statements = sql::all_load_statements(&config.copy_source_root, &config.iam_role_arn);

    let mut executor = pool.clone();
    let executed = loader::load_all(&mut executor, &statements).await?;
    info!(executed, "warehouse load complete");

    quality::check_counts(&pool).await?;
    quality::check_duplicates(&pool).await?;

    Ok(())
}
