use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_engine::domain::ConsistencyService;
use habit_engine::storage::CsvConnection;

#[derive(Parser, Debug)]
#[command(name = "habit-report", version, about = "Print consistency reports for every goal as JSON")]
struct Cli {
    /// Data directory. Defaults to $HABIT_ENGINE_DATA_DIR, then the documents folder.
    data_dir: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let connection = match cli.data_dir {
        Some(dir) => CsvConnection::new(dir)?,
        None => CsvConnection::new_default()?,
    };
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    info!("Reading data from {}", connection.base_directory().display());
    let service = ConsistencyService::new(Arc::new(connection));
    let reports = service.all_goal_reports(today).await?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
