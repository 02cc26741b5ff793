use clap::Parser;
use dotenvy::dotenv;
use lacteo_admin::{
    cli::{self, AppContext, Cli},
    config::{app, backend::BackendConfig, database},
    errors::Result,
};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Non-fatal, variables can be set externally. Loaded before parsing so
    // LACTEO_CONFIG from .env is honored.
    dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Command failed: {e:?}");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let backend = BackendConfig::from_env()
        .inspect_err(|e| error!("Backend configuration incomplete: {e}"))?;
    let config = app::load_config_or_default(&cli.config)?;
    debug!("Loaded settings: {:?}", config.settings);

    let db = database::create_connection(&backend)
        .await
        .inspect(|_| info!("Connected to backend."))
        .inspect_err(|e| error!("Failed to connect to backend: {e}"))?;

    if cli.command.ensures_schema() {
        database::create_tables(&db).await?;
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let ctx = AppContext::new(db, config, today);
    cli::run(&ctx, cli.command).await
}
