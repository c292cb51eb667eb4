use clap::Parser;
use sales_ingest::cli::{self, Cli, Commands, TableCommands};
use sales_ingest::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    match cli.command.unwrap_or(Commands::Serve { in_memory: false }) {
        Commands::Serve { in_memory } => cli::handle_serve(&config, in_memory).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Table(TableCommands::Ensure) => cli::handle_table_ensure(&config).await,
    }
}
