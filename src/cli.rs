use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::warehouse::{ensure_table, BigQueryClient, MemoryWarehouse, Warehouse};
use crate::{create_app, AppState};

#[derive(Parser)]
#[command(name = "sales-ingest")]
#[command(about = "Sales Ingest - stores sales transactions in the analytics warehouse", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Keep rows in process memory instead of the warehouse
        #[arg(long)]
        in_memory: bool,
    },

    /// Configuration validation
    Config,

    /// Destination table management commands
    #[command(subcommand)]
    Table(TableCommands),
}

#[derive(Subcommand)]
pub enum TableCommands {
    /// Create the destination table if it does not exist
    Ensure,
}

pub async fn handle_serve(config: &Config, in_memory: bool) -> anyhow::Result<()> {
    config.validate()?;

    let warehouse: Arc<dyn Warehouse> = if in_memory {
        tracing::warn!("Using in-memory warehouse; rows are lost on exit");
        Arc::new(MemoryWarehouse::new())
    } else {
        tracing::info!(
            "Warehouse client initialized with URL: {}",
            config.warehouse_api_url
        );
        Arc::new(BigQueryClient::from_config(config))
    };

    let app = create_app(AppState::new(config, warehouse));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Port: {}", config.server_port);
    println!("  Destination table: {}", config.table);
    println!("  Warehouse API URL: {}", config.warehouse_api_url);
    println!(
        "  Access token: {}",
        config
            .warehouse_access_token
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  Timeout: {}s", config.warehouse_timeout_secs);
    println!("  Log request body: {}", config.log_request_body);

    config.validate()?;

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

pub async fn handle_table_ensure(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    let client = BigQueryClient::from_config(config);
    ensure_table(&client, &config.table).await?;

    println!("✓ Table {} is ready", config.table);

    Ok(())
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    format!("{}****", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ya29.a0AfH6SMBxyz"), "ya29****");
        assert_eq!(mask_token("short"), "****");
    }

    #[test]
    fn test_parse_default_command() {
        let cli = Cli::try_parse_from(["sales-ingest"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_serve_in_memory() {
        let cli = Cli::try_parse_from(["sales-ingest", "serve", "--in-memory"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { in_memory: true })));
    }

    #[test]
    fn test_parse_table_ensure() {
        let cli = Cli::try_parse_from(["sales-ingest", "table", "ensure"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Table(TableCommands::Ensure))));
    }
}
