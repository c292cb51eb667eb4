use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROJECT_ID: &str = "northern-cooler-464505-t9";
pub const DEFAULT_DATASET_ID: &str = "Sales_data";
pub const DEFAULT_TABLE_ID: &str = "sales_data";
pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fully qualified location of the destination table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub table: TableRef,
    pub warehouse_api_url: String,
    pub warehouse_access_token: Option<String>,
    pub warehouse_timeout_secs: u64,
    pub log_request_body: bool,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            table: TableRef {
                project_id: env_or("WAREHOUSE_PROJECT_ID", DEFAULT_PROJECT_ID),
                dataset_id: env_or("WAREHOUSE_DATASET_ID", DEFAULT_DATASET_ID),
                table_id: env_or("WAREHOUSE_TABLE_ID", DEFAULT_TABLE_ID),
            },
            warehouse_api_url: env_or("WAREHOUSE_API_URL", DEFAULT_API_URL),
            warehouse_access_token: env::var("WAREHOUSE_ACCESS_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            warehouse_timeout_secs: env::var("WAREHOUSE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .context("WAREHOUSE_TIMEOUT_SECS must be a whole number of seconds")?,
            log_request_body: env::var("LOG_REQUEST_BODY")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("LOG_REQUEST_BODY must be true or false")?,
            log_json: env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Checks the values that `from_env` cannot reject on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }
        if self.table.project_id.trim().is_empty() {
            anyhow::bail!("WAREHOUSE_PROJECT_ID is empty");
        }
        if self.table.dataset_id.trim().is_empty() {
            anyhow::bail!("WAREHOUSE_DATASET_ID is empty");
        }
        if self.table.table_id.trim().is_empty() {
            anyhow::bail!("WAREHOUSE_TABLE_ID is empty");
        }
        if self.warehouse_timeout_secs == 0 {
            anyhow::bail!("WAREHOUSE_TIMEOUT_SECS must be greater than 0");
        }

        url::Url::parse(&self.warehouse_api_url)
            .context("WAREHOUSE_API_URL is not a valid URL")?;

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
