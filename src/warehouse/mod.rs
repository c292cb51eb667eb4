//! Destination warehouse port and its adapters.

pub mod bigquery;
pub mod memory;
pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TableRef;
use crate::domain::SalesRecord;

pub use bigquery::BigQueryClient;
pub use memory::MemoryWarehouse;
pub use schema::{sales_schema, FieldType, SchemaField, TableSchema};

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Table not found: {0}")]
    NotFound(String),
    #[error("Table already exists: {0}")]
    AlreadyExists(String),
    #[error("Warehouse returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response from warehouse: {0}")]
    InvalidResponse(String),
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// A row-level rejection reported by the warehouse for an insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub index: u32,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Management and streaming-insert operations on the analytical warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Fails with [`WarehouseError::NotFound`] when the table does not exist.
    async fn get_table(&self, table: &TableRef) -> WarehouseResult<()>;

    /// Fails with [`WarehouseError::AlreadyExists`] when the table is already there.
    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()>;

    /// Returns the rows the warehouse rejected; empty when every row was stored.
    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[SalesRecord],
    ) -> WarehouseResult<Vec<RowError>>;
}

/// Creates the sales table when it is missing.
///
/// Lookup and creation are separate calls, so concurrent first requests may
/// both try to create it; losing that race is not an error.
pub async fn ensure_table(warehouse: &dyn Warehouse, table: &TableRef) -> WarehouseResult<()> {
    match warehouse.get_table(table).await {
        Ok(()) => Ok(()),
        Err(WarehouseError::NotFound(_)) => {
            tracing::info!(table = %table, "Table not found. Creating it...");

            match warehouse.create_table(table, &sales_schema()).await {
                Ok(()) => {
                    tracing::info!(table = %table, "Table created");
                    Ok(())
                }
                Err(WarehouseError::AlreadyExists(_)) => {
                    tracing::info!(table = %table, "Table was created concurrently");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}
