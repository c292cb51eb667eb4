//! Record sale use case.
//! Derives the stored row for a validated request and writes it to the warehouse.

use chrono::Utc;
use std::sync::Arc;

use crate::config::TableRef;
use crate::domain::{SalesRecord, TransactionRequest};
use crate::error::AppError;
use crate::warehouse::{ensure_table, Warehouse, WarehouseError};

/// Use case for storing one sale per request.
pub struct RecordSale {
    warehouse: Arc<dyn Warehouse>,
    table: TableRef,
}

impl RecordSale {
    pub fn new(warehouse: Arc<dyn Warehouse>, table: TableRef) -> Self {
        Self { warehouse, table }
    }

    /// Returns the row that was stored. Nothing is retried.
    pub async fn execute(&self, request: TransactionRequest) -> Result<SalesRecord, AppError> {
        let record = SalesRecord::new(request, Utc::now());

        ensure_table(self.warehouse.as_ref(), &self.table)
            .await
            .map_err(internal)?;

        let errors = self
            .warehouse
            .insert_rows(&self.table, std::slice::from_ref(&record))
            .await
            .map_err(internal)?;

        if !errors.is_empty() {
            let details =
                serde_json::to_value(&errors).map_err(|e| AppError::Internal(e.to_string()))?;
            return Err(AppError::InsertFailed(details));
        }

        Ok(record)
    }
}

fn internal(error: WarehouseError) -> AppError {
    AppError::Internal(error.to_string())
}
