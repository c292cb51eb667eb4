//! In-process warehouse for local runs and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{RowError, TableSchema, Warehouse, WarehouseError, WarehouseResult};
use crate::config::TableRef;
use crate::domain::SalesRecord;

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    rows: Vec<SalesRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    create_calls: usize,
    unavailable: Option<String>,
    hide_tables: bool,
    rejected_rows: Vec<RowError>,
}

impl MemoryState {
    fn check_available(&self) -> WarehouseResult<()> {
        match &self.unavailable {
            Some(reason) => Err(WarehouseError::Api {
                status: 503,
                body: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    state: RwLock<MemoryState>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows stored in `table`, in insertion order.
    pub async fn rows(&self, table: &TableRef) -> Vec<SalesRecord> {
        self.state
            .read()
            .await
            .tables
            .get(&table.to_string())
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub async fn schema(&self, table: &TableRef) -> Option<TableSchema> {
        self.state
            .read()
            .await
            .tables
            .get(&table.to_string())
            .map(|t| t.schema.clone())
    }

    pub async fn create_calls(&self) -> usize {
        self.state.read().await.create_calls
    }

    /// Makes every call fail as if the service were unreachable.
    pub async fn set_unavailable(&self, reason: Option<&str>) {
        self.state.write().await.unavailable = reason.map(str::to_string);
    }

    /// Makes lookups report missing tables even when they exist.
    pub async fn hide_existing_tables(&self, hide: bool) {
        self.state.write().await.hide_tables = hide;
    }

    /// Makes subsequent inserts report `errors` instead of storing rows.
    pub async fn reject_inserts(&self, errors: Vec<RowError>) {
        self.state.write().await.rejected_rows = errors;
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn get_table(&self, table: &TableRef) -> WarehouseResult<()> {
        let state = self.state.read().await;
        state.check_available()?;

        let key = table.to_string();
        if state.hide_tables || !state.tables.contains_key(&key) {
            return Err(WarehouseError::NotFound(key));
        }

        Ok(())
    }

    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        state.create_calls += 1;

        let key = table.to_string();
        if state.tables.contains_key(&key) {
            return Err(WarehouseError::AlreadyExists(key));
        }

        state.tables.insert(
            key,
            MemoryTable {
                schema: schema.clone(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[SalesRecord],
    ) -> WarehouseResult<Vec<RowError>> {
        let mut state = self.state.write().await;
        state.check_available()?;

        if !state.rejected_rows.is_empty() {
            return Ok(state.rejected_rows.clone());
        }

        let key = table.to_string();
        let stored = state
            .tables
            .get_mut(&key)
            .ok_or(WarehouseError::NotFound(key))?;
        stored.rows.extend_from_slice(rows);

        Ok(Vec::new())
    }
}
