use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::TableRef;
use crate::warehouse::{Warehouse, WarehouseError};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<String, DependencyStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyStatus {
    Healthy { status: String, latency_ms: u64 },
    Unhealthy { status: String, error: String },
}

#[async_trait]
pub trait DependencyChecker: Send + Sync {
    async fn check(&self) -> DependencyStatus;
}

pub struct WarehouseChecker {
    warehouse: Arc<dyn Warehouse>,
    table: TableRef,
}

impl WarehouseChecker {
    pub fn new(warehouse: Arc<dyn Warehouse>, table: TableRef) -> Self {
        Self { warehouse, table }
    }
}

#[async_trait]
impl DependencyChecker for WarehouseChecker {
    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        // A missing table still proves the warehouse answers; it is created on first insert.
        match self.warehouse.get_table(&self.table).await {
            Ok(()) | Err(WarehouseError::NotFound(_)) => DependencyStatus::Healthy {
                status: "healthy".to_string(),
                latency_ms: start.elapsed().as_millis() as u64,
            },
            Err(e) => DependencyStatus::Unhealthy {
                status: "unhealthy".to_string(),
                error: e.to_string(),
            },
        }
    }
}

pub async fn check_health(warehouse: impl DependencyChecker, start_time: Instant) -> HealthResponse {
    let timeout_duration = Duration::from_secs(5);

    let warehouse_result = timeout(timeout_duration, warehouse.check()).await;

    let mut dependencies = HashMap::new();
    dependencies.insert(
        "warehouse".to_string(),
        warehouse_result.unwrap_or_else(|_| DependencyStatus::Unhealthy {
            status: "unhealthy".to_string(),
            error: "timeout".to_string(),
        }),
    );

    let overall_status = determine_overall_status(&dependencies);

    HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        dependencies,
    }
}

fn determine_overall_status(dependencies: &HashMap<String, DependencyStatus>) -> String {
    let unhealthy = dependencies
        .values()
        .any(|status| matches!(status, DependencyStatus::Unhealthy { .. }));

    if unhealthy {
        "unhealthy".to_string()
    } else {
        "healthy".to_string()
    }
}
