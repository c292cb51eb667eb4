use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RowError, TableSchema, Warehouse, WarehouseError, WarehouseResult};
use crate::config::{Config, TableRef, DEFAULT_TIMEOUT_SECS};
use crate::domain::SalesRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TableReference<'a> {
    project_id: &'a str,
    dataset_id: &'a str,
    table_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTableRequest<'a> {
    table_reference: TableReference<'a>,
    schema: &'a TableSchema,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRow<'a> {
    insert_id: String,
    json: &'a SalesRecord,
}

#[derive(Debug, Serialize)]
struct InsertAllRequest<'a> {
    rows: Vec<InsertAllRow<'a>>,
}

/// Response from the `insertAll` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<RowError>,
}

/// HTTP client for the BigQuery REST API
#[derive(Clone)]
pub struct BigQueryClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl BigQueryClient {
    /// Creates a new BigQueryClient with the specified base URL
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        BigQueryClient {
            client,
            base_url,
            access_token: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = Self::with_timeout(
            config.warehouse_api_url.clone(),
            Duration::from_secs(config.warehouse_timeout_secs),
        );

        match &config.warehouse_access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        }
    }

    /// Sends `token` as a bearer credential on every call.
    pub fn with_access_token(mut self, token: String) -> Self {
        self.access_token = Some(token);
        self
    }

    fn tables_url(&self, table: &TableRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables",
            self.base_url.trim_end_matches('/'),
            table.project_id,
            table.dataset_id
        )
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!("{}/{}", self.tables_url(table), table.table_id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn api_error(response: Response) -> WarehouseError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    WarehouseError::Api { status, body }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn get_table(&self, table: &TableRef) -> WarehouseResult<()> {
        let response = self
            .authorize(self.client.get(self.table_url(table)))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(WarehouseError::NotFound(table.to_string())),
            _ => Err(api_error(response).await),
        }
    }

    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> WarehouseResult<()> {
        let body = CreateTableRequest {
            table_reference: TableReference {
                project_id: &table.project_id,
                dataset_id: &table.dataset_id,
                table_id: &table.table_id,
            },
            schema,
        };

        let response = self
            .authorize(self.client.post(self.tables_url(table)))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(WarehouseError::AlreadyExists(table.to_string())),
            _ => Err(api_error(response).await),
        }
    }

    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[SalesRecord],
    ) -> WarehouseResult<Vec<RowError>> {
        let body = InsertAllRequest {
            rows: rows
                .iter()
                .map(|row| InsertAllRow {
                    insert_id: row.order_id.to_string(),
                    json: row,
                })
                .collect(),
        };

        let response = self
            .authorize(
                self.client
                    .post(format!("{}/insertAll", self.table_url(table))),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed = response
            .json::<InsertAllResponse>()
            .await
            .map_err(|e| WarehouseError::InvalidResponse(e.to_string()))?;

        Ok(parsed.insert_errors)
    }
}
