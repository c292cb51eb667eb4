use mockito::{Matcher, Server};
use sales_ingest::config::TableRef;
use sales_ingest::domain::{SalesRecord, TransactionRequest};
use sales_ingest::warehouse::{
    ensure_table, sales_schema, BigQueryClient, Warehouse, WarehouseError,
};
use serde_json::json;

const TABLE_PATH: &str = "/projects/proj/datasets/Sales_data/tables/sales_data";
const TABLES_PATH: &str = "/projects/proj/datasets/Sales_data/tables";

fn table() -> TableRef {
    TableRef::new("proj", "Sales_data", "sales_data")
}

fn record() -> SalesRecord {
    SalesRecord::new(
        TransactionRequest {
            transaction_id: "T1".to_string(),
            customer_id: "C1".to_string(),
            items: vec![json!({ "sku": "A" })],
            total_amount: 100.0,
            payment_method: "card".to_string(),
            timestamp: None,
        },
        chrono::Utc::now(),
    )
}

#[tokio::test]
async fn test_get_table_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", TABLE_PATH)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind":"bigquery#table"}"#)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url()).with_access_token("test-token".to_string());
    assert!(client.get_table(&table()).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_table_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let result = client.get_table(&table()).await;

    assert!(matches!(result, Err(WarehouseError::NotFound(_))));
}

#[tokio::test]
async fn test_get_table_other_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", TABLE_PATH)
        .with_status(403)
        .with_body("Access Denied")
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let result = client.get_table(&table()).await;

    match result {
        Err(WarehouseError::Api { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "Access Denied");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_table_sends_schema() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", TABLES_PATH)
        .match_body(Matcher::PartialJson(json!({
            "tableReference": {
                "projectId": "proj",
                "datasetId": "Sales_data",
                "tableId": "sales_data"
            },
            "schema": {
                "fields": [
                    { "name": "order_id", "type": "STRING" },
                    { "name": "transaction_id", "type": "STRING" },
                    { "name": "timestamp", "type": "TIMESTAMP" },
                    { "name": "customer_id", "type": "STRING" },
                    { "name": "items", "type": "STRING" },
                    { "name": "total_amount", "type": "FLOAT" },
                    { "name": "total_tax", "type": "FLOAT" },
                    { "name": "payment_method", "type": "STRING" },
                    { "name": "processed_at", "type": "TIMESTAMP" },
                    { "name": "status", "type": "STRING" },
                    { "name": "message", "type": "STRING" }
                ]
            }
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    client.create_table(&table(), &sales_schema()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_table_conflict() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", TABLES_PATH)
        .with_status(409)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let result = client.create_table(&table(), &sales_schema()).await;

    assert!(matches!(result, Err(WarehouseError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_ensure_table_creates_after_not_found() {
    let mut server = Server::new_async().await;
    let lookup = server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .create_async()
        .await;
    let create = server
        .mock("POST", TABLES_PATH)
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    ensure_table(&client, &table()).await.unwrap();

    lookup.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_ensure_table_accepts_lost_create_race() {
    let mut server = Server::new_async().await;
    let _lookup = server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .create_async()
        .await;
    let _create = server
        .mock("POST", TABLES_PATH)
        .with_status(409)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    assert!(ensure_table(&client, &table()).await.is_ok());
}

#[tokio::test]
async fn test_insert_rows_success() {
    let mut server = Server::new_async().await;
    let row = record();
    let mock = server
        .mock("POST", format!("{}/insertAll", TABLE_PATH).as_str())
        .match_body(Matcher::PartialJson(json!({
            "rows": [{
                "insertId": row.order_id.to_string(),
                "json": {
                    "transaction_id": "T1",
                    "items": "[{\"sku\":\"A\"}]",
                    "total_tax": 7.0,
                    "status": "success"
                }
            }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind":"bigquery#tableDataInsertAllResponse"}"#)
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let errors = client
        .insert_rows(&table(), std::slice::from_ref(&row))
        .await
        .unwrap();

    assert!(errors.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_insert_rows_reports_row_errors() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", format!("{}/insertAll", TABLE_PATH).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"insertErrors":[{"index":0,"errors":[{"reason":"invalid","location":"timestamp","message":"bad value"}]}]}"#,
        )
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let errors = client.insert_rows(&table(), &[record()]).await.unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].index, 0);
    assert_eq!(errors[0].errors[0].reason.as_deref(), Some("invalid"));
}

#[tokio::test]
async fn test_insert_rows_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", format!("{}/insertAll", TABLE_PATH).as_str())
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;

    let client = BigQueryClient::new(server.url());
    let result = client.insert_rows(&table(), &[record()]).await;

    assert!(matches!(result, Err(WarehouseError::Api { status: 500, .. })));
}
