use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const TAX_RATE: f64 = 0.07;
pub const STATUS_SUCCESS: &str = "success";
pub const SUCCESS_MESSAGE: &str = "Transaction processed and stored successfully";

/// A sales transaction as submitted by the caller, after decoding.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionRequest {
    pub transaction_id: String,
    pub customer_id: String,
    pub items: Vec<Value>,
    pub total_amount: f64,
    pub payment_method: String,
    pub timestamp: Option<String>,
}

/// The single row written to the warehouse for an accepted request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub timestamp: String,
    pub customer_id: String,
    /// Items encoded as JSON text so they fit a single string column.
    pub items: String,
    pub total_amount: f64,
    pub total_tax: f64,
    pub payment_method: String,
    pub processed_at: String,
    pub status: String,
    pub message: String,
}

impl SalesRecord {
    /// Derives the stored row. `processed_at` doubles as the default `timestamp`,
    /// so a defaulted timestamp never lies after the processing time.
    pub fn new(request: TransactionRequest, processed_at: DateTime<Utc>) -> Self {
        let processed_at = format_timestamp(processed_at);

        Self {
            order_id: Uuid::new_v4(),
            transaction_id: request.transaction_id,
            timestamp: request.timestamp.unwrap_or_else(|| processed_at.clone()),
            customer_id: request.customer_id,
            items: Value::Array(request.items).to_string(),
            total_amount: request.total_amount,
            total_tax: compute_tax(request.total_amount),
            payment_method: request.payment_method,
            processed_at,
            status: STATUS_SUCCESS.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Tax on `amount`, rounded to cents.
///
/// The exact value of the product is rounded, so amounts whose tax sits just
/// below a half cent round down (118.5 gives 8.29, not 8.30).
pub fn compute_tax(amount: f64) -> f64 {
    let tax = amount * TAX_RATE;
    format!("{:.2}", tax).parse().unwrap_or(tax)
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
