use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::{Map, Value};

use crate::domain::TransactionRequest;
use crate::error::AppError;

/// Required payload fields, in the order presence is checked.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "transaction_id",
    "customer_id",
    "items",
    "total_amount",
    "payment_method",
];

pub type ValidationResult<T> = Result<T, AppError>;

/// Parses and validates a raw request body into a [`TransactionRequest`].
///
/// Checks run in a fixed order and stop at the first failure: body shape,
/// presence of each required field, `items` being a list, then the types of
/// the remaining fields.
pub fn validate_transaction(body: &[u8]) -> ValidationResult<TransactionRequest> {
    let payload = parse_body(body)?;
    validate_required(&payload)?;
    decode_request(payload)
}

/// True for `application/json` and `application/<subtype>+json`, parameters ignored.
pub fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// An absent, unparseable, non-object or empty body all count as missing.
pub fn parse_body(body: &[u8]) -> ValidationResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(AppError::MissingBody),
    }
}

pub fn validate_required(payload: &Map<String, Value>) -> ValidationResult<()> {
    match REQUIRED_FIELDS
        .into_iter()
        .find(|field| !payload.contains_key(*field))
    {
        Some(field) => Err(AppError::MissingField(field)),
        None => Ok(()),
    }
}

fn decode_request(mut payload: Map<String, Value>) -> ValidationResult<TransactionRequest> {
    let items = match payload.remove("items") {
        Some(Value::Array(items)) => items,
        _ => return Err(AppError::InvalidType("items")),
    };

    Ok(TransactionRequest {
        transaction_id: take_string(&mut payload, "transaction_id")?,
        customer_id: take_string(&mut payload, "customer_id")?,
        items,
        total_amount: take_number(&mut payload, "total_amount")?,
        payment_method: take_string(&mut payload, "payment_method")?,
        timestamp: take_optional_string(&mut payload, "timestamp")?,
    })
}

fn take_string(payload: &mut Map<String, Value>, field: &'static str) -> ValidationResult<String> {
    match payload.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(AppError::InvalidType(field)),
        None => Err(AppError::MissingField(field)),
    }
}

fn take_number(payload: &mut Map<String, Value>, field: &'static str) -> ValidationResult<f64> {
    match payload.remove(field) {
        Some(Value::Number(value)) => value.as_f64().ok_or(AppError::InvalidType(field)),
        Some(_) => Err(AppError::InvalidType(field)),
        None => Err(AppError::MissingField(field)),
    }
}

// A null timestamp is treated the same as an absent one.
fn take_optional_string(
    payload: &mut Map<String, Value>,
    field: &'static str,
) -> ValidationResult<Option<String>> {
    match payload.remove(field) {
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(AppError::InvalidType(field)),
    }
}
