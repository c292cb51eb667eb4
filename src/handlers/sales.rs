use axum::{
    extract::{Request, State},
    http::Method,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::use_cases::RecordSale;
use crate::validation::{has_json_content_type, validate_transaction};
use crate::AppState;

/// Largest body buffered for a sale; anything bigger counts as a missing body.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub success: bool,
    pub order_id: Uuid,
}

/// Accepts one sales transaction and stores it as a single warehouse row.
pub async fn sales_data(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SaleResponse>, AppError> {
    let result = record_sale(&state, request).await;

    if let Err(e) = &result {
        match e {
            AppError::InsertFailed(details) => tracing::error!(%details, "Insert errors"),
            AppError::Internal(details) => tracing::error!(%details, "Exception while storing sale"),
            _ => tracing::info!(error = %e, "Rejected sales request"),
        }
    }

    result
}

async fn record_sale(state: &AppState, request: Request) -> Result<Json<SaleResponse>, AppError> {
    // The method is checked before the body is read.
    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    if !has_json_content_type(request.headers()) {
        return Err(AppError::MissingBody);
    }

    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::MissingBody)?;

    let request = validate_transaction(&body)?;

    let record = RecordSale::new(state.warehouse.clone(), state.table.clone())
        .execute(request)
        .await?;

    Ok(Json(SaleResponse {
        success: true,
        order_id: record.order_id,
    }))
}
