pub mod sales;

use crate::health::{check_health, WarehouseChecker};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let checker = WarehouseChecker::new(state.warehouse.clone(), state.table.clone());
    let health_response = check_health(checker, state.start_time).await;

    // Return 503 if the warehouse is unreachable, 200 otherwise
    let status_code = if health_response.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_response))
}
