use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("No data present")]
    MissingBody,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("{}", invalid_type_message(.0))]
    InvalidType(&'static str),

    #[error("Failed to insert row")]
    InsertFailed(Value),

    #[error("Internal error")]
    Internal(String),
}

fn invalid_type_message(field: &str) -> String {
    if field == "items" {
        "Items must be a list".to_string()
    } else {
        format!("Invalid type for field: {}", field)
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingBody | AppError::MissingField(_) | AppError::InvalidType(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InsertFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client input errors are never logged above info.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::InsertFailed(details) => Some(details.clone()),
            AppError::Internal(details) => Some(Value::String(details.clone())),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self.details() {
            Some(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            None => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
