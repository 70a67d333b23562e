/// HTTP handlers module
/// Generic resource endpoints plus the relation and query endpoints that do
/// not fit the single-key CRUD shape.

pub mod queries;
pub mod relations;
pub mod rest;

pub use rest::{health, resource_routes};

use crate::error::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::SelfReference { .. } | StoreError::InvalidSelector { .. } => {
                StatusCode::BAD_REQUEST
            }
            StoreError::DuplicateValue { .. }
            | StoreError::Validation(_)
            | StoreError::InvalidStatusTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::IdentifierExhaustion { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            StoreError::Database(_) => {
                log::error!("Database error: {}", self);
                "Internal server error".to_string()
            }
            _ if self.is_internal() => {
                log::error!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
