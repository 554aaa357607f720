pub mod changelog;
pub mod events;
pub mod init;
pub mod messages;
pub mod panels;
pub mod todos;
pub mod tree;

use crate::error::AppError;
use axum::Json;
use prakter_core::types::Outcome;
use serde::Serialize;

/// `Cancelled` becomes `{"cancelled": true}` with status 200.
pub(crate) fn outcome_json<T: Serialize>(
    outcome: Outcome<T>,
) -> Result<Json<serde_json::Value>, AppError> {
    match outcome {
        Outcome::Done(value) => Ok(Json(serde_json::to_value(value)?)),
        Outcome::Cancelled => Ok(Json(serde_json::json!({ "cancelled": true }))),
    }
}
