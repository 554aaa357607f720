use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prakter_core::error::PrakterError;

/// Carries an explicit 400 through the `anyhow::Error` chain for request
/// problems that have no `PrakterError` variant (bad query values).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<PrakterError>() {
            Some(e) => match e {
                PrakterError::TaskNotFound(_) => StatusCode::NOT_FOUND,
                PrakterError::MissingWorkspace(_)
                | PrakterError::InvalidChangeType(_)
                | PrakterError::InvalidFileKind(_)
                | PrakterError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
                PrakterError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PrakterError::Generation(_)
                | PrakterError::Io(_)
                | PrakterError::Yaml(_)
                | PrakterError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn status_of(err: PrakterError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn task_not_found_maps_to_404() {
        assert_eq!(
            status_of(PrakterError::TaskNotFound("1".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn invalid_input_maps_to_400() {
        assert_eq!(
            status_of(PrakterError::InvalidCategory("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PrakterError::InvalidChangeType("perf".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PrakterError::MissingWorkspace(PathBuf::from("/nope"))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_error_maps_to_422() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PrakterError::Parse {
            path: PathBuf::from("TODO.json"),
            source,
        };
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generation_failure_maps_to_500() {
        assert_eq!(
            status_of(PrakterError::Generation("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn explicit_bad_request() {
        let response = AppError::bad_request("bad parent").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_prakter_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something broke"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
