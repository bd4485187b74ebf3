use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure while listing the saves directory or a folder in it.
    #[error("listing failed: {0}")]
    Listing(StoreError),

    /// Failure while reading one save file.
    #[error("read failed: {0}")]
    File(StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn listing(err: StoreError) -> Self {
        Self::Listing(err)
    }

    pub fn file(err: StoreError) -> Self {
        Self::File(err)
    }

    /// Status code and the generic message sent to the client. Details stay in the logs.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Listing(StoreError::InvalidPath { .. }) => {
                (StatusCode::FORBIDDEN, "Invalid folder path".to_string())
            }
            ApiError::Listing(StoreError::RootMissing { .. }) => {
                (StatusCode::NOT_FOUND, "Saves directory not found".to_string())
            }
            ApiError::Listing(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Folder not found".to_string())
            }
            ApiError::Listing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read saves directory".to_string(),
            ),
            ApiError::File(StoreError::InvalidPath { .. }) => {
                (StatusCode::FORBIDDEN, "Invalid file path".to_string())
            }
            ApiError::File(StoreError::NotFound { .. } | StoreError::RootMissing { .. }) => {
                (StatusCode::NOT_FOUND, "File not found".to_string())
            }
            ApiError::File(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::file(StoreError::InvalidPath { path: "../x".into() }), StatusCode::FORBIDDEN),
            (ApiError::file(StoreError::NotFound { path: "x".into() }), StatusCode::NOT_FOUND),
            (ApiError::listing(StoreError::RootMissing { root: "saves".into() }), StatusCode::NOT_FOUND),
            (ApiError::listing(StoreError::NotFound { path: "run_x".into() }), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("nope".into()), StatusCode::BAD_REQUEST),
            (ApiError::Internal("join".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_missing_folder_and_missing_root_differ() {
        let (_, folder) = ApiError::listing(StoreError::NotFound { path: "run_x".into() }).status_and_message();
        let (_, root) =
            ApiError::listing(StoreError::RootMissing { root: "saves".into() }).status_and_message();
        assert_eq!(folder, "Folder not found");
        assert_eq!(root, "Saves directory not found");
    }

    #[test]
    fn test_parse_failure_is_generic_500() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::file(StoreError::Parse {
            path: "saves/broken.json".into(),
            source,
        });
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to read file");
    }
}
