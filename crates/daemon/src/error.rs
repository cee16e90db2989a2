use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use progress_core::StoreError;
use thiserror::Error;

/// Which collection a request was working on; picks the client-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Projects,
    Stages,
    Downloads,
}

impl Resource {
    fn read_failed(self) -> &'static str {
        match self {
            Resource::Projects => "Error reading projects directory",
            Resource::Stages => "Error reading project stages",
            Resource::Downloads => "Error reading downloads",
        }
    }

    fn save_failed(self) -> &'static str {
        match self {
            Resource::Projects => "Error reading projects directory",
            Resource::Stages => "Error saving project stages",
            Resource::Downloads => "Error saving downloads",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Resource::Projects => "Project not found",
            Resource::Stages => "Stage not found",
            Resource::Downloads => "Download not found",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Maps a store failure onto the plain-text answer for `resource`.
    ///
    /// Parse failures are reported like read failures.
    pub fn from_store(resource: Resource, err: StoreError) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound(resource.not_found());
        }
        let message = if err.is_write() {
            resource.save_failed()
        } else {
            resource.read_failed()
        };
        ApiError::Internal { message, source: err }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(message) => message,
            ApiError::Internal { message, source } => {
                tracing::error!(error = %source, "{message}");
                message
            }
        };
        (status, body).into_response()
    }
}
