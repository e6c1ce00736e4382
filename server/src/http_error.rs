use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use eyre;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use learnnow_core::{model::repository::RepositoryError, storage::StorageReadError};

/// Failures with a meaning for the client. Everything else is a 500.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid request")]
    Validation(#[from] validator::ValidationErrors),
    #[error("missing or invalid user identity")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug)]
pub struct HttpError(eyre::Error);

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<serde_json::Value>,
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> HttpError {
        ApiError::BadRequest(message.into()).into()
    }

    pub fn forbidden(message: impl Into<String>) -> HttpError {
        ApiError::Forbidden(message.into()).into()
    }

    pub fn not_found(what: impl std::fmt::Display) -> HttpError {
        ApiError::NotFound(what.to_string()).into()
    }

    pub fn status_code(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<ApiError>() {
            return match err {
                ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            };
        }
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return match err {
                RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
            };
        }
        if let Some(StorageReadError::FileNotFound(_)) = self.0.downcast_ref::<StorageReadError>() {
            return StatusCode::NOT_FOUND;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(err = ?self.0, "request failed");
            ErrorResponse {
                message: "Internal server error".to_owned(),
                fields: None,
            }
        } else {
            let fields = match self.0.downcast_ref::<ApiError>() {
                Some(ApiError::Validation(errors)) => serde_json::to_value(errors).ok(),
                _ => None,
            };
            ErrorResponse {
                message: self.0.to_string(),
                fields,
            }
        };
        (status, Json(body)).into_response()
    }
}

macro_rules! impl_from {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                Self(err.into())
            }
        }
    };
}

impl_from!(std::io::Error);
impl_from!(color_eyre::Report);
impl_from!(ApiError);
impl_from!(StorageReadError);

impl From<validator::ValidationErrors> for HttpError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err).into()
    }
}

pub type ApiResult<T> = Result<T, HttpError>;

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
