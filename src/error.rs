use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::types::api::ErrorResponse;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("login required")]
    Unauthenticated,
    #[error("no paste id found, bad URL")]
    MissingPasteId,
    #[error("invalid request body: {source}")]
    InvalidBody {
        #[from]
        source: JsonRejection,
    },
    #[error("paste not found")]
    NotFound,
    #[error("bad owner")]
    NotOwner,
    #[error("database error")]
    Database { source: sqlx::Error },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::FORBIDDEN,
            ApiError::MissingPasteId => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody { source } => match source {
                JsonRejection::BytesRejection(_) => source.status(),
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::NotOwner => StatusCode::FORBIDDEN,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if let ApiError::Database { source } = &self {
            error!("request failed: {self}: {source}");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Database { source },
        }
    }
}
