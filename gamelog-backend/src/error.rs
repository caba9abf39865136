use axum::{
  Json,
  extract::rejection::{BytesRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use gamelog_db::DbError;
use serde::Serialize;

use crate::validation::{FieldError, FieldErrors};

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub message: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<FieldError>,
}

impl ErrorResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      errors: Vec::new(),
    }
  }

  pub fn with_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
    Self {
      message: message.into(),
      errors,
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  DatabaseError(DbError),
  ValidationError(FieldErrors),
  NotFound(&'static str),
  MalformedBody(String),
  /// An extractor refused the request before the handler ran.
  Rejected { status: StatusCode, message: String },
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::DatabaseError(db_err) => {
        let (status, message) = match db_err {
          DbError::InvalidIdentifier(raw) => {
            tracing::warn!(id = %raw, "Malformed identifier");
            (
              StatusCode::BAD_REQUEST,
              "Invalid identifier provided".to_string(),
            )
          }
          DbError::GameNotFound => (StatusCode::NOT_FOUND, "Game not found".to_string()),
          DbError::ReviewNotFound => (StatusCode::NOT_FOUND, "Review not found".to_string()),
          DbError::Constraint(message) => {
            tracing::warn!(%message, "Store rejected document");
            (StatusCode::BAD_REQUEST, message)
          }
          DbError::Sqlite(_) | DbError::Connection(_) => {
            // Don't expose internal database errors
            tracing::error!("Internal database error: {:?}", db_err);
            (
              StatusCode::INTERNAL_SERVER_ERROR,
              "Internal server error".to_string(),
            )
          }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
      }
      AppError::ValidationError(errors) => {
        tracing::warn!(errors = ?errors.0, "Validation failed");
        let error_response = ErrorResponse::with_errors("Validation failed", errors.0);
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
      AppError::NotFound(message) => {
        (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message))).into_response()
      }
      AppError::MalformedBody(details) => {
        tracing::warn!(%details, "Malformed request body");
        let error_response = ErrorResponse::new("Malformed JSON body");
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
      AppError::Rejected { status, message } => {
        tracing::warn!(%status, %message, "Request rejected");
        (status, Json(ErrorResponse::new(message))).into_response()
      }
    }
  }
}

impl From<DbError> for AppError {
  fn from(err: DbError) -> Self {
    AppError::DatabaseError(err)
  }
}

impl From<PathRejection> for AppError {
  fn from(rejection: PathRejection) -> Self {
    AppError::Rejected {
      status: rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl From<QueryRejection> for AppError {
  fn from(rejection: QueryRejection) -> Self {
    AppError::Rejected {
      status: rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl From<BytesRejection> for AppError {
  fn from(rejection: BytesRejection) -> Self {
    AppError::Rejected {
      status: rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl From<FieldErrors> for AppError {
  fn from(errors: FieldErrors) -> Self {
    AppError::ValidationError(errors)
  }
}
