use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use super::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HttpError {
  pub message: String,
}

impl From<&str> for HttpError {
  fn from(message: &str) -> Self {
    Self {
      message: message.to_string(),
    }
  }
}

impl HttpError {
  pub fn response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
      .content_type("application/json")
      .json(HttpError::from(message))
  }
}

pub fn bad_request(message: &str) -> HttpResponse {
  HttpError::response(StatusCode::BAD_REQUEST, message)
}

pub fn not_found(message: &str) -> HttpResponse {
  HttpError::response(StatusCode::NOT_FOUND, message)
}

pub fn conflict(message: &str) -> HttpResponse {
  HttpError::response(StatusCode::CONFLICT, message)
}

pub fn internal_server_error() -> HttpResponse {
  HttpError::response(
    StatusCode::INTERNAL_SERVER_ERROR,
    "An internal server error occurred.",
  )
}

/// Maps a failed store call to its response, logging unexpected failures.
pub fn repository_failure(error: RepositoryError) -> HttpResponse {
  match error {
    RepositoryError::NotFound => not_found("Not found"),
    RepositoryError::Conflict(message) => conflict(&message),
    other => {
      error!(error = %other, "store operation failed");
      internal_server_error()
    }
  }
}
