//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use recensement_core::{Entity, Error};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] Error),

  #[error("report rendering failed: {0}")]
  Report(#[from] recensement_report::Error),
}

impl ApiError {
  /// A missing or malformed query parameter.
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::Domain(Error::Validation(message.into()))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Domain(e) => match e {
        Error::NotFound { .. } | Error::DependencyMissing { .. } => {
          StatusCode::NOT_FOUND
        }
        Error::Duplicate { entity: Entity::Region, .. } => StatusCode::CONFLICT,
        Error::Duplicate { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::External(_) => StatusCode::BAD_GATEWAY,
        Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      Self::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = json!({
      "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
      "status":    status.as_u16(),
      "error":     status.canonical_reason().unwrap_or("Error"),
      "message":   self.to_string(),
    });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicates_conflict_only_for_regions() {
    let region = ApiError::from(Error::duplicate(Entity::Region, "taken"));
    assert_eq!(region.status(), StatusCode::CONFLICT);

    let department = ApiError::from(Error::duplicate(Entity::Department, "taken"));
    assert_eq!(department.status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn missing_parent_is_not_found() {
    let err = ApiError::from(Error::dependency_missing(Entity::Region, "no region 9"));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn external_failure_is_bad_gateway() {
    let err = ApiError::from(Error::External("timeout".into()));
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
  }
}
