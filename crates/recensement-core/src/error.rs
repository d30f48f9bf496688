//! Error types for `recensement-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
  Region,
  Department,
  City,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Region => "region",
      Self::Department => "department",
      Self::City => "city",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Lookup by id or code failed, or a filtered query matched nothing.
  #[error("{detail}")]
  NotFound { entity: Entity, detail: String },

  /// A unique code or a (name, department) pair is already taken.
  #[error("{detail}")]
  Duplicate { entity: Entity, detail: String },

  #[error("invalid input: {0}")]
  Validation(String),

  /// A referenced parent does not exist.
  #[error("{detail}")]
  DependencyMissing { entity: Entity, detail: String },

  #[error("external service error: {0}")]
  External(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: Entity, detail: impl Into<String>) -> Self {
    Self::NotFound { entity, detail: detail.into() }
  }

  pub fn duplicate(entity: Entity, detail: impl Into<String>) -> Self {
    Self::Duplicate { entity, detail: detail.into() }
  }

  pub fn dependency_missing(entity: Entity, detail: impl Into<String>) -> Self {
    Self::DependencyMissing { entity, detail: detail.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
