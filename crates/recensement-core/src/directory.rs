//! Lookup of department metadata that the store does not keep.
//!
//! The production implementation calls the public geography API
//! (`geo.api.gouv.fr`); tests substitute an in-memory table.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// What the geography API knows about a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInfo {
  pub nom:         String,
  pub code:        String,
  pub code_region: Option<String>,
}

pub trait DepartmentDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the department with `code`.
  fn lookup<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<DepartmentInfo, Self::Error>> + Send + 'a;
}
