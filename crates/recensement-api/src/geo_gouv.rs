//! [`DepartmentDirectory`] backed by the public geography API
//! (`https://geo.api.gouv.fr`).

use std::time::Duration;

use recensement_core::directory::{DepartmentDirectory, DepartmentInfo};
use reqwest::Client;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://geo.api.gouv.fr";

#[derive(Debug, Error)]
pub enum GeoApiError {
  #[error("geography API request failed: {0}")]
  Http(#[from] reqwest::Error),
}

/// HTTP client for `GET {base}/departements/{code}`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeoApiClient {
  client:   Client,
  base_url: String,
}

impl GeoApiClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GeoApiError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, code: &str) -> String {
    format!("{}/departements/{code}", self.base_url.trim_end_matches('/'))
  }
}

impl DepartmentDirectory for GeoApiClient {
  type Error = GeoApiError;

  async fn lookup<'a>(&'a self, code: &'a str) -> Result<DepartmentInfo, GeoApiError> {
    let info = self
      .client
      .get(self.url(code))
      .query(&[("fields", "nom,code,codeRegion")])
      .send()
      .await?
      .error_for_status()?
      .json::<DepartmentInfo>()
      .await?;
    Ok(info)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_ignores_trailing_slash() {
    let client = GeoApiClient::new("http://localhost:1/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.url("2A"), "http://localhost:1/departements/2A");
  }

  #[tokio::test]
  async fn unreachable_host_is_an_error() {
    // Port 9 (discard) on loopback is closed on test machines.
    let client = GeoApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(client.lookup("34").await.is_err());
  }

  #[test]
  fn payload_uses_camel_case() {
    let info: DepartmentInfo =
      serde_json::from_str(r#"{"nom":"Hérault","code":"34","codeRegion":"76"}"#).unwrap();
    assert_eq!(info.code_region.as_deref(), Some("76"));
  }
}
