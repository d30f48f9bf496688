//! Server configuration, deserialised from `config.toml` and `RECENSEMENT_*`
//! environment variables. Every key has a default.

use std::{path::PathBuf, time::Duration};

use recensement_api::geo_gouv::DEFAULT_BASE_URL;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  #[serde(default = "default_geo_api_base_url")]
  pub geo_api_base_url:     String,
  #[serde(default = "default_geo_api_timeout_secs")]
  pub geo_api_timeout_secs: u64,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn geo_api_timeout(&self) -> Duration { Duration::from_secs(self.geo_api_timeout_secs) }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("recensement.db") }

fn default_geo_api_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_geo_api_timeout_secs() -> u64 { 10 }

#[cfg(test)]
mod tests {
  use super::*;

  fn load(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = load("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("recensement.db"));
    assert_eq!(cfg.geo_api_base_url, "https://geo.api.gouv.fr");
    assert_eq!(cfg.geo_api_timeout(), Duration::from_secs(10));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = load("port = 9000\nstore_path = \"/var/lib/recensement.db\"\n");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/recensement.db"));
  }
}
