//! Batch ingest of the INSEE census CSV into a [`GeoStore`].
//!
//! The [`Importer`] resolves each row's region and department through
//! per-run caches, creating them on first sighting, and inserts the city
//! unless it already exists. Bad rows are logged and counted; only failing to
//! read the input aborts a run.
//!
//! [`GeoStore`]: recensement_core::store::GeoStore

pub mod census;
pub mod error;
pub mod importer;

use std::path::PathBuf;

use serde::Deserialize;

pub use error::{Error, Result};
pub use importer::{DedupScope, Importer, IngestReport};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Ingest job configuration, deserialised from `config.toml` and
/// `RECENSEMENT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Census file; the `--input` flag takes precedence.
  #[serde(default)]
  pub input:      Option<PathBuf>,
  #[serde(default)]
  pub dedup:      DedupScope,
}

fn default_store_path() -> PathBuf { PathBuf::from("recensement.db") }
