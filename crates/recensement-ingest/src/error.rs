//! Error type for `recensement-ingest`.
//!
//! Only failures that abort a whole run live here; per-row problems are
//! logged and counted in the [`crate::IngestReport`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read census file {path:?}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("census header is unreadable: {0}")]
  Header(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
