//! Error type for `recensement-store-sqlite`.

use recensement_core::store::StoreError;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A `UNIQUE` or primary-key constraint rejected the write.
  #[error("duplicate key: {0}")]
  DuplicateKey(String),

  /// A population count does not fit the column type.
  #[error("count out of range: {0}")]
  OutOfRange(String),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, msg)) = &e
      && matches!(
        code.extended_code,
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
      )
    {
      return Self::DuplicateKey(msg.clone().unwrap_or_else(|| code.to_string()));
    }
    Self::Database(e)
  }
}

impl StoreError for Error {
  fn is_duplicate_key(&self) -> bool { matches!(self, Self::DuplicateKey(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
