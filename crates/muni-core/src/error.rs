//! Error types for `muni-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input: unknown target kind or a missing reference id.
  #[error("invalid distribution target: {0}")]
  Validation(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: i64 },

  /// The entity directory could not be reached or failed mid-query.
  #[error("entity directory unavailable: {0}")]
  DirectoryUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid role code list: {0}")]
  InvalidRoleCodes(String),
}

impl Error {
  /// Wrap a backend error as [`Error::DirectoryUnavailable`].
  pub fn directory<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::DirectoryUnavailable(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
