//! SQLite backend for the municipal entity directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod predicate;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use predicate::{SqlFragment, predicate_sql};
pub use store::{FileType, SqliteDirectory};
