//! Recipient resolution and geography-scoped visibility for the municipal
//! works administration stack.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! reads the organisation through the [`directory::EntityDirectory`] trait,
//! which storage backends (e.g. `muni-store-sqlite`) implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod directory;
pub mod error;
pub mod geography;
pub mod id;
pub mod recipient;
pub mod roles;
pub mod target;
pub mod user;
pub mod visibility;

pub use access::{AccessCore, Caller};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
