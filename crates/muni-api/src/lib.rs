//! JSON REST API over the recipient/visibility core.
//!
//! Exposes an axum [`Router`] backed by any
//! [`muni_core::directory::EntityDirectory`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", muni_api::api_router(core.clone()))
//! ```

pub mod error;
pub mod recipients;
pub mod visibility;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use muni_core::{AccessCore, directory::EntityDirectory};

pub use error::ApiError;

/// Build a fully-materialised API router for `core`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<D>(core: Arc<AccessCore<D>>) -> Router<()>
where
  D: EntityDirectory + 'static,
{
  Router::new()
    .route("/recipients/resolve", post(recipients::resolve::<D>))
    .route("/visibility/{user_id}", get(visibility::predicate::<D>))
    .route("/geography/{user_id}", get(visibility::geography::<D>))
    .with_state(core)
}
