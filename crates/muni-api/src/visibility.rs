//! Handlers for the listing-flow reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visibility/:user_id` | Optional `?role_code=` from the caller's session |
//! | `GET`  | `/geography/:user_id` | 404 if the user has no directory record |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use muni_core::{
  AccessCore, Caller, directory::EntityDirectory, geography::UserGeography,
  id::UserId, visibility::VisibilityPredicate,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct PredicateParams {
  /// Session role code; a global role skips the directory lookup.
  pub role_code: Option<String>,
}

/// `GET /visibility/:user_id[?role_code=...]`
pub async fn predicate<D>(
  State(core): State<Arc<AccessCore<D>>>,
  Path(user_id): Path<i64>,
  Query(params): Query<PredicateParams>,
) -> Result<Json<VisibilityPredicate>, ApiError>
where
  D: EntityDirectory,
{
  let caller = Caller { user_id: UserId(user_id), role_code: params.role_code };
  let predicate = core.build_visibility_predicate_for(&caller).await?;
  Ok(Json(predicate))
}

/// `GET /geography/:user_id`
pub async fn geography<D>(
  State(core): State<Arc<AccessCore<D>>>,
  Path(user_id): Path<i64>,
) -> Result<Json<UserGeography>, ApiError>
where
  D: EntityDirectory,
{
  let geography = core.geography_of(UserId(user_id)).await?;
  Ok(Json(geography))
}
