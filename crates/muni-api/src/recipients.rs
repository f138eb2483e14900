//! Handler for `POST /recipients/resolve`.
//!
//! Body: `{"targets":[{"kind":"ROLE","reference_id":3},{"kind":"EVERYONE"}]}`.
//! Returns the deduplicated recipient ids; callers persist them as delivery or
//! attendee rows.

use std::sync::Arc;

use axum::{Json, extract::State};
use muni_core::{
  AccessCore, directory::EntityDirectory, recipient::ResolvedRecipientSet,
  target::TargetSpec,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  pub targets: Vec<TargetSpec>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
  pub count:      usize,
  pub recipients: ResolvedRecipientSet,
}

/// `POST /recipients/resolve`
pub async fn resolve<D>(
  State(core): State<Arc<AccessCore<D>>>,
  Json(body): Json<ResolveBody>,
) -> Result<Json<ResolveResponse>, ApiError>
where
  D: EntityDirectory,
{
  let recipients = core.resolve_recipients(&body.targets).await?;
  Ok(Json(ResolveResponse { count: recipients.len(), recipients }))
}
