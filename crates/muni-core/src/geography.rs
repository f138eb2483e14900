//! A user's organisational geography and its resolver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::EntityDirectory,
  id::{DistrictId, DivisionId, SubtownId, TownId, UserId, ZoneId},
};

/// Role code and location attributes for one user. Derived, never stored.
///
/// A user may sit in several zones at once; every other dimension is single
/// valued. An absent dimension is `None` (or an empty zone set), which the
/// visibility scoper reads as "no constraint from this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGeography {
  pub role_code:   String,
  #[serde(default)]
  pub zone_ids:    BTreeSet<ZoneId>,
  pub division_id: Option<DivisionId>,
  pub district_id: Option<DistrictId>,
  pub town_id:     Option<TownId>,
  /// Carried for callers; not a visibility dimension.
  #[serde(default)]
  pub subtown_id:  Option<SubtownId>,
}

impl UserGeography {
  /// `true` when no location dimension is populated.
  pub fn is_unplaced(&self) -> bool {
    self.zone_ids.is_empty()
      && self.division_id.is_none()
      && self.district_id.is_none()
      && self.town_id.is_none()
  }
}

/// Looks up [`UserGeography`] for a user.
pub struct GeographyResolver<'a, D> {
  directory: &'a D,
}

impl<'a, D> GeographyResolver<'a, D>
where
  D: EntityDirectory,
{
  pub fn new(directory: &'a D) -> Self { Self { directory } }

  /// Fetch the geography of `user_id`.
  ///
  /// Unlike target expansion, a missing record is a hard failure here: the
  /// caller cannot compute a visibility scope without it.
  pub async fn geography_of(&self, user_id: UserId) -> Result<UserGeography> {
    self
      .directory
      .find_geography(user_id)
      .await
      .map_err(Error::directory)?
      .ok_or(Error::NotFound { entity: "user", id: user_id.get() })
  }
}
