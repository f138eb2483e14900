//! Geography-scoped visibility of location-tagged entities.
//!
//! [`scope`] turns a caller's [`UserGeography`] into a [`VisibilityPredicate`]:
//! a structured disjunction of location clauses that storage backends
//! translate into their own query language, and that can also be evaluated in
//! memory with [`VisibilityPredicate::matches`].
//!
//! Two rules hold for every restricted predicate:
//!
//! - entities with no location tag at all are always visible;
//! - a caller with no geography sees no tagged entity (fail closed).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  geography::UserGeography,
  id::{DistrictId, DivisionId, TownId, ZoneId},
};

// ─── Entity tags ─────────────────────────────────────────────────────────────

/// The location references carried by a listed entity (e.g. a file type).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTags {
  pub zone_id:     Option<ZoneId>,
  pub division_id: Option<DivisionId>,
  pub district_id: Option<DistrictId>,
  pub town_id:     Option<TownId>,
}

impl LocationTags {
  /// `true` when the entity is not location-restricted.
  pub fn is_untagged(&self) -> bool {
    self.zone_id.is_none()
      && self.division_id.is_none()
      && self.district_id.is_none()
      && self.town_id.is_none()
  }
}

/// Anything that can be filtered by a [`VisibilityPredicate`].
pub trait LocationTagged {
  fn location(&self) -> LocationTags;
}

impl LocationTagged for LocationTags {
  fn location(&self) -> LocationTags { *self }
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// One location-match disjunct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum LocationClause {
  /// `entity.zone_id ∈ zones`
  Zone(BTreeSet<ZoneId>),
  Division(DivisionId),
  District(DistrictId),
  Town(TownId),
}

impl LocationClause {
  pub fn matches(&self, tags: &LocationTags) -> bool {
    match self {
      Self::Zone(zones) => tags.zone_id.is_some_and(|z| zones.contains(&z)),
      Self::Division(id) => tags.division_id == Some(*id),
      Self::District(id) => tags.district_id == Some(*id),
      Self::Town(id) => tags.town_id == Some(*id),
    }
  }
}

/// Which location-tagged entities a caller may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum VisibilityPredicate {
  /// Everything is visible.
  Unrestricted,
  /// Untagged entities, plus tagged entities matching any clause. An empty
  /// clause list admits untagged entities only.
  Restricted { clauses: Vec<LocationClause> },
}

impl VisibilityPredicate {
  /// The predicate for a caller with no usable geography.
  pub fn untagged_only() -> Self { Self::Restricted { clauses: Vec::new() } }

  pub fn is_unrestricted(&self) -> bool { matches!(self, Self::Unrestricted) }

  pub fn matches(&self, tags: &LocationTags) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::Restricted { clauses } => {
        tags.is_untagged() || clauses.iter().any(|c| c.matches(tags))
      }
    }
  }

  /// Keep the items visible under this predicate.
  pub fn filter<'a, T, I>(&'a self, items: I) -> impl Iterator<Item = T> + 'a
  where
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
    T: LocationTagged,
  {
    items.into_iter().filter(move |item| self.matches(&item.location()))
  }

  /// The disjunction of two predicates.
  pub fn union(self, other: Self) -> Self {
    match (self, other) {
      (Self::Restricted { mut clauses }, Self::Restricted { clauses: more }) => {
        for clause in more {
          if !clauses.contains(&clause) {
            clauses.push(clause);
          }
        }
        Self::Restricted { clauses }
      }
      _ => Self::Unrestricted,
    }
  }
}

// ─── Scoper ──────────────────────────────────────────────────────────────────

/// Build the visibility predicate for a caller.
///
/// `is_global` comes from
/// [`GlobalRoleSet::is_global`](crate::roles::GlobalRoleSet::is_global) and
/// overrides the geography entirely.
pub fn scope(geography: &UserGeography, is_global: bool) -> VisibilityPredicate {
  if is_global {
    return VisibilityPredicate::Unrestricted;
  }

  let mut clauses = Vec::with_capacity(4);
  if !geography.zone_ids.is_empty() {
    clauses.push(LocationClause::Zone(geography.zone_ids.clone()));
  }
  if let Some(id) = geography.division_id {
    clauses.push(LocationClause::Division(id));
  }
  if let Some(id) = geography.district_id {
    clauses.push(LocationClause::District(id));
  }
  if let Some(id) = geography.town_id {
    clauses.push(LocationClause::Town(id));
  }

  VisibilityPredicate::Restricted { clauses }
}
