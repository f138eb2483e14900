//! Distribution targets, the abstract "who should receive this" descriptions
//! attached to daak, meeting invitations and similar distribution flows.
//!
//! Callers hand in [`TargetSpec`]s (the untyped wire shape). They are validated
//! into [`DistributionTarget`]s before any directory access happens.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  id::{DepartmentId, RoleGroupId, RoleId, UserId},
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The discriminant of a distribution target.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TargetKind {
  User,
  Role,
  RoleGroup,
  Team,
  Department,
  Everyone,
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

/// A distribution target as it arrives from a caller: a free-form kind string
/// plus an optional reference id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
  pub kind:         String,
  #[serde(default)]
  pub reference_id: Option<i64>,
}

impl TargetSpec {
  pub fn new(kind: impl Into<String>, reference_id: Option<i64>) -> Self {
    Self { kind: kind.into(), reference_id }
  }
}

// ─── Validated target ────────────────────────────────────────────────────────

/// A validated distribution target. The reference id is typed per kind;
/// [`DistributionTarget::Team`] is keyed by the manager's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistributionTarget {
  User(UserId),
  Role(RoleId),
  RoleGroup(RoleGroupId),
  Team(UserId),
  Department(DepartmentId),
  Everyone,
}

impl DistributionTarget {
  /// Build a target from a kind and an optional reference.
  ///
  /// `reference_id` is ignored for [`TargetKind::Everyone`] and required for
  /// every other kind.
  pub fn new(kind: TargetKind, reference_id: Option<i64>) -> Result<Self> {
    if kind == TargetKind::Everyone {
      return Ok(Self::Everyone);
    }
    let id = reference_id.ok_or_else(|| {
      Error::Validation(format!("{kind} target requires a reference_id"))
    })?;
    Ok(match kind {
      TargetKind::User => Self::User(UserId(id)),
      TargetKind::Role => Self::Role(RoleId(id)),
      TargetKind::RoleGroup => Self::RoleGroup(RoleGroupId(id)),
      TargetKind::Team => Self::Team(UserId(id)),
      TargetKind::Department => Self::Department(DepartmentId(id)),
      TargetKind::Everyone => Self::Everyone,
    })
  }

  pub fn kind(&self) -> TargetKind {
    match self {
      Self::User(_) => TargetKind::User,
      Self::Role(_) => TargetKind::Role,
      Self::RoleGroup(_) => TargetKind::RoleGroup,
      Self::Team(_) => TargetKind::Team,
      Self::Department(_) => TargetKind::Department,
      Self::Everyone => TargetKind::Everyone,
    }
  }
}

impl TryFrom<&TargetSpec> for DistributionTarget {
  type Error = Error;

  fn try_from(spec: &TargetSpec) -> Result<Self> {
    let kind = TargetKind::from_str(spec.kind.trim()).map_err(|_| {
      Error::Validation(format!("unknown target kind: {:?}", spec.kind))
    })?;
    Self::new(kind, spec.reference_id)
  }
}

/// Validate a whole target list. The first malformed entry fails the batch.
pub fn validate_all(specs: &[TargetSpec]) -> Result<Vec<DistributionTarget>> {
  specs.iter().map(DistributionTarget::try_from).collect()
}
