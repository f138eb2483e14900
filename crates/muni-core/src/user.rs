//! Directory-owned projections: users and role groups.
//!
//! These are read-only from the core's point of view. The directory owns and
//! mutates them; resolution only ever looks at the current snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  id::{
    DepartmentId, DistrictId, DivisionId, RoleGroupId, RoleId, SubtownId,
    TownId, UserId,
  },
};

// ─── Users ───────────────────────────────────────────────────────────────────

/// A user as seen by the resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUser {
  pub id:            UserId,
  pub is_active:     bool,
  pub role_id:       RoleId,
  pub department_id: Option<DepartmentId>,
  pub division_id:   Option<DivisionId>,
  pub district_id:   Option<DistrictId>,
  pub town_id:       Option<TownId>,
  pub subtown_id:    Option<SubtownId>,
}

// ─── Role codes ──────────────────────────────────────────────────────────────

/// The canonical list of role codes attached to a role group.
///
/// Stored lists arrive either as a native JSON array or as a string holding a
/// serialised array (double-encoded by older writers). Both are normalised
/// here, at the directory boundary, so the resolver only ever sees strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleCodes(Vec<String>);

impl RoleCodes {
  pub fn new<I, S>(codes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self(codes.into_iter().map(Into::into).collect())
  }

  /// Parse the raw column text.
  ///
  /// Accepts `["A","B"]`, `"[\"A\",\"B\"]"`, and as a last resort a bare
  /// comma-separated `A,B`. Blank input is an empty list.
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Ok(Self::default());
    }
    match serde_json::from_str::<RawCodes>(trimmed) {
      Ok(codes) => codes.normalize(),
      Err(_) if !trimmed.starts_with(['[', '"', '{']) => {
        Ok(Self::new(trimmed.split(',')))
      }
      Err(e) => Err(Error::InvalidRoleCodes(e.to_string())),
    }
  }

  /// Trimmed, non-empty, unique codes in first-seen order.
  pub fn deduplicated(&self) -> Vec<String> {
    let mut seen = BTreeSet::new();
    self
      .0
      .iter()
      .map(|c| c.trim())
      .filter(|c| !c.is_empty())
      .filter(|c| seen.insert(*c))
      .map(str::to_owned)
      .collect()
  }

  pub fn as_slice(&self) -> &[String] { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'de> Deserialize<'de> for RoleCodes {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    RawCodes::deserialize(d)?
      .normalize()
      .map_err(serde::de::Error::custom)
  }
}

/// Either representation a stored role-code list may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCodes {
  List(Vec<String>),
  Serialized(String),
}

impl RawCodes {
  fn normalize(self) -> Result<RoleCodes> {
    match self {
      Self::List(codes) => Ok(RoleCodes(codes)),
      Self::Serialized(inner) => {
        let inner = inner.trim();
        if inner.starts_with('[') {
          serde_json::from_str::<Vec<String>>(inner)
            .map(RoleCodes)
            .map_err(|e| Error::InvalidRoleCodes(e.to_string()))
        } else {
          RoleCodes::parse(inner)
        }
      }
    }
  }
}

// ─── Role groups ─────────────────────────────────────────────────────────────

/// A named bundle of role codes used as a single distribution target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroup {
  pub id:         RoleGroupId,
  pub is_active:  bool,
  pub role_codes: RoleCodes,
}
