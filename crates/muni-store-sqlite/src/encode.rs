//! Row types read straight from SQLite and their conversion into domain types.
//!
//! Ids are stored as plain `INTEGER`s and flags as `0`/`1`. Role-code lists
//! are stored as text and normalised through [`RoleCodes::parse`].

use std::collections::BTreeSet;

use muni_core::{
  geography::UserGeography,
  id::{
    DepartmentId, DistrictId, DivisionId, RoleGroupId, RoleId, SubtownId,
    TownId, UserId, ZoneId,
  },
  user::{ActiveUser, RoleCodes, RoleGroup},
  visibility::LocationTags,
};

use crate::{Result, store::FileType};

/// Columns selected for every user query, in [`RawUser`] order.
pub const USER_COLUMNS: &str = "u.id, u.is_active, u.role_id, u.department_id, \
   u.division_id, u.district_id, u.town_id, u.subtown_id";

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct RawUser {
  pub id:            i64,
  pub is_active:     bool,
  pub role_id:       i64,
  pub department_id: Option<i64>,
  pub division_id:   Option<i64>,
  pub district_id:   Option<i64>,
  pub town_id:       Option<i64>,
  pub subtown_id:    Option<i64>,
}

impl RawUser {
  /// Map a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      is_active:     row.get(1)?,
      role_id:       row.get(2)?,
      department_id: row.get(3)?,
      division_id:   row.get(4)?,
      district_id:   row.get(5)?,
      town_id:       row.get(6)?,
      subtown_id:    row.get(7)?,
    })
  }

  pub fn into_user(self) -> ActiveUser {
    ActiveUser {
      id:            UserId(self.id),
      is_active:     self.is_active,
      role_id:       RoleId(self.role_id),
      department_id: self.department_id.map(DepartmentId),
      division_id:   self.division_id.map(DivisionId),
      district_id:   self.district_id.map(DistrictId),
      town_id:       self.town_id.map(TownId),
      subtown_id:    self.subtown_id.map(SubtownId),
    }
  }
}

// ─── Role groups ─────────────────────────────────────────────────────────────

pub struct RawRoleGroup {
  pub id:         i64,
  pub is_active:  bool,
  pub role_codes: String,
}

impl RawRoleGroup {
  pub fn into_role_group(self) -> Result<RoleGroup> {
    Ok(RoleGroup {
      id:         RoleGroupId(self.id),
      is_active:  self.is_active,
      role_codes: RoleCodes::parse(&self.role_codes)?,
    })
  }
}

// ─── Geography ───────────────────────────────────────────────────────────────

pub struct RawGeography {
  pub role_code:   String,
  pub division_id: Option<i64>,
  pub district_id: Option<i64>,
  pub town_id:     Option<i64>,
  pub subtown_id:  Option<i64>,
  pub zone_ids:    Vec<i64>,
}

impl RawGeography {
  pub fn into_geography(self) -> UserGeography {
    UserGeography {
      role_code:   self.role_code,
      zone_ids:    self.zone_ids.into_iter().map(ZoneId).collect::<BTreeSet<_>>(),
      division_id: self.division_id.map(DivisionId),
      district_id: self.district_id.map(DistrictId),
      town_id:     self.town_id.map(TownId),
      subtown_id:  self.subtown_id.map(SubtownId),
    }
  }
}

// ─── File types ──────────────────────────────────────────────────────────────

pub struct RawFileType {
  pub id:          i64,
  pub name:        String,
  pub zone_id:     Option<i64>,
  pub division_id: Option<i64>,
  pub district_id: Option<i64>,
  pub town_id:     Option<i64>,
}

impl RawFileType {
  pub fn into_file_type(self) -> FileType {
    FileType {
      id:       self.id,
      name:     self.name,
      location: LocationTags {
        zone_id:     self.zone_id.map(ZoneId),
        division_id: self.division_id.map(DivisionId),
        district_id: self.district_id.map(DistrictId),
        town_id:     self.town_id.map(TownId),
      },
    }
  }
}
