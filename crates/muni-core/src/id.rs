//! Strongly-typed integer identifiers for directory entities.
//!
//! The directory keys everything by integer primary keys; the newtypes keep a
//! department id from being passed where a role id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(UserId);
id_type!(RoleId);
id_type!(RoleGroupId);
id_type!(DepartmentId);
id_type!(ZoneId);
id_type!(DivisionId);
id_type!(DistrictId);
id_type!(TownId);
id_type!(SubtownId);
