//! The process-wide set of roles exempt from geographic scoping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Role codes whose holders see every entity regardless of location tags.
///
/// Built once at startup from configuration and shared read-only afterwards.
/// Codes are compared after trimming and ASCII upper-casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalRoleSet {
  /// The two top administrative roles. Holders bypass geography resolution
  /// entirely.
  pub top_admin: [String; 2],
  /// Further cross-cutting oversight roles.
  pub global:    BTreeSet<String>,
}

impl Default for GlobalRoleSet {
  fn default() -> Self {
    Self {
      top_admin: ["SUPER_ADMIN".to_owned(), "ADMIN".to_owned()],
      global:    BTreeSet::new(),
    }
  }
}

impl GlobalRoleSet {
  pub fn new<I, S>(top_admin: [&str; 2], global: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      top_admin: top_admin.map(normalize),
      global:    global.into_iter().map(|c| normalize(c.as_ref())).collect(),
    }
  }

  pub fn is_top_admin(&self, role_code: &str) -> bool {
    let code = normalize(role_code);
    self.top_admin.iter().any(|t| normalize(t) == code)
  }

  /// `true` if `role_code` is exempt from geographic scoping, either as a top
  /// administrative role or as a listed global role.
  pub fn is_global(&self, role_code: &str) -> bool {
    let code = normalize(role_code);
    if code.is_empty() {
      return false;
    }
    self.is_top_admin(&code) || self.global.iter().any(|g| normalize(g) == code)
  }
}

fn normalize(code: &str) -> String { code.trim().to_ascii_uppercase() }
