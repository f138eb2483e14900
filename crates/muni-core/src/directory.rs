//! The `EntityDirectory` trait: read-only access to users, roles, role
//! groups, teams and departments.
//!
//! The trait is implemented by storage backends (e.g. `muni-store-sqlite`).
//! The resolvers depend on this abstraction, never on a concrete backend. Any
//! error a backend returns is surfaced as
//! [`Error::DirectoryUnavailable`](crate::Error::DirectoryUnavailable);
//! backends that impose deadlines report a timeout the same way.

use std::future::Future;

use crate::{
  geography::UserGeography,
  id::{DepartmentId, RoleGroupId, RoleId, UserId},
  user::{ActiveUser, RoleGroup},
};

/// Read-only lookups over the organisation directory.
///
/// Every `find_active_*` method must filter on the user's active flag; the
/// resolvers rely on it and never re-check.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EntityDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// The user with `id`, or `None` if absent or inactive.
  fn find_active_user_by_id(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<ActiveUser>, Self::Error>> + Send + '_;

  fn find_active_users_by_role(
    &self,
    role_id: RoleId,
  ) -> impl Future<Output = Result<Vec<ActiveUser>, Self::Error>> + Send + '_;

  fn find_active_users_by_department(
    &self,
    department_id: DepartmentId,
  ) -> impl Future<Output = Result<Vec<ActiveUser>, Self::Error>> + Send + '_;

  /// Active users whose role code is any of `codes`.
  fn find_active_users_by_role_codes_any<'a>(
    &'a self,
    codes: &'a [String],
  ) -> impl Future<Output = Result<Vec<ActiveUser>, Self::Error>> + Send + 'a;

  fn find_all_active_users(
    &self,
  ) -> impl Future<Output = Result<Vec<ActiveUser>, Self::Error>> + Send + '_;

  // ── Groupings ─────────────────────────────────────────────────────────

  /// A role group regardless of its active flag; the resolver decides.
  fn find_role_group(
    &self,
    id: RoleGroupId,
  ) -> impl Future<Output = Result<Option<RoleGroup>, Self::Error>> + Send + '_;

  /// Active members of the team managed by `manager_id`.
  ///
  /// Only rows with an active membership whose member is an active user. The
  /// manager is *not* included; the resolver adds them.
  fn find_team_members(
    &self,
    manager_id: UserId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + '_;

  // ── Geography ─────────────────────────────────────────────────────────

  fn find_geography(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<UserGeography>, Self::Error>> + Send + '_;
}
