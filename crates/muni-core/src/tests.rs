//! Resolution and scoping tests against an in-memory directory.

use std::{collections::BTreeMap, convert::Infallible, fmt, sync::Arc};

use crate::{
  AccessCore, Caller, Error,
  directory::EntityDirectory,
  geography::UserGeography,
  id::{DepartmentId, DivisionId, RoleGroupId, RoleId, UserId, ZoneId},
  recipient::ResolvedRecipientSet,
  roles::GlobalRoleSet,
  target::TargetSpec,
  user::{ActiveUser, RoleCodes, RoleGroup},
  visibility::{LocationTags, VisibilityPredicate},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryDirectory {
  /// Every user, active or not.
  users:       Vec<ActiveUser>,
  role_codes:  BTreeMap<i64, &'static str>,
  role_groups: Vec<RoleGroup>,
  /// `(manager, member, membership_active)`
  teams:       Vec<(i64, i64, bool)>,
  geographies: BTreeMap<i64, UserGeography>,
}

impl MemoryDirectory {
  fn active(&self) -> impl Iterator<Item = &ActiveUser> {
    self.users.iter().filter(|u| u.is_active)
  }

  fn with_user(mut self, id: i64, role: i64, dept: Option<i64>, active: bool) -> Self {
    self.users.push(ActiveUser {
      id:            UserId(id),
      is_active:     active,
      role_id:       RoleId(role),
      department_id: dept.map(DepartmentId),
      division_id:   None,
      district_id:   None,
      town_id:       None,
      subtown_id:    None,
    });
    self
  }
}

impl EntityDirectory for MemoryDirectory {
  type Error = Infallible;

  async fn find_active_user_by_id(
    &self,
    id: UserId,
  ) -> Result<Option<ActiveUser>, Infallible> {
    Ok(self.active().find(|u| u.id == id).cloned())
  }

  async fn find_active_users_by_role(
    &self,
    role_id: RoleId,
  ) -> Result<Vec<ActiveUser>, Infallible> {
    Ok(self.active().filter(|u| u.role_id == role_id).cloned().collect())
  }

  async fn find_active_users_by_department(
    &self,
    department_id: DepartmentId,
  ) -> Result<Vec<ActiveUser>, Infallible> {
    Ok(
      self
        .active()
        .filter(|u| u.department_id == Some(department_id))
        .cloned()
        .collect(),
    )
  }

  async fn find_active_users_by_role_codes_any(
    &self,
    codes: &[String],
  ) -> Result<Vec<ActiveUser>, Infallible> {
    Ok(
      self
        .active()
        .filter(|u| {
          self
            .role_codes
            .get(&u.role_id.get())
            .is_some_and(|code| codes.iter().any(|c| c == code))
        })
        .cloned()
        .collect(),
    )
  }

  async fn find_all_active_users(&self) -> Result<Vec<ActiveUser>, Infallible> {
    Ok(self.active().cloned().collect())
  }

  async fn find_role_group(
    &self,
    id: RoleGroupId,
  ) -> Result<Option<RoleGroup>, Infallible> {
    Ok(self.role_groups.iter().find(|g| g.id == id).cloned())
  }

  async fn find_team_members(
    &self,
    manager_id: UserId,
  ) -> Result<Vec<UserId>, Infallible> {
    Ok(
      self
        .teams
        .iter()
        .filter(|(m, _, active)| *m == manager_id.get() && *active)
        .map(|(_, member, _)| UserId(*member))
        .filter(|id| self.active().any(|u| u.id == *id))
        .collect(),
    )
  }

  async fn find_geography(
    &self,
    user_id: UserId,
  ) -> Result<Option<UserGeography>, Infallible> {
    Ok(self.geographies.get(&user_id.get()).cloned())
  }
}

/// A directory whose every lookup fails, and counts how often it was asked.
#[derive(Default)]
struct DownDirectory {
  calls: std::sync::atomic::AtomicUsize,
}

#[derive(Debug)]
struct Down;

impl fmt::Display for Down {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("connection refused")
  }
}

impl std::error::Error for Down {}

impl DownDirectory {
  fn fail<T>(&self) -> Result<T, Down> {
    self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    Err(Down)
  }

  fn calls(&self) -> usize { self.calls.load(std::sync::atomic::Ordering::SeqCst) }
}

impl EntityDirectory for DownDirectory {
  type Error = Down;

  async fn find_active_user_by_id(&self, _: UserId) -> Result<Option<ActiveUser>, Down> {
    self.fail()
  }

  async fn find_active_users_by_role(&self, _: RoleId) -> Result<Vec<ActiveUser>, Down> {
    self.fail()
  }

  async fn find_active_users_by_department(
    &self,
    _: DepartmentId,
  ) -> Result<Vec<ActiveUser>, Down> {
    self.fail()
  }

  async fn find_active_users_by_role_codes_any(
    &self,
    _: &[String],
  ) -> Result<Vec<ActiveUser>, Down> {
    self.fail()
  }

  async fn find_all_active_users(&self) -> Result<Vec<ActiveUser>, Down> { self.fail() }

  async fn find_role_group(&self, _: RoleGroupId) -> Result<Option<RoleGroup>, Down> {
    self.fail()
  }

  async fn find_team_members(&self, _: UserId) -> Result<Vec<UserId>, Down> { self.fail() }

  async fn find_geography(&self, _: UserId) -> Result<Option<UserGeography>, Down> {
    self.fail()
  }
}

/// Users 10, 11 (role 3, "ENG"), 12 (role 4, "XEN", dept 2), 13 (role 3,
/// inactive, dept 2), 14 (role 5, dept 2). User 10 is also in dept 2.
fn directory() -> MemoryDirectory {
  let mut dir = MemoryDirectory::default()
    .with_user(10, 3, Some(2), true)
    .with_user(11, 3, None, true)
    .with_user(12, 4, Some(2), true)
    .with_user(13, 3, Some(2), false)
    .with_user(14, 5, Some(2), true);
  dir.role_codes = BTreeMap::from([(3, "ENG"), (4, "XEN"), (5, "SDO")]);
  dir.role_groups = vec![
    RoleGroup {
      id:         RoleGroupId(7),
      is_active:  true,
      role_codes: RoleCodes::new(["ENG", "ENG"]),
    },
    RoleGroup {
      id:         RoleGroupId(8),
      is_active:  false,
      role_codes: RoleCodes::new(["XEN"]),
    },
    RoleGroup {
      id:         RoleGroupId(9),
      is_active:  true,
      role_codes: RoleCodes::default(),
    },
  ];
  dir.teams = vec![(12, 10, true), (12, 13, true), (12, 14, false)];
  dir.geographies = BTreeMap::from([
    (12, UserGeography {
      role_code: "XEN".into(),
      division_id: Some(DivisionId(5)),
      ..Default::default()
    }),
    (11, UserGeography { role_code: "ENG".into(), ..Default::default() }),
    (1, UserGeography { role_code: "SUPER_ADMIN".into(), ..Default::default() }),
  ]);
  dir
}

fn core_over<D: EntityDirectory>(dir: D) -> AccessCore<D> {
  AccessCore::new(Arc::new(dir), Arc::new(GlobalRoleSet::default()))
}

fn target(kind: &str, reference: i64) -> TargetSpec {
  TargetSpec::new(kind, Some(reference))
}

fn ids(set: &ResolvedRecipientSet) -> Vec<i64> {
  set.iter().map(|id| id.get()).collect()
}

// ─── Per-kind expansion ──────────────────────────────────────────────────────

#[tokio::test]
async fn user_target_resolves_active_user() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("USER", 11)]).await.unwrap();
  assert_eq!(ids(&set), [11]);
}

#[tokio::test]
async fn stale_user_reference_contributes_nothing() {
  let core = core_over(directory());
  let set = core
    .resolve_recipients(&[target("USER", 404), target("USER", 11)])
    .await
    .unwrap();
  assert_eq!(ids(&set), [11]);
}

#[tokio::test]
async fn role_target_skips_inactive_holders() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("ROLE", 3)]).await.unwrap();
  assert_eq!(ids(&set), [10, 11]);
}

#[tokio::test]
async fn department_target() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("DEPARTMENT", 2)]).await.unwrap();
  assert_eq!(ids(&set), [10, 12, 14]);
}

#[tokio::test]
async fn duplicate_role_codes_do_not_duplicate_recipients() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("ROLE_GROUP", 7)]).await.unwrap();
  assert_eq!(ids(&set), [10, 11]);
}

#[tokio::test]
async fn inactive_missing_or_empty_role_groups_contribute_nothing() {
  let core = core_over(directory());
  let set = core
    .resolve_recipients(&[
      target("ROLE_GROUP", 8),
      target("ROLE_GROUP", 9),
      target("ROLE_GROUP", 404),
    ])
    .await
    .unwrap();
  assert!(set.is_empty());
}

#[tokio::test]
async fn team_includes_manager_and_active_members_only() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("TEAM", 12)]).await.unwrap();
  // 13 is an inactive user; 14's membership is inactive.
  assert_eq!(ids(&set), [10, 12]);
}

#[tokio::test]
async fn team_manager_is_included_without_members() {
  let core = core_over(directory());
  let set = core.resolve_recipients(&[target("TEAM", 99)]).await.unwrap();
  assert_eq!(ids(&set), [99]);
}

#[tokio::test]
async fn everyone_returns_all_active_users() {
  let core = core_over(directory());
  let set = core
    .resolve_recipients(&[TargetSpec::new("EVERYONE", None)])
    .await
    .unwrap();
  assert_eq!(ids(&set), [10, 11, 12, 14]);
}

#[tokio::test]
async fn everyone_still_keeps_team_managers() {
  let core = core_over(directory());
  let set = core
    .resolve_recipients(&[TargetSpec::new("EVERYONE", None), target("TEAM", 99)])
    .await
    .unwrap();
  assert_eq!(ids(&set), [10, 11, 12, 14, 99]);
}

// ─── Aggregation properties ──────────────────────────────────────────────────

#[tokio::test]
async fn overlapping_targets_collapse() {
  let core = core_over(directory());
  let role = [target("ROLE", 3)];
  let dept = [target("DEPARTMENT", 2)];

  let a = core.resolve_recipients(&role).await.unwrap();
  let b = core.resolve_recipients(&dept).await.unwrap();
  let both = core
    .resolve_recipients(&[role[0].clone(), dept[0].clone()])
    .await
    .unwrap();

  // User 10 holds role 3 and sits in department 2.
  assert_eq!(both.len(), a.len() + b.len() - 1);
  assert_eq!(ids(&both), [10, 11, 12, 14]);
}

#[tokio::test]
async fn disjoint_targets_add_up() {
  let core = core_over(directory());
  let a = core.resolve_recipients(&[target("USER", 11)]).await.unwrap();
  let b = core.resolve_recipients(&[target("USER", 12)]).await.unwrap();
  let both = core
    .resolve_recipients(&[target("USER", 11), target("USER", 12)])
    .await
    .unwrap();
  assert_eq!(both.len(), a.len() + b.len());
}

#[tokio::test]
async fn resolution_is_idempotent_and_order_independent() {
  let core = core_over(directory());
  let targets = vec![
    target("TEAM", 12),
    target("ROLE_GROUP", 7),
    target("USER", 14),
    target("DEPARTMENT", 2),
  ];
  let mut reversed = targets.clone();
  reversed.reverse();

  let first = core.resolve_recipients(&targets).await.unwrap();
  let second = core.resolve_recipients(&targets).await.unwrap();
  let third = core.resolve_recipients(&reversed).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(first, third);
}

#[tokio::test]
async fn inactive_user_never_appears() {
  let core = core_over(directory());
  let set = core
    .resolve_recipients(&[
      target("USER", 13),
      target("ROLE", 3),
      target("DEPARTMENT", 2),
      target("TEAM", 12),
      TargetSpec::new("EVERYONE", None),
    ])
    .await
    .unwrap();
  assert!(!set.contains(UserId(13)));
}

// ─── Failure semantics ───────────────────────────────────────────────────────

#[tokio::test]
async fn validation_fails_before_directory_access() {
  let core = core_over(DownDirectory::default());
  let err = core
    .resolve_recipients(&[target("ROLE", 3), TargetSpec::new("ROLE", None)])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(core.directory().calls(), 0);

  let err = core
    .resolve_recipients(&[target("COMMITTEE", 1)])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(core.directory().calls(), 0);
}

#[tokio::test]
async fn directory_failure_aborts_resolution() {
  let core = core_over(DownDirectory::default());
  let err = core
    .resolve_recipients(&[target("TEAM", 12)])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DirectoryUnavailable(_)));
  assert!(err.to_string().contains("connection refused"));
}

// ─── Geography and visibility ────────────────────────────────────────────────

#[tokio::test]
async fn geography_lookup_for_missing_user_is_not_found() {
  let core = core_over(directory());
  let err = core.geography_of(UserId(404)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "user", id: 404 }));
}

#[tokio::test]
async fn predicate_scopes_by_division() {
  let core = core_over(directory());
  let pred = core.build_visibility_predicate(UserId(12)).await.unwrap();

  let division = |id| LocationTags { division_id: Some(DivisionId(id)), ..Default::default() };
  assert!(pred.matches(&division(5)));
  assert!(pred.matches(&LocationTags::default()));
  assert!(!pred.matches(&division(9)));
}

#[tokio::test]
async fn predicate_for_unplaced_user_admits_untagged_only() {
  let core = core_over(directory());
  let pred = core.build_visibility_predicate(UserId(11)).await.unwrap();
  assert_eq!(pred, VisibilityPredicate::untagged_only());
  assert!(!pred.matches(&LocationTags {
    zone_id: Some(ZoneId(1)),
    ..Default::default()
  }));
}

#[tokio::test]
async fn top_admin_from_directory_is_unrestricted() {
  let core = core_over(directory());
  let pred = core.build_visibility_predicate(UserId(1)).await.unwrap();
  assert!(pred.is_unrestricted());
}

#[tokio::test]
async fn listed_global_role_is_unrestricted() {
  let core = AccessCore::new(
    Arc::new(directory()),
    Arc::new(GlobalRoleSet::new(["SUPER_ADMIN", "ADMIN"], ["XEN"])),
  );
  let pred = core.build_visibility_predicate(UserId(12)).await.unwrap();
  assert!(pred.is_unrestricted());
}

#[tokio::test]
async fn global_session_role_skips_directory() {
  let core = core_over(DownDirectory::default());
  let caller = Caller { user_id: UserId(1), role_code: Some("ADMIN".into()) };
  let pred = core.build_visibility_predicate_for(&caller).await.unwrap();
  assert!(pred.is_unrestricted());
  assert_eq!(core.directory().calls(), 0);
}

#[tokio::test]
async fn non_global_session_role_falls_back_to_lookup() {
  let core = core_over(DownDirectory::default());
  let caller = Caller { user_id: UserId(12), role_code: Some("XEN".into()) };
  let err = core.build_visibility_predicate_for(&caller).await.unwrap_err();
  assert!(matches!(err, Error::DirectoryUnavailable(_)));
  assert_eq!(core.directory().calls(), 1);
}
