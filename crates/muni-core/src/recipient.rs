//! Recipient resolution: expand distribution targets into the concrete set of
//! active users that should receive an item.
//!
//! Expansion per target kind:
//!
//! | Kind | Contributes |
//! |------|-------------|
//! | `USER` | the user, if active |
//! | `ROLE` | active users holding the role |
//! | `ROLE_GROUP` | active users holding any of the group's role codes, if the group is active |
//! | `TEAM` | the manager (always) plus active team members |
//! | `DEPARTMENT` | active users in the department |
//! | `EVERYONE` | every active user |
//!
//! Contributions are unioned, so the result is independent of target order and
//! of overlaps between targets. Stale references contribute nothing; directory
//! failures abort the whole resolution.

use std::collections::{BTreeSet, btree_set};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::EntityDirectory,
  id::{RoleGroupId, UserId},
  target::DistributionTarget,
  user::ActiveUser,
};

// ─── Result set ──────────────────────────────────────────────────────────────

/// The deduplicated output of a resolution call.
///
/// Ordered by user id so repeated resolutions serialise identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedRecipientSet(BTreeSet<UserId>);

impl ResolvedRecipientSet {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, id: UserId) -> bool { self.0.contains(&id) }

  pub fn iter(&self) -> btree_set::Iter<'_, UserId> { self.0.iter() }

  pub fn into_vec(self) -> Vec<UserId> { self.0.into_iter().collect() }

  fn insert(&mut self, id: UserId) { self.0.insert(id); }

  fn extend_active(&mut self, users: impl IntoIterator<Item = ActiveUser>) {
    self
      .0
      .extend(users.into_iter().filter(|u| u.is_active).map(|u| u.id));
  }
}

impl IntoIterator for ResolvedRecipientSet {
  type IntoIter = btree_set::IntoIter<UserId>;
  type Item = UserId;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl FromIterator<UserId> for ResolvedRecipientSet {
  fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Expands [`DistributionTarget`]s against an [`EntityDirectory`].
pub struct RecipientResolver<'a, D> {
  directory: &'a D,
}

impl<'a, D> RecipientResolver<'a, D>
where
  D: EntityDirectory,
{
  pub fn new(directory: &'a D) -> Self { Self { directory } }

  /// Resolve `targets` into the set of active recipients.
  pub async fn resolve(
    &self,
    targets: &[DistributionTarget],
  ) -> Result<ResolvedRecipientSet> {
    let mut recipients = ResolvedRecipientSet::default();
    let mut role_codes = BTreeSet::new();

    for target in plan(targets) {
      match target {
        DistributionTarget::User(id) => {
          match self
            .directory
            .find_active_user_by_id(id)
            .await
            .map_err(Error::directory)?
          {
            Some(user) => recipients.extend_active([user]),
            None => tracing::debug!(%id, "user target is absent or inactive"),
          }
        }
        DistributionTarget::Role(role_id) => {
          let users = self
            .directory
            .find_active_users_by_role(role_id)
            .await
            .map_err(Error::directory)?;
          recipients.extend_active(users);
        }
        DistributionTarget::RoleGroup(group_id) => {
          role_codes.extend(self.role_group_codes(group_id).await?);
        }
        DistributionTarget::Team(manager_id) => {
          recipients.insert(manager_id);
          let members = self
            .directory
            .find_team_members(manager_id)
            .await
            .map_err(Error::directory)?;
          recipients.0.extend(members);
        }
        DistributionTarget::Department(department_id) => {
          let users = self
            .directory
            .find_active_users_by_department(department_id)
            .await
            .map_err(Error::directory)?;
          recipients.extend_active(users);
        }
        DistributionTarget::Everyone => {
          let users = self
            .directory
            .find_all_active_users()
            .await
            .map_err(Error::directory)?;
          recipients.extend_active(users);
        }
      }
    }

    // All role groups share one lookup.
    if !role_codes.is_empty() {
      let codes: Vec<String> = role_codes.into_iter().collect();
      let users = self
        .directory
        .find_active_users_by_role_codes_any(&codes)
        .await
        .map_err(Error::directory)?;
      recipients.extend_active(users);
    }

    Ok(recipients)
  }

  /// The deduplicated role codes of an active group; empty for a missing or
  /// inactive group.
  async fn role_group_codes(&self, id: RoleGroupId) -> Result<Vec<String>> {
    let group = self
      .directory
      .find_role_group(id)
      .await
      .map_err(Error::directory)?;
    match group {
      Some(group) if group.is_active => Ok(group.role_codes.deduplicated()),
      Some(_) => {
        tracing::debug!(%id, "role group is inactive");
        Ok(Vec::new())
      }
      None => {
        tracing::debug!(%id, "role group not found");
        Ok(Vec::new())
      }
    }
  }
}

/// Collapse identical targets. `EVERYONE` already covers every active user,
/// so only team targets survive beside it: a team manager is included even
/// when inactive.
fn plan(targets: &[DistributionTarget]) -> BTreeSet<DistributionTarget> {
  let mut unique: BTreeSet<_> = targets.iter().copied().collect();
  if unique.contains(&DistributionTarget::Everyone) {
    unique.retain(|t| {
      matches!(t, DistributionTarget::Everyone | DistributionTarget::Team(_))
    });
  }
  unique
}
