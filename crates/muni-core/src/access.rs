//! [`AccessCore`]: the two call-level operations distribution and listing
//! flows embed: recipient resolution and visibility-predicate construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::EntityDirectory,
  geography::{GeographyResolver, UserGeography},
  id::UserId,
  recipient::{RecipientResolver, ResolvedRecipientSet},
  roles::GlobalRoleSet,
  target::{TargetSpec, validate_all},
  visibility::{VisibilityPredicate, scope},
};

/// The identity a listing flow already holds for its caller, typically from
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
  pub user_id:   UserId,
  /// Role code from the session, if known. Lets global callers skip the
  /// geography lookup.
  #[serde(default)]
  pub role_code: Option<String>,
}

/// Stateless facade over an [`EntityDirectory`] and the static
/// [`GlobalRoleSet`].
///
/// Cloning is cheap and every call is independent, so one instance can be
/// shared across request handlers.
pub struct AccessCore<D> {
  directory: Arc<D>,
  roles:     Arc<GlobalRoleSet>,
}

impl<D> Clone for AccessCore<D> {
  fn clone(&self) -> Self {
    Self { directory: Arc::clone(&self.directory), roles: Arc::clone(&self.roles) }
  }
}

impl<D> AccessCore<D>
where
  D: EntityDirectory,
{
  pub fn new(directory: Arc<D>, roles: Arc<GlobalRoleSet>) -> Self {
    Self { directory, roles }
  }

  pub fn directory(&self) -> &D { &self.directory }

  pub fn roles(&self) -> &GlobalRoleSet { &self.roles }

  /// Validate `targets` and expand them into active recipients.
  ///
  /// Every target is validated before the directory is touched.
  #[tracing::instrument(level = "debug", skip_all, fields(targets = targets.len()))]
  pub async fn resolve_recipients(
    &self,
    targets: &[TargetSpec],
  ) -> Result<ResolvedRecipientSet> {
    let targets = validate_all(targets)?;
    let recipients = RecipientResolver::new(self.directory.as_ref())
      .resolve(&targets)
      .await
      .inspect_err(|e| {
        if let Error::DirectoryUnavailable(source) = e {
          tracing::warn!(error = %source, "recipient resolution aborted");
        }
      })?;
    tracing::debug!(recipients = recipients.len(), "resolved recipients");
    Ok(recipients)
  }

  /// The caller's geography, looked up in the directory.
  pub async fn geography_of(&self, user_id: UserId) -> Result<UserGeography> {
    GeographyResolver::new(self.directory.as_ref())
      .geography_of(user_id)
      .await
  }

  /// Build the visibility predicate for `user_id` from its directory record.
  #[tracing::instrument(level = "debug", skip(self))]
  pub async fn build_visibility_predicate(
    &self,
    user_id: UserId,
  ) -> Result<VisibilityPredicate> {
    let geography = self.geography_of(user_id).await?;
    let is_global = self.roles.is_global(&geography.role_code);
    Ok(scope(&geography, is_global))
  }

  /// Like [`Self::build_visibility_predicate`], but callers whose session role
  /// is already known to be global are answered without a directory lookup.
  pub async fn build_visibility_predicate_for(
    &self,
    caller: &Caller,
  ) -> Result<VisibilityPredicate> {
    if let Some(code) = caller.role_code.as_deref()
      && self.roles.is_global(code)
    {
      return Ok(VisibilityPredicate::Unrestricted);
    }
    self.build_visibility_predicate(caller.user_id).await
  }
}
