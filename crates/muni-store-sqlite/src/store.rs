//! [`SqliteDirectory`] — the SQLite implementation of [`EntityDirectory`].

use std::path::Path;

use muni_core::{
  directory::EntityDirectory,
  geography::UserGeography,
  id::{DepartmentId, RoleGroupId, RoleId, UserId},
  user::{ActiveUser, RoleGroup},
  visibility::{LocationTagged, LocationTags, VisibilityPredicate},
};
use rusqlite::OptionalExtension as _;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  encode::{RawFileType, RawGeography, RawRoleGroup, RawUser, USER_COLUMNS},
  predicate::predicate_sql,
  schema::SCHEMA,
};

// ─── Catalog entities ────────────────────────────────────────────────────────

/// A file type from the location-tagged catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileType {
  pub id:       i64,
  pub name:     String,
  pub location: LocationTags,
}

impl LocationTagged for FileType {
  fn location(&self) -> LocationTags { self.location }
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// The organisation directory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDirectory {
  conn: tokio_rusqlite::Connection,
}

impl SqliteDirectory {
  /// Open (or create) a directory at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening directory");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory directory for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self.execute_batch(SCHEMA).await
  }

  /// Run a batch of SQL statements, e.g. fixture data.
  pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a user query whose only parameters are `params`, in order.
  async fn query_users(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<ActiveUser>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawUser::into_user).collect())
  }

  /// List the file types visible under `predicate`, ordered by id.
  pub async fn list_file_types(
    &self,
    predicate: &VisibilityPredicate,
  ) -> Result<Vec<FileType>> {
    let fragment = predicate_sql(predicate, "f");

    let raws: Vec<RawFileType> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT f.id, f.name, f.zone_id, f.division_id, f.district_id, f.town_id
           FROM file_types f
           WHERE {}
           ORDER BY f.id",
          fragment.sql
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(fragment.params), |row| {
            Ok(RawFileType {
              id:          row.get(0)?,
              name:        row.get(1)?,
              zone_id:     row.get(2)?,
              division_id: row.get(3)?,
              district_id: row.get(4)?,
              town_id:     row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawFileType::into_file_type).collect())
  }
}

// ─── EntityDirectory impl ────────────────────────────────────────────────────

impl EntityDirectory for SqliteDirectory {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_active_user_by_id(&self, id: UserId) -> Result<Option<ActiveUser>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1 AND u.is_active = 1"
              ),
              rusqlite::params![id.get()],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }

  async fn find_active_users_by_role(&self, role_id: RoleId) -> Result<Vec<ActiveUser>> {
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users u
           WHERE u.role_id = ? AND u.is_active = 1 ORDER BY u.id"
        ),
        vec![role_id.get().into()],
      )
      .await
  }

  async fn find_active_users_by_department(
    &self,
    department_id: DepartmentId,
  ) -> Result<Vec<ActiveUser>> {
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users u
           WHERE u.department_id = ? AND u.is_active = 1 ORDER BY u.id"
        ),
        vec![department_id.get().into()],
      )
      .await
  }

  async fn find_active_users_by_role_codes_any(
    &self,
    codes: &[String],
  ) -> Result<Vec<ActiveUser>> {
    if codes.is_empty() {
      return Ok(Vec::new());
    }
    let marks = vec!["?"; codes.len()].join(", ");
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users u
           JOIN roles r ON r.id = u.role_id
           WHERE r.code IN ({marks}) AND u.is_active = 1 ORDER BY u.id"
        ),
        codes.iter().cloned().map(Into::into).collect(),
      )
      .await
  }

  async fn find_all_active_users(&self) -> Result<Vec<ActiveUser>> {
    self
      .query_users(
        format!("SELECT {USER_COLUMNS} FROM users u WHERE u.is_active = 1 ORDER BY u.id"),
        Vec::new(),
      )
      .await
  }

  // ── Groupings ─────────────────────────────────────────────────────────────

  async fn find_role_group(&self, id: RoleGroupId) -> Result<Option<RoleGroup>> {
    let raw: Option<RawRoleGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, is_active, role_codes FROM role_groups WHERE id = ?1",
              rusqlite::params![id.get()],
              |row| {
                Ok(RawRoleGroup {
                  id:         row.get(0)?,
                  is_active:  row.get(1)?,
                  role_codes: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRoleGroup::into_role_group).transpose()
  }

  async fn find_team_members(&self, manager_id: UserId) -> Result<Vec<UserId>> {
    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.member_id
           FROM team_members t
           JOIN users u ON u.id = t.member_id
           WHERE t.manager_id = ?1 AND t.is_active = 1 AND u.is_active = 1
           ORDER BY t.member_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![manager_id.get()], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(UserId).collect())
  }

  // ── Geography ─────────────────────────────────────────────────────────────

  async fn find_geography(&self, user_id: UserId) -> Result<Option<UserGeography>> {
    let raw: Option<RawGeography> = self
      .conn
      .call(move |conn| {
        let Some(mut raw) = conn
          .query_row(
            "SELECT r.code, u.division_id, u.district_id, u.town_id, u.subtown_id
             FROM users u
             JOIN roles r ON r.id = u.role_id
             WHERE u.id = ?1",
            rusqlite::params![user_id.get()],
            |row| {
              Ok(RawGeography {
                role_code:   row.get(0)?,
                division_id: row.get(1)?,
                district_id: row.get(2)?,
                town_id:     row.get(3)?,
                subtown_id:  row.get(4)?,
                zone_ids:    Vec::new(),
              })
            },
          )
          .optional()?
        else {
          return Ok(None);
        };

        let mut stmt =
          conn.prepare("SELECT zone_id FROM user_zones WHERE user_id = ?1")?;
        raw.zone_ids = stmt
          .query_map(rusqlite::params![user_id.get()], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;

        Ok(Some(raw))
      })
      .await?;

    Ok(raw.map(RawGeography::into_geography))
  }
}
