//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use userdir_core::error::DirectoryResult;
use userdir_core::models::permission::{CapabilityFlags, Permission};
use userdir_core::repository::{PaginatedResult, Pagination, PermissionRepository};
use uuid::Uuid;

use super::window_bound;
use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    user_id: String,
    readable: bool,
    writable: bool,
    deletable: bool,
    label: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        Ok(Permission {
            id: parse_uuid(&self.record_id, "permission")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            flags: CapabilityFlags::new(self.readable, self.writable, self.deletable),
            label: self.label,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn into_permissions(rows: Vec<PermissionRowWithId>) -> Result<Vec<Permission>, DbError> {
    rows.into_iter()
        .map(|row| row.try_into_permission())
        .collect()
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> DirectoryResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('permission', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> DirectoryResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC, record_id ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_permissions(rows)?)
    }

    async fn list_by_users(&self, user_ids: &[Uuid]) -> DirectoryResult<Vec<Permission>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = user_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE user_id IN $user_ids \
                 ORDER BY created_at ASC, record_id ASC",
            )
            .bind(("user_ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_permissions(rows)?)
    }

    async fn list(&self, pagination: Pagination) -> DirectoryResult<PaginatedResult<Permission>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM permission GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);
        if pagination.offset >= total {
            return Ok(PaginatedResult {
                items: Vec::new(),
                total,
                offset: pagination.offset,
                limit: pagination.limit,
            });
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY created_at ASC, record_id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", window_bound(pagination.limit)))
            .bind(("offset", window_bound(pagination.offset)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_permissions(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
