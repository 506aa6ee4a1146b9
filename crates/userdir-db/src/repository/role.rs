//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use userdir_core::error::DirectoryResult;
use userdir_core::models::role::{CreateRole, Role};
use userdir_core::repository::RoleRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        Ok(Role {
            id: parse_uuid(&self.record_id, "role")?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> DirectoryResult<Role> {
        let id = Uuid::new_v4();

        self.db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, description = $description",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> DirectoryResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.try_into_role()?)
    }

    async fn list(&self) -> DirectoryResult<Vec<Role>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM role ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
