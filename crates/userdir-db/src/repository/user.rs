//! SurrealDB implementation of [`UserRepository`].
//!
//! Directory searches are pushed down as SurrealQL. The filter lowercases
//! both sides so it agrees with [`UserQuery::matches`], and the ordering
//! mirrors [`UserQuery::compare`]: lowercased sort column first, record id
//! second, both in the requested direction.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use userdir_core::error::DirectoryResult;
use userdir_core::models::user::User;
use userdir_core::query::UserQuery;
use userdir_core::repository::{PaginatedResult, UserRepository};
use uuid::Uuid;

use super::window_bound;
use crate::error::{DbError, parse_uuid};

/// Fields searched by the directory filter.
const SEARCH_COLUMNS: [&str; 4] = ["first_name", "last_name", "email", "username"];

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    role_id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            role_id: parse_uuid(&self.role_id, "role")?,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// `WHERE` clause for the search term, empty when the query is unfiltered.
fn search_clause(query: &UserQuery) -> String {
    if query.search.is_none() {
        return String::new();
    }
    let terms: Vec<String> = SEARCH_COLUMNS
        .iter()
        .map(|col| format!("string::contains(string::lowercase({col}), $search)"))
        .collect();
    format!(" WHERE {}", terms.join(" OR "))
}

/// Projection of the lowercased sort column. Column and direction come
/// from closed enums, never from caller text.
fn sort_key_projection(query: &UserQuery) -> String {
    format!("string::lowercase({}) AS sort_key", query.sort_field.column())
}

fn order_clause(query: &UserQuery) -> String {
    let dir = query.sort_direction.keyword();
    format!(" ORDER BY sort_key {dir}, record_id {dir}")
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> DirectoryResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn search(&self, query: &UserQuery) -> DirectoryResult<PaginatedResult<User>> {
        let total = self.count(query).await?;
        if query.offset() >= total {
            return Ok(PaginatedResult {
                items: Vec::new(),
                total,
                offset: query.offset(),
                limit: query.limit(),
            });
        }

        let sql = format!(
            "SELECT meta::id(id) AS record_id, {}, * FROM user{}{} \
             LIMIT $limit START $offset",
            sort_key_projection(query),
            search_clause(query),
            order_clause(query),
        );

        let mut builder = self
            .db
            .query(&sql)
            .bind(("limit", window_bound(query.limit())))
            .bind(("offset", window_bound(query.offset())));
        if let Some(search) = query.search.clone() {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: query.offset(),
            limit: query.limit(),
        })
    }

    async fn count(&self, query: &UserQuery) -> DirectoryResult<u64> {
        let sql = format!(
            "SELECT count() AS total FROM user{} GROUP ALL",
            search_clause(query)
        );

        let mut builder = self.db.query(&sql);
        if let Some(search) = query.search.clone() {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
