//! Repository trait definitions for data access abstraction.
//!
//! Reads go through the repositories. Writes are buffered in a
//! [`UnitOfWork`] and applied together by [`UnitOfWork::commit`], which
//! gives each directory operation all-or-nothing semantics.

use uuid::Uuid;

use crate::error::DirectoryResult;
use crate::models::{
    permission::{Permission, PermissionChange},
    role::{CreateRole, Role},
    user::{User, UserChange},
};
use crate::query::UserQuery;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DirectoryResult<User>> + Send;

    /// Filter, order and window the user collection as described by
    /// `query`. `total` counts the filtered set before windowing.
    fn search(
        &self,
        query: &UserQuery,
    ) -> impl Future<Output = DirectoryResult<PaginatedResult<User>>> + Send;

    /// Number of users matching the search term of `query`.
    fn count(&self, query: &UserQuery) -> impl Future<Output = DirectoryResult<u64>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DirectoryResult<Permission>> + Send;

    /// All permissions owned by a user, oldest first.
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DirectoryResult<Vec<Permission>>> + Send;

    /// All permissions owned by any of `user_ids`, oldest first.
    fn list_by_users(
        &self,
        user_ids: &[Uuid],
    ) -> impl Future<Output = DirectoryResult<Vec<Permission>>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = DirectoryResult<PaginatedResult<Permission>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = DirectoryResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DirectoryResult<Role>> + Send;
    fn list(&self) -> impl Future<Output = DirectoryResult<Vec<Role>>> + Send;
}

/// A buffered set of writes applied atomically.
///
/// Nothing reaches the store before [`commit`](UnitOfWork::commit). A unit
/// of work dropped without committing is discarded.
pub trait UnitOfWork: Send {
    fn insert_user(&mut self, user: &UserChange);
    fn update_user(&mut self, user: &UserChange);
    fn delete_user(&mut self, id: Uuid);
    fn insert_permission(&mut self, permission: &PermissionChange);
    fn update_permission(&mut self, permission: &PermissionChange);
    fn delete_permission(&mut self, id: Uuid);
    /// Remove every permission owned by `user_id`.
    fn delete_user_permissions(&mut self, user_id: Uuid);

    /// Number of buffered writes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn commit(self) -> impl Future<Output = DirectoryResult<()>> + Send;
}

/// Hands out a fresh [`UnitOfWork`] per directory operation.
pub trait UnitOfWorkFactory: Send + Sync {
    type UnitOfWork: UnitOfWork;

    fn begin(&self) -> Self::UnitOfWork;
}
