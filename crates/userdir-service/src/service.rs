//! User directory service: create, read, update and delete orchestration.

use std::collections::HashMap;

use tracing::{debug, info};
use userdir_core::error::{DirectoryError, DirectoryResult};
use userdir_core::models::permission::{Permission, PermissionChange};
use userdir_core::models::user::{User, UserChange};
use userdir_core::query::{UserFilterRequest, UserQuery};
use userdir_core::reconcile::reconcile;
use userdir_core::repository::{
    PaginatedResult, Pagination, PermissionRepository, RoleRepository, UnitOfWork,
    UnitOfWorkFactory, UserRepository,
};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::dto::{PermissionRecordView, RoleRef, RoleView, UserInput, UserPage, UserView};
use crate::password;

/// User directory service.
///
/// Generic over repository implementations so that the service has no
/// dependency on the database crate. Every mutating operation builds one
/// unit of work from `uow` and commits it once; an early return drops it
/// with nothing applied.
#[derive(Clone)]
pub struct UserDirectoryService<U, P, R, W>
where
    U: UserRepository,
    P: PermissionRepository,
    R: RoleRepository,
    W: UnitOfWorkFactory,
{
    users: U,
    permissions: P,
    roles: R,
    uow: W,
    config: DirectoryConfig,
}

/// Identifiers arrive as opaque strings; one that is not a UUID cannot
/// name a stored user.
fn parse_user_id(id: &str) -> DirectoryResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| DirectoryError::not_found("user", id))
}

impl<U, P, R, W> UserDirectoryService<U, P, R, W>
where
    U: UserRepository,
    P: PermissionRepository,
    R: RoleRepository,
    W: UnitOfWorkFactory,
{
    pub fn new(users: U, permissions: P, roles: R, uow: W, config: DirectoryConfig) -> Self {
        Self {
            users,
            permissions,
            roles,
            uow,
            config,
        }
    }

    /// Create a user and one permission per submitted entry.
    ///
    /// Submitted permission identifiers are ignored; every permission gets
    /// a fresh one.
    pub async fn create_user(&self, input: UserInput) -> DirectoryResult<UserView> {
        let user = self.user_change(Uuid::new_v4(), &input)?;

        let mut uow = self.uow.begin();
        uow.insert_user(&user);
        for entry in &input.permissions {
            uow.insert_permission(&PermissionChange::new(Uuid::new_v4(), user.id, entry.flags));
        }
        uow.commit().await?;

        info!(
            user_id = %user.id,
            permissions = input.permissions.len(),
            "User created"
        );

        self.project(user.id).await
    }

    /// Fetch a user with its resolved role and permissions.
    pub async fn get_user(&self, id: &str) -> DirectoryResult<UserView> {
        self.project(parse_user_id(id)?).await
    }

    /// One page of the user directory.
    pub async fn list_users(&self, request: &UserFilterRequest) -> DirectoryResult<UserPage> {
        let query = UserQuery::resolve_with_page_size(request, self.config.default_page_size);
        debug!(?query, "Listing users");

        let page = self.users.search(&query).await?;

        let user_ids: Vec<Uuid> = page.items.iter().map(|u| u.id).collect();
        let mut owned: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for permission in self.permissions.list_by_users(&user_ids).await? {
            owned.entry(permission.user_id).or_default().push(permission);
        }

        let mut roles: HashMap<Uuid, RoleRef> = HashMap::new();
        let mut items = Vec::with_capacity(page.items.len());
        for user in &page.items {
            let role = match roles.get(&user.role_id) {
                Some(role) => role.clone(),
                None => {
                    let role = self.resolve_role(user.role_id).await?;
                    roles.insert(user.role_id, role.clone());
                    role
                }
            };
            let permissions = owned.get(&user.id).map(Vec::as_slice).unwrap_or_default();
            items.push(UserView::new(user, role, permissions));
        }

        Ok(UserPage {
            items,
            page_number: query.page_number,
            page_size: query.page_size,
            total_count: page.total,
        })
    }

    /// Overwrite every scalar field and reconcile the permission set.
    ///
    /// Resubmitted permission identifiers are kept; unmatched entries are
    /// inserted and omitted permissions are deleted, all in one commit.
    pub async fn update_user(&self, id: &str, input: UserInput) -> DirectoryResult<UserView> {
        let user_id = parse_user_id(id)?;
        let existing = self.users.get_by_id(user_id).await?;
        let current = self.permissions.list_by_user(existing.id).await?;

        let user = self.user_change(existing.id, &input)?;
        let plan = reconcile(existing.id, &current, &input.permissions);

        let mut uow = self.uow.begin();
        uow.update_user(&user);
        for change in &plan.updates {
            uow.update_permission(change);
        }
        for change in &plan.inserts {
            uow.insert_permission(change);
        }
        for id in &plan.deletes {
            uow.delete_permission(*id);
        }
        uow.commit().await?;

        info!(
            user_id = %existing.id,
            updated = plan.updates.len(),
            inserted = plan.inserts.len(),
            deleted = plan.deletes.len(),
            "User updated"
        );

        self.project(existing.id).await
    }

    /// Delete a user and every permission it owns.
    pub async fn delete_user(&self, id: &str) -> DirectoryResult<()> {
        let user_id = parse_user_id(id)?;
        let user = self.users.get_by_id(user_id).await?;

        let mut uow = self.uow.begin();
        uow.delete_user_permissions(user.id);
        uow.delete_user(user.id);
        uow.commit().await?;

        info!(user_id = %user.id, "User deleted");
        Ok(())
    }

    /// Every role, ordered by name.
    pub async fn list_roles(&self) -> DirectoryResult<Vec<RoleView>> {
        let roles = self.roles.list().await?;
        Ok(roles.into_iter().map(RoleView::from).collect())
    }

    /// Every stored permission across all users, oldest first.
    pub async fn list_permissions(
        &self,
        pagination: Pagination,
    ) -> DirectoryResult<PaginatedResult<PermissionRecordView>> {
        let page = self.permissions.list(pagination).await?;
        Ok(PaginatedResult {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    fn user_change(&self, id: Uuid, input: &UserInput) -> DirectoryResult<UserChange> {
        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        Ok(UserChange {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            role_id: input.role_id,
            username: input.username.clone(),
            password_hash,
        })
    }

    /// Build the stored view of a user.
    async fn project(&self, user_id: Uuid) -> DirectoryResult<UserView> {
        let user: User = self.users.get_by_id(user_id).await?;
        let permissions = self.permissions.list_by_user(user.id).await?;
        let role = self.resolve_role(user.role_id).await?;
        Ok(UserView::new(&user, role, &permissions))
    }

    /// Look up the name behind a weak role reference. A dangling reference
    /// resolves to no name rather than an error.
    async fn resolve_role(&self, role_id: Uuid) -> DirectoryResult<RoleRef> {
        let name = match self.roles.get_by_id(role_id).await {
            Ok(role) => Some(role.name),
            Err(DirectoryError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(RoleRef { id: role_id, name })
    }
}
