//! Request and response shapes of the directory service.

use serde::{Deserialize, Serialize};
use userdir_core::models::permission::{Permission, PermissionInput};
use userdir_core::models::role::Role;
use userdir_core::models::user::User;
use uuid::Uuid;

/// Display format of `created_at` in user views.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scalar fields plus the permission list of a create or update request.
///
/// On create, `permission_id` values are ignored. On update they select
/// which stored permissions survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role_id: Uuid,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub permissions: Vec<PermissionInput>,
}

/// Weak role reference with its resolved name. `name` is `None` when the
/// referenced role does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: Uuid,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionView {
    pub id: Uuid,
    pub label: String,
}

impl From<&Permission> for PermissionView {
    fn from(p: &Permission) -> Self {
        Self {
            id: p.id,
            label: p.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: RoleRef,
    pub username: String,
    pub permissions: Vec<PermissionView>,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub created_at: String,
}

impl UserView {
    pub fn new(user: &User, role: RoleRef, permissions: &[Permission]) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role,
            username: user.username.clone(),
            permissions: permissions.iter().map(PermissionView::from).collect(),
            created_at: user.created_at.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

/// One page of the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<UserView>,
    pub page_number: u64,
    pub page_size: u64,
    /// Size of the filtered set, independent of the page requested.
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
    pub id: Uuid,
    pub name: String,
}

impl From<Role> for RoleView {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

/// A stored permission with its flags, as returned by the permission
/// listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRecordView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub readable: bool,
    pub writable: bool,
    pub deletable: bool,
    pub label: String,
}

impl From<Permission> for PermissionRecordView {
    fn from(p: Permission) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            readable: p.flags.readable,
            writable: p.flags.writable,
            deletable: p.flags.deletable,
            label: p.label,
        }
    }
}
