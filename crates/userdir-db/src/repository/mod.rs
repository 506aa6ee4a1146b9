//! SurrealDB repository implementations.

mod permission;
mod role;
mod user;

pub use permission::SurrealPermissionRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;

/// SurrealDB reads `LIMIT` and `START` as signed integers.
pub(crate) fn window_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
