//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Weak reference to a [`Role`](super::role::Role).
    pub role_id: Uuid,
    pub username: String,
    /// Argon2id PHC string. Never copied into any view type.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user row as written by a unit of work.
///
/// Timestamps are owned by the store: `created_at` is set once on insert
/// and never rewritten, `updated_at` is bumped on every update.
#[derive(Debug, Clone)]
pub struct UserChange {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role_id: Uuid,
    pub username: String,
    pub password_hash: String,
}
