//! SurrealDB implementation of [`UnitOfWork`].
//!
//! Writes are buffered as SurrealQL statements with per-statement bind
//! names and sent on commit as one `BEGIN TRANSACTION … COMMIT
//! TRANSACTION` query, so SurrealDB applies all of them or none.
//!
//! Writes against an existing user are preceded by an in-transaction
//! existence check of that user, so a user deleted after it was read
//! aborts the whole script instead of leaving orphan permissions.

use std::collections::BTreeSet;

use serde_json::{Value, json};
use surrealdb::{Connection, Surreal};
use tracing::debug;
use userdir_core::error::DirectoryResult;
use userdir_core::models::permission::PermissionChange;
use userdir_core::models::user::UserChange;
use userdir_core::repository::{UnitOfWork, UnitOfWorkFactory};
use uuid::Uuid;

use crate::error::DbError;

/// Creates one [`SurrealUnitOfWork`] per directory operation.
#[derive(Clone)]
pub struct SurrealUnitOfWorkFactory<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUnitOfWorkFactory<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UnitOfWorkFactory for SurrealUnitOfWorkFactory<C> {
    type UnitOfWork = SurrealUnitOfWork<C>;

    fn begin(&self) -> Self::UnitOfWork {
        SurrealUnitOfWork::new(self.db.clone())
    }
}

/// Prefix of the error thrown when a guarded user no longer exists.
const MISSING_USER: &str = "missing user ";

/// A buffered SurrealDB transaction.
pub struct SurrealUnitOfWork<C: Connection> {
    db: Surreal<C>,
    statements: Vec<String>,
    bindings: Vec<(String, Value)>,
    /// Users that must still exist when the script runs.
    guarded: BTreeSet<Uuid>,
    /// Users created by this unit of work.
    inserted: BTreeSet<Uuid>,
}

impl<C: Connection> SurrealUnitOfWork<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            statements: Vec::new(),
            bindings: Vec::new(),
            guarded: BTreeSet::new(),
            inserted: BTreeSet::new(),
        }
    }

    /// Users checked at the top of the script: every guarded user this unit
    /// of work does not create itself.
    fn guards(&self) -> impl Iterator<Item = &Uuid> {
        self.guarded.difference(&self.inserted)
    }

    /// Append a statement. `$name` placeholders in `template` are rewritten
    /// to `$w{n}_name` so binds from different statements never collide.
    fn push(&mut self, template: &str, binds: Vec<(&str, Value)>) {
        let prefix = format!("w{}_", self.statements.len());
        let mut sql = template.to_string();
        for (name, value) in binds {
            let scoped = format!("{prefix}{name}");
            sql = sql.replace(&format!("${name}"), &format!("${scoped}"));
            self.bindings.push((scoped, value));
        }
        self.statements.push(sql);
    }

    /// The full transaction script that [`commit`](UnitOfWork::commit) sends.
    pub fn script(&self) -> String {
        let mut lines: Vec<String> = self
            .guards()
            .map(|id| {
                format!(
                    "IF !record::exists(type::record('user', '{id}')) \
                     {{ THROW '{MISSING_USER}{id}'; }};"
                )
            })
            .collect();
        lines.extend(self.statements.iter().cloned());
        format!(
            "BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;",
            lines.join("\n")
        )
    }
}

/// Recover the user named by a failed guard, if that is why the
/// transaction failed.
fn missing_user(message: &str) -> Option<String> {
    let start = message.find(MISSING_USER)? + MISSING_USER.len();
    let id: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
        .collect();
    Uuid::parse_str(&id).ok().map(|id| id.to_string())
}

fn user_binds(user: &UserChange) -> Vec<(&'static str, Value)> {
    vec![
        ("id", json!(user.id.to_string())),
        ("first_name", json!(user.first_name)),
        ("last_name", json!(user.last_name)),
        ("email", json!(user.email)),
        ("phone", json!(user.phone)),
        ("role_id", json!(user.role_id.to_string())),
        ("username", json!(user.username)),
        ("password_hash", json!(user.password_hash)),
    ]
}

fn permission_binds(permission: &PermissionChange) -> Vec<(&'static str, Value)> {
    vec![
        ("id", json!(permission.id.to_string())),
        ("user_id", json!(permission.user_id.to_string())),
        ("readable", json!(permission.flags.readable)),
        ("writable", json!(permission.flags.writable)),
        ("deletable", json!(permission.flags.deletable)),
        ("label", json!(permission.label())),
    ]
}

impl<C: Connection> UnitOfWork for SurrealUnitOfWork<C> {
    fn insert_user(&mut self, user: &UserChange) {
        self.inserted.insert(user.id);
        self.push(
            "CREATE type::record('user', $id) SET \
             first_name = $first_name, last_name = $last_name, \
             email = $email, phone = $phone, role_id = $role_id, \
             username = $username, password_hash = $password_hash;",
            user_binds(user),
        );
    }

    fn update_user(&mut self, user: &UserChange) {
        self.guarded.insert(user.id);
        self.push(
            "UPDATE type::record('user', $id) SET \
             first_name = $first_name, last_name = $last_name, \
             email = $email, phone = $phone, role_id = $role_id, \
             username = $username, password_hash = $password_hash, \
             updated_at = time::now();",
            user_binds(user),
        );
    }

    fn delete_user(&mut self, id: Uuid) {
        self.push(
            "DELETE type::record('user', $id);",
            vec![("id", json!(id.to_string()))],
        );
    }

    fn insert_permission(&mut self, permission: &PermissionChange) {
        self.guarded.insert(permission.user_id);
        self.push(
            "CREATE type::record('permission', $id) SET \
             user_id = $user_id, readable = $readable, \
             writable = $writable, deletable = $deletable, label = $label;",
            permission_binds(permission),
        );
    }

    fn update_permission(&mut self, permission: &PermissionChange) {
        self.guarded.insert(permission.user_id);
        self.push(
            "UPDATE type::record('permission', $id) SET \
             readable = $readable, writable = $writable, \
             deletable = $deletable, label = $label, \
             updated_at = time::now() \
             WHERE user_id = $user_id;",
            permission_binds(permission),
        );
    }

    fn delete_permission(&mut self, id: Uuid) {
        self.push(
            "DELETE type::record('permission', $id);",
            vec![("id", json!(id.to_string()))],
        );
    }

    fn delete_user_permissions(&mut self, user_id: Uuid) {
        self.push(
            "DELETE permission WHERE user_id = $user_id;",
            vec![("user_id", json!(user_id.to_string()))],
        );
    }

    fn len(&self) -> usize {
        self.statements.len()
    }

    async fn commit(self) -> DirectoryResult<()> {
        if self.statements.is_empty() {
            return Ok(());
        }
        debug!(statements = self.statements.len(), "Committing unit of work");

        let script = self.script();
        let mut builder = self.db.query(&script);
        for binding in self.bindings {
            builder = builder.bind(binding);
        }

        let response = builder.await.map_err(DbError::from)?;
        if let Err(e) = response.check() {
            let message = e.to_string();
            return Err(match missing_user(&message) {
                Some(id) => DbError::NotFound {
                    entity: "user".into(),
                    id,
                },
                None => DbError::Transaction(message),
            }
            .into());
        }

        Ok(())
    }
}
