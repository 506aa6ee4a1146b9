//! User directory database: SurrealDB connection management, schema
//! migrations, repository implementations and the transactional unit of
//! work.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repositories for users, roles and permissions ([`repository`])
//! - Atomic write batches ([`SurrealUnitOfWork`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod unit_of_work;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use unit_of_work::{SurrealUnitOfWork, SurrealUnitOfWorkFactory};
