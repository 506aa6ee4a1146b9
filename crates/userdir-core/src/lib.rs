//! User directory core: domain models, the permission labeler and
//! reconciler, the user query engine, and the store traits implemented
//! by `userdir-db`.

pub mod error;
pub mod labeler;
pub mod models;
pub mod query;
pub mod reconcile;
pub mod repository;

pub use error::{DirectoryError, DirectoryResult};
