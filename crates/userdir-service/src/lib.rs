//! User directory service: create, fetch, list, update and delete user
//! accounts together with their permission sets.

pub mod config;
pub mod dto;
pub mod password;
pub mod service;

pub use config::DirectoryConfig;
pub use dto::{PermissionView, RoleRef, UserInput, UserPage, UserView};
pub use service::UserDirectoryService;
