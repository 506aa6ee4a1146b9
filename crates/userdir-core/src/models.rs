//! Domain models for the user directory.

pub mod permission;
pub mod role;
pub mod user;
