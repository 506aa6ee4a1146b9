//! Directory service configuration.

use std::env;

use userdir_core::query::DEFAULT_PAGE_SIZE;

/// Configuration for the user directory service.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Optional pepper prepended to credentials before Argon2id hashing.
    pub pepper: Option<String>,
    /// Page size used when a listing request does not name one.
    pub default_page_size: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DirectoryConfig {
    /// Read `USERDIR_PEPPER` and `USERDIR_DEFAULT_PAGE_SIZE`. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            pepper: lookup("USERDIR_PEPPER").filter(|p| !p.is_empty()),
            default_page_size: lookup("USERDIR_DEFAULT_PAGE_SIZE")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.default_page_size),
        }
    }
}
