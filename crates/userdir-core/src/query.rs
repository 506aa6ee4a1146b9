//! User directory query engine.
//!
//! A raw [`UserFilterRequest`] is resolved into a [`UserQuery`] with every
//! optional knob defaulted. The resolved query can be evaluated in memory
//! with [`UserQuery::apply`] or pushed down to a store, which must honour
//! the same filter, ordering and window.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::repository::{PaginatedResult, Pagination};

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Token selecting descending order. Compared case-insensitively.
const DESCENDING_TOKEN: &str = "desc";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    FirstName,
    LastName,
    Email,
}

impl SortField {
    /// Anything unrecognised, including an absent value, sorts by first name.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("lastname" | "last_name") => Self::LastName,
            Some("email") => Self::Email,
            _ => Self::FirstName,
        }
    }

    /// Column name in the `user` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
        }
    }

    fn key<'a>(&self, user: &'a User) -> &'a str {
        match self {
            Self::FirstName => &user.first_name,
            Self::LastName => &user.last_name,
            Self::Email => &user.email,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case(DESCENDING_TOKEN) => Self::Descending,
            _ => Self::Ascending,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Directory listing request as received from a caller. Every field is
/// optional and malformed values degrade to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilterRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_direction: Option<String>,
    #[serde(default)]
    pub page_number: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// A fully resolved directory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Lowercased search term; `None` disables filtering.
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// 1-indexed, never below 1.
    pub page_number: u64,
    /// Never below 1.
    pub page_size: u64,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl UserQuery {
    /// Resolve a request with the stock default page size.
    pub fn resolve(request: &UserFilterRequest) -> Self {
        Self::resolve_with_page_size(request, DEFAULT_PAGE_SIZE)
    }

    /// Resolve a request. Non-positive page numbers and sizes clamp to 1.
    pub fn resolve_with_page_size(request: &UserFilterRequest, default_page_size: u64) -> Self {
        let search = request
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Self {
            search,
            sort_field: SortField::parse(request.sort_field.as_deref()),
            sort_direction: SortDirection::parse(request.sort_direction.as_deref()),
            page_number: clamp_positive(request.page_number, DEFAULT_PAGE_NUMBER),
            page_size: clamp_positive(request.page_size, default_page_size.max(1)),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset(),
            limit: self.limit(),
        }
    }

    /// Case-insensitive substring match on first name, last name, email
    /// or username.
    pub fn matches(&self, user: &User) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        [&user.first_name, &user.last_name, &user.email, &user.username]
            .into_iter()
            .any(|field| field.to_lowercase().contains(term))
    }

    /// Total order on users: the lowercased sort key first, then the user
    /// id, both in the requested direction.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let ordering = self
            .sort_field
            .key(a)
            .to_lowercase()
            .cmp(&self.sort_field.key(b).to_lowercase())
            .then_with(|| a.id.cmp(&b.id));
        match self.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Evaluate the query over an in-memory collection.
    pub fn apply<'a>(&self, users: &'a [User]) -> PaginatedResult<&'a User> {
        let mut filtered: Vec<&User> = users.iter().filter(|u| self.matches(u)).collect();
        filtered.sort_by(|a, b| self.compare(a, b));

        let total = filtered.len() as u64;
        let items = filtered
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit()).unwrap_or(usize::MAX))
            .collect();

        PaginatedResult {
            items,
            total,
            offset: self.offset(),
            limit: self.limit(),
        }
    }
}

fn clamp_positive(value: Option<i64>, default: u64) -> u64 {
    match value {
        Some(v) if v >= 1 => v as u64,
        Some(_) => 1,
        None => default,
    }
}
