//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::labeler::permission_label;

/// The three independent capability flags of a permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityFlags {
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub deletable: bool,
}

impl CapabilityFlags {
    pub fn new(readable: bool, writable: bool, deletable: bool) -> Self {
        Self {
            readable,
            writable,
            deletable,
        }
    }

    pub fn label(&self) -> String {
        permission_label(*self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
    /// Derived from `flags` whenever they are written.
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A permission row as written by a unit of work (insert or update).
///
/// The label is private and always computed from the flags, so a write can
/// never carry a label that disagrees with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionChange {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flags: CapabilityFlags,
    label: String,
}

impl PermissionChange {
    pub fn new(id: Uuid, user_id: Uuid, flags: CapabilityFlags) -> Self {
        Self {
            id,
            user_id,
            flags,
            label: flags.label(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One entry of a submitted permission list.
///
/// `permission_id` is only trusted when it names a permission the user
/// already owns; anything else (absent, stale, foreign, not a UUID) yields
/// a freshly allocated permission. Inbound labels are not part of this type
/// and are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInput {
    #[serde(default)]
    pub permission_id: Option<String>,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
}

impl PermissionInput {
    pub fn new(flags: CapabilityFlags) -> Self {
        Self {
            permission_id: None,
            flags,
        }
    }

    pub fn with_id(id: impl Into<String>, flags: CapabilityFlags) -> Self {
        Self {
            permission_id: Some(id.into()),
            flags,
        }
    }

    /// The submitted identifier, if it is a well-formed UUID.
    pub fn parsed_id(&self) -> Option<Uuid> {
        self.permission_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id.trim()).ok())
    }
}
