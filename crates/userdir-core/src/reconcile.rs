//! Permission-set reconciliation.
//!
//! Converges a user's stored permissions to a submitted target list with a
//! key-based diff instead of delete-all-then-insert, so identifiers of
//! resubmitted permissions survive an update.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::permission::{Permission, PermissionChange, PermissionInput};

/// The writes needed to move a user's permissions to a submitted target.
///
/// `updates`, `inserts` and `deletes` are disjoint by identifier. Every
/// submitted entry lands in exactly one of `updates` or `inserts`; every
/// current permission that was not resubmitted lands in `deletes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub updates: Vec<PermissionChange>,
    pub inserts: Vec<PermissionChange>,
    pub deletes: Vec<Uuid>,
}

impl ReconcilePlan {
    pub fn is_update_only(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }

    /// The permissions the user owns once the plan is applied, in
    /// submission order.
    pub fn resulting(&self) -> impl Iterator<Item = &PermissionChange> {
        self.updates.iter().chain(self.inserts.iter())
    }
}

/// Reconcile with freshly generated v4 identifiers for inserts.
pub fn reconcile(
    user_id: Uuid,
    current: &[Permission],
    submitted: &[PermissionInput],
) -> ReconcilePlan {
    reconcile_with(user_id, current, submitted, Uuid::new_v4)
}

/// Reconcile using `next_id` to allocate identifiers for inserts.
///
/// A submitted identifier is honoured only if it names a current permission
/// not already claimed earlier in the same submission. A repeated
/// identifier therefore yields a second, new permission rather than two
/// writes to the same record.
pub fn reconcile_with(
    user_id: Uuid,
    current: &[Permission],
    submitted: &[PermissionInput],
    mut next_id: impl FnMut() -> Uuid,
) -> ReconcilePlan {
    let existing: HashMap<Uuid, &Permission> = current.iter().map(|p| (p.id, p)).collect();
    let mut claimed: HashSet<Uuid> = HashSet::with_capacity(submitted.len());
    let mut plan = ReconcilePlan::default();

    for entry in submitted {
        match entry
            .parsed_id()
            .filter(|id| existing.contains_key(id) && !claimed.contains(id))
        {
            Some(id) => {
                claimed.insert(id);
                plan.updates
                    .push(PermissionChange::new(id, user_id, entry.flags));
            }
            None => {
                let mut id = next_id();
                // A generator must never hand out an id that is in use.
                while existing.contains_key(&id) {
                    id = next_id();
                }
                plan.inserts
                    .push(PermissionChange::new(id, user_id, entry.flags));
            }
        }
    }

    plan.deletes = current
        .iter()
        .map(|p| p.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::permission::CapabilityFlags;

    const READ: CapabilityFlags = CapabilityFlags {
        readable: true,
        writable: false,
        deletable: false,
    };
    const READ_WRITE: CapabilityFlags = CapabilityFlags {
        readable: true,
        writable: true,
        deletable: false,
    };
    const READ_DELETE: CapabilityFlags = CapabilityFlags {
        readable: true,
        writable: false,
        deletable: true,
    };

    fn stored(user_id: Uuid, flags: CapabilityFlags) -> Permission {
        let now = Utc::now();
        Permission {
            id: Uuid::new_v4(),
            user_id,
            flags,
            label: flags.label(),
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(changes: &[PermissionChange]) -> HashSet<Uuid> {
        changes.iter().map(|c| c.id).collect()
    }

    #[test]
    fn matching_id_is_updated_in_place() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let submitted = vec![
            PermissionInput::with_id(current[0].id.to_string(), READ_WRITE),
            PermissionInput::new(READ_DELETE),
        ];

        let plan = reconcile(user_id, &current, &submitted);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, current[0].id);
        assert_eq!(plan.updates[0].label(), "Readable, Writable");
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].label(), "Readable, Deletable");
        assert_eq!(plan.inserts[0].user_id, user_id);
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn omitted_permission_is_deleted() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let submitted = vec![
            PermissionInput::new(READ_WRITE),
            PermissionInput::new(READ_DELETE),
        ];

        let plan = reconcile(user_id, &current, &submitted);

        assert!(plan.updates.is_empty());
        assert_eq!(plan.inserts.len(), 2);
        assert_eq!(plan.deletes, vec![current[0].id]);
        assert!(!ids(&plan.inserts).contains(&current[0].id));
    }

    #[test]
    fn empty_submission_deletes_everything() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ), stored(user_id, READ_WRITE)];

        let plan = reconcile(user_id, &current, &[]);

        assert!(plan.updates.is_empty());
        assert!(plan.inserts.is_empty());
        let deleted: HashSet<_> = plan.deletes.into_iter().collect();
        let expected: HashSet<_> = current.iter().map(|p| p.id).collect();
        assert_eq!(deleted, expected);
    }

    #[test]
    fn unknown_and_malformed_ids_become_inserts() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let stale = Uuid::new_v4();
        let submitted = vec![
            PermissionInput::with_id(stale.to_string(), READ),
            PermissionInput::with_id("not-a-uuid", READ_WRITE),
        ];

        let plan = reconcile(user_id, &current, &submitted);

        assert_eq!(plan.inserts.len(), 2);
        assert!(!ids(&plan.inserts).contains(&stale));
        assert_eq!(plan.deletes, vec![current[0].id]);
    }

    #[test]
    fn repeated_id_is_claimed_once() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let id = current[0].id.to_string();
        let submitted = vec![
            PermissionInput::with_id(id.clone(), READ_WRITE),
            PermissionInput::with_id(id, READ_DELETE),
        ];

        let plan = reconcile(user_id, &current, &submitted);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].flags, READ_WRITE);
        assert_eq!(plan.inserts.len(), 1);
        assert_ne!(plan.inserts[0].id, current[0].id);
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn sets_partition_submission_and_leftovers() {
        let user_id = Uuid::new_v4();
        let current: Vec<_> = (0..4).map(|_| stored(user_id, READ)).collect();
        let submitted = vec![
            PermissionInput::with_id(current[0].id.to_string(), READ_WRITE),
            PermissionInput::with_id(current[2].id.to_string(), READ_DELETE),
            PermissionInput::new(READ),
            PermissionInput::with_id(Uuid::new_v4().to_string(), READ),
        ];

        let plan = reconcile(user_id, &current, &submitted);

        let updates = ids(&plan.updates);
        let inserts = ids(&plan.inserts);
        let deletes: HashSet<_> = plan.deletes.iter().copied().collect();
        assert!(updates.is_disjoint(&inserts));
        assert!(updates.is_disjoint(&deletes));
        assert!(inserts.is_disjoint(&deletes));
        assert_eq!(updates.len() + inserts.len(), submitted.len());
        assert_eq!(
            deletes,
            [current[1].id, current[3].id].into_iter().collect()
        );

        let resulting: HashSet<_> = plan.resulting().map(|c| c.id).collect();
        assert_eq!(resulting, updates.union(&inserts).copied().collect());
    }

    #[test]
    fn resubmitting_applied_state_is_update_only() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let submitted = vec![
            PermissionInput::with_id(current[0].id.to_string(), READ_WRITE),
            PermissionInput::new(READ_DELETE),
        ];
        let first = reconcile(user_id, &current, &submitted);

        let now = Utc::now();
        let applied: Vec<Permission> = first
            .resulting()
            .map(|c| Permission {
                id: c.id,
                user_id: c.user_id,
                flags: c.flags,
                label: c.label().to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let resubmitted: Vec<_> = applied
            .iter()
            .map(|p| PermissionInput::with_id(p.id.to_string(), p.flags))
            .collect();

        let second = reconcile(user_id, &applied, &resubmitted);

        assert!(second.is_update_only());
        assert_eq!(second.updates.len(), 2);
    }

    #[test]
    fn generator_collisions_are_skipped() {
        let user_id = Uuid::new_v4();
        let current = vec![stored(user_id, READ)];
        let fresh = Uuid::new_v4();
        let mut queue = vec![fresh, current[0].id];

        let plan = reconcile_with(
            user_id,
            &current,
            &[PermissionInput::new(READ)],
            || queue.pop().unwrap(),
        );

        assert_eq!(plan.inserts[0].id, fresh);
    }
}
