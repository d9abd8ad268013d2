use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::models::UserId;

/// Registry size at which idle entries are dropped.
const PRUNE_AT: usize = 256;

/// Hands out one mutex per user. The registry itself is only locked while a
/// user's mutex is looked up, never during I/O.
pub(crate) struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
    prune_at: usize,
}

impl Default for UserLocks {
    fn default() -> Self {
        Self::with_prune_threshold(PRUNE_AT)
    }
}

impl UserLocks {
    fn with_prune_threshold(prune_at: usize) -> Self {
        Self {
            locks: Mutex::default(),
            prune_at,
        }
    }

    pub(crate) fn handle(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut registry = lock_ignoring_poison(&self.locks);
        if registry.len() >= self.prune_at {
            // Handles are only cloned under the registry lock, so a count of
            // one means no caller holds or is about to take this mutex.
            registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        registry.entry(user).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock_ignoring_poison(&self.locks).len()
    }
}

/// Writes are whole-line or rolled back, so a poisoned lock still guards a
/// consistent log.
pub(crate) fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_user_shares_a_mutex() {
        let locks = UserLocks::default();
        assert!(Arc::ptr_eq(&locks.handle(UserId(1)), &locks.handle(UserId(1))));
        assert!(!Arc::ptr_eq(&locks.handle(UserId(1)), &locks.handle(UserId(2))));
    }

    #[test]
    fn idle_entries_are_pruned_once_the_registry_fills() {
        let locks = UserLocks::with_prune_threshold(4);
        let held = locks.handle(UserId(0));
        for id in 1..4 {
            drop(locks.handle(UserId(id)));
        }
        assert_eq!(locks.len(), 4);

        drop(locks.handle(UserId(10)));

        assert_eq!(locks.len(), 2);
        assert!(Arc::ptr_eq(&held, &locks.handle(UserId(0))));
    }

    #[test]
    fn registry_stays_bounded_under_many_users() {
        let locks = UserLocks::with_prune_threshold(8);
        for id in 0..1_000 {
            let handle = locks.handle(UserId(id));
            let _guard = lock_ignoring_poison(&handle);
        }
        assert!(locks.len() <= 8);
    }
}
