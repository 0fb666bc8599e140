use std::sync::{Arc, PoisonError, RwLock};

/// Holds the published rule set for one family.
///
/// Readers clone the inner `Arc` and match against that snapshot for the
/// whole request, so a concurrent [`RuleStore::replace`] is never observed
/// halfway. The write lock is held only for the pointer swap.
#[derive(Debug)]
pub struct RuleStore<T> {
    current: RwLock<Arc<T>>,
}

impl<T> RuleStore<T> {
    pub fn new(rules: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    pub fn snapshot(&self) -> Arc<T> {
        // a panicking writer cannot leave a half-swapped Arc behind
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes `rules` and returns the set it replaced.
    pub fn replace(&self, rules: T) -> Arc<T> {
        let next = Arc::new(rules);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl<T: Default> Default for RuleStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
