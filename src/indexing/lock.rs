//! Advisory per-project locks for indexing runs.
//!
//! Two concurrent runs against the same collection would interleave upserts
//! non-deterministically, so the pipeline takes a name-keyed lock before
//! touching anything. Queries never take this lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Default)]
pub struct ProjectLocks {
    active: DashMap<String, ()>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `name`, or `None` if a run already holds it.
    /// The lock releases when the returned guard drops.
    pub fn try_acquire(&self, name: &str) -> Option<ProjectLockGuard<'_>> {
        match self.active.entry(name.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(ProjectLockGuard {
                    locks: self,
                    name: name.to_string(),
                })
            }
        }
    }
}

#[derive(Debug)]
pub struct ProjectLockGuard<'a> {
    locks: &'a ProjectLocks,
    name: String,
}

impl Drop for ProjectLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.active.remove(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_guard_drops() {
        let locks = ProjectLocks::new();

        let guard = locks.try_acquire("demo").expect("first acquire");
        assert!(locks.try_acquire("demo").is_none());
        assert!(locks.try_acquire("other").is_some());

        drop(guard);
        assert!(locks.try_acquire("demo").is_some());
    }
}
