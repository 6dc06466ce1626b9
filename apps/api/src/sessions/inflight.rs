use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::errors::AppError;

/// Sessions with a mutating request currently running in this process.
/// Each session gets at most one outstanding request at a time.
#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

/// Releases the session when dropped.
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
    id: Uuid,
}

fn lock(active: &Mutex<HashSet<Uuid>>) -> MutexGuard<'_, HashSet<Uuid>> {
    // The set stays consistent even if a holder panicked.
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InFlight {
    pub fn acquire(&self, id: Uuid) -> Result<InFlightGuard, AppError> {
        if !lock(&self.active).insert(id) {
            return Err(AppError::Conflict(
                "A request for this session is already in progress.".to_string(),
            ));
        }
        Ok(InFlightGuard {
            active: Arc::clone(&self.active),
            id,
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, id: Uuid) -> bool {
        lock(&self.active).contains(&id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_conflicts_until_release() {
        let inflight = InFlight::default();
        let id = Uuid::new_v4();

        let guard = inflight.acquire(id).unwrap();
        assert!(inflight.is_busy(id));
        assert!(matches!(inflight.acquire(id), Err(AppError::Conflict(_))));

        drop(guard);
        assert!(!inflight.is_busy(id));
        assert!(inflight.acquire(id).is_ok());
    }

    #[test]
    fn test_sessions_are_independent() {
        let inflight = InFlight::default();
        let _a = inflight.acquire(Uuid::new_v4()).unwrap();
        assert!(inflight.acquire(Uuid::new_v4()).is_ok());
    }
}
