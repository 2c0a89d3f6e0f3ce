//! Listener registry for the problem pipeline
//!
//! Ordered, lock-protected subscriber lists. Broadcasts are synchronous:
//! listeners run on the caller's thread in registration order, and the
//! first error stops the fan-out and propagates to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::types::{BuildListener, BuildResult, ListenerId, ProblemListener};
use crate::error::ProblemsResult;
use crate::problem::Problem;

/// Shared reference to ListenerRegistry
pub type SharedListenerRegistry = Arc<ListenerRegistry>;

#[derive(Default)]
struct Listeners {
    problem: Vec<(ListenerId, Arc<dyn ProblemListener>)>,
    build: Vec<(ListenerId, Arc<dyn BuildListener>)>,
}

/// Process-wide registry of problem and build listeners
pub struct ListenerRegistry {
    listeners: RwLock<Listeners>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Listeners::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a shared reference to this registry
    pub fn shared(self) -> SharedListenerRegistry {
        Arc::new(self)
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // No listener code runs under the lock, so a poisoned lock still
    // guards consistent lists.
    fn read(&self) -> RwLockReadGuard<'_, Listeners> {
        self.listeners.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Listeners> {
        self.listeners.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a problem listener at the end of the broadcast order
    pub fn add_problem_listener(&self, listener: Arc<dyn ProblemListener>) -> ListenerId {
        let id = self.allocate_id();
        self.write().problem.push((id, listener));
        debug!(%id, "Problem listener registered");
        id
    }

    /// Register a build listener at the end of the broadcast order
    pub fn add_build_listener(&self, listener: Arc<dyn BuildListener>) -> ListenerId {
        let id = self.allocate_id();
        self.write().build.push((id, listener));
        debug!(%id, "Build listener registered");
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.write();
        let before = listeners.problem.len() + listeners.build.len();
        listeners.problem.retain(|(lid, _)| *lid != id);
        listeners.build.retain(|(lid, _)| *lid != id);
        let removed = before != listeners.problem.len() + listeners.build.len();
        if removed {
            debug!(%id, "Listener removed");
        }
        removed
    }

    /// Deliver a problem to every problem listener.
    ///
    /// Iterates a snapshot, so listeners may (un)register during delivery.
    pub fn broadcast_problem(&self, problem: &Problem) -> ProblemsResult<()> {
        let snapshot: Vec<_> = self
            .read()
            .problem
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in snapshot {
            listener.on_problem(problem)?;
        }
        Ok(())
    }

    /// Deliver a build completion event to every build listener.
    pub fn broadcast_build_finished(&self, result: &BuildResult) -> ProblemsResult<()> {
        let snapshot: Vec<_> = self
            .read()
            .build
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        debug!(
            build = %result.build_path,
            root = result.is_root,
            receivers = snapshot.len(),
            "Build finished"
        );
        for listener in snapshot {
            listener.build_finished(result)?;
        }
        Ok(())
    }

    /// Number of registered problem listeners
    pub fn problem_listener_count(&self) -> usize {
        self.read().problem.len()
    }

    /// Number of registered build listeners
    pub fn build_listener_count(&self) -> usize {
        self.read().build.len()
    }

    /// Check if any listener is registered
    pub fn has_listeners(&self) -> bool {
        let listeners = self.read();
        !listeners.problem.is_empty() || !listeners.build.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
