//! # Page-Unload Interception
//!
//! The "confirm before leaving" hook is modelled as a subscribe/unsubscribe
//! capability handed to the draft machine, not as a global. `UnloadGuard`
//! owns one subscription and releases it when dropped, so repeated
//! activation and teardown cycles cannot leak listeners.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub type ListenerId = u64;

pub type UnloadListener = Arc<dyn Fn(&mut UnloadEvent) + Send + Sync>;

/// A pending page unload that listeners may object to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnloadEvent {
    default_prevented: bool,
    return_value: Option<String>,
}

impl UnloadEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the host to confirm before leaving
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn set_return_value(&mut self, message: impl Into<String>) {
        self.return_value = Some(message.into());
    }

    pub fn return_value(&self) -> Option<&str> {
        self.return_value.as_deref()
    }
}

/// Source of page-lifecycle events
pub trait LifecycleEvents: Send + Sync {
    fn subscribe(&self, listener: UnloadListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// In-process event source: listeners are called in subscription order
#[derive(Default)]
pub struct BeforeUnloadHub {
    listeners: Mutex<Vec<(ListenerId, UnloadListener)>>,
    next_id: AtomicU64,
}

impl BeforeUnloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire an unload event at every listener and return it
    pub fn dispatch(&self) -> UnloadEvent {
        // Listeners run outside the lock so they may unsubscribe themselves
        let listeners: Vec<UnloadListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut event = UnloadEvent::new();
        for listener in listeners {
            listener(&mut event);
        }
        event
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LifecycleEvents for BeforeUnloadHub {
    fn subscribe(&self, listener: UnloadListener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

impl fmt::Debug for BeforeUnloadHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeforeUnloadHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Live "confirm before leaving" subscription
pub struct UnloadGuard {
    events: Arc<dyn LifecycleEvents>,
    id: ListenerId,
}

impl UnloadGuard {
    /// Subscribe a listener that prevents the unload, optionally attaching
    /// a message for hosts that display one
    pub fn install(events: Arc<dyn LifecycleEvents>, message: Option<String>) -> Self {
        let listener: UnloadListener = Arc::new(move |event: &mut UnloadEvent| {
            event.prevent_default();
            if let Some(message) = &message {
                event.set_return_value(message.clone());
            }
        });
        let id = events.subscribe(listener);
        tracing::debug!(listener = id, "unload guard installed");

        Self { events, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for UnloadGuard {
    fn drop(&mut self) {
        self.events.unsubscribe(self.id);
        tracing::debug!(listener = self.id, "unload guard removed");
    }
}

impl fmt::Debug for UnloadGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnloadGuard").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_without_listeners_is_not_prevented() {
        let hub = BeforeUnloadHub::new();
        assert!(!hub.dispatch().default_prevented());
    }

    #[test]
    fn test_guard_prevents_until_dropped() {
        let hub = Arc::new(BeforeUnloadHub::new());

        let guard = UnloadGuard::install(hub.clone(), Some("Unsaved changes".to_string()));
        let event = hub.dispatch();
        assert!(event.default_prevented());
        assert_eq!(event.return_value(), Some("Unsaved changes"));
        assert_eq!(hub.listener_count(), 1);

        drop(guard);
        assert!(!hub.dispatch().default_prevented());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_guards_unsubscribe_independently() {
        let hub = Arc::new(BeforeUnloadHub::new());

        let first = UnloadGuard::install(hub.clone(), None);
        let second = UnloadGuard::install(hub.clone(), None);
        assert_ne!(first.id(), second.id());

        drop(first);
        assert_eq!(hub.listener_count(), 1);
        assert!(hub.dispatch().default_prevented());

        drop(second);
        assert_eq!(hub.listener_count(), 0);
    }
}
