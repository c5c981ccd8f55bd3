//! Session lifecycle notifications
//!
//! Lets state holders (the session store, cart mirrors) react when the HTTP
//! layer tears a session down, without the client knowing about them.
//! A listener stays registered for as long as its [`Subscription`] lives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Refresh failed; persisted credentials are already cleared
    SessionExpired,
}

type Listener = Arc<dyn Fn(AuthEvent) + Send + Sync>;
type Listeners = RwLock<Vec<(u64, Listener)>>;

/// Registry of auth event listeners
#[derive(Default)]
pub struct AuthEvents {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl AuthEvents {
    /// Register a listener until the returned handle is dropped
    pub fn subscribe(&self, listener: impl Fn(AuthEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn emit(&self, event: AuthEvent) {
        // Snapshot so a listener may subscribe or unsubscribe without deadlocking
        let listeners: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        tracing::debug!(?event, listeners = listeners.len(), "Emitting auth event");
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().map_or(0, |l| l.len())
    }
}

impl std::fmt::Debug for AuthEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps a listener registered; dropping it unsubscribes
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        if let Ok(mut listeners) = listeners.write() {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_all_listeners_notified() {
        let events = AuthEvents::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let _subscriptions: Vec<Subscription> = (0..2)
            .map(|_| {
                let hits = Arc::clone(&hits);
                events.subscribe(move |event| {
                    assert_eq!(event, AuthEvent::SessionExpired);
                    hits.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        events.emit(AuthEvent::SessionExpired);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let events = AuthEvents::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let kept = {
            let hits = Arc::clone(&hits);
            events.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        let dropped = {
            let hits = Arc::clone(&hits);
            events.subscribe(move |_| {
                hits.fetch_add(10, Ordering::SeqCst);
            })
        };
        assert_eq!(events.listener_count(), 2);

        drop(dropped);
        assert_eq!(events.listener_count(), 1);

        events.emit(AuthEvent::SessionExpired);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(kept);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        let events = AuthEvents::default();
        let subscription = events.subscribe(|_| {});
        drop(events);
        drop(subscription);
    }
}
