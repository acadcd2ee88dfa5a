//! Session state and the session broadcaster
//!
//! The broadcaster replaces a callback-style `onAuthStateChanged` with an
//! explicit handle: `subscribe` returns a [`Subscription`] and the listener
//! stays registered exactly as long as that handle is alive.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};

/// A signed-in identity as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
}

/// Identity returned by account creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
}

/// Result of a completed OAuth popup sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSignIn {
    pub identity: Identity,
    /// Email reported by the provider, if it shared one
    pub email: Option<String>,
}

impl From<&OAuthSignIn> for Session {
    fn from(sign_in: &OAuthSignIn) -> Self {
        Session {
            uid: sign_in.identity.uid.clone(),
            email: sign_in.email.clone(),
        }
    }
}

/// Listener invoked with every session transition
pub type SessionListener = Arc<dyn Fn(Option<Session>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    current: Option<Session>,
    next_id: u64,
    entries: BTreeMap<u64, SessionListener>,
}

fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out of session changes to registered listeners
#[derive(Clone, Default)]
pub struct SessionBroadcaster {
    inner: Arc<Mutex<Listeners>>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broadcaster that already holds a session (e.g. restored from storage)
    pub fn with_session(session: Option<Session>) -> Self {
        let broadcaster = Self::default();
        lock(&broadcaster.inner).current = session;
        broadcaster
    }

    /// Current session without subscribing
    pub fn current(&self) -> Option<Session> {
        lock(&self.inner).current.clone()
    }

    /// Register a listener. It is called immediately with the current
    /// session and again on every [`publish`](Self::publish).
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let (id, current) = {
            let mut guard = lock(&self.inner);
            let id = guard.next_id;
            guard.next_id += 1;
            guard.entries.insert(id, Arc::clone(&listener));
            (id, guard.current.clone())
        };

        // Listeners run outside the lock so they may subscribe or publish themselves
        listener(current);

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Replace the current session and notify every listener
    pub fn publish(&self, session: Option<Session>) {
        let listeners: Vec<SessionListener> = {
            let mut guard = lock(&self.inner);
            guard.current = session.clone();
            guard.entries.values().cloned().collect()
        };

        for listener in listeners {
            listener(session.clone());
        }
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

/// Handle for a registered session listener; dropping it unsubscribes
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Explicitly release the listener
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).entries.remove(&self.id);
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

    fn recorder() -> (SessionListener, Arc<Mutex<Vec<Option<Session>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: SessionListener = Arc::new(move |session| {
            sink.lock().unwrap().push(session);
        });
        (listener, seen)
    }

    fn session(uid: &str) -> Session {
        Session {
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
        }
    }

    #[test]
    fn test_subscribe_emits_current_session_immediately() {
        let broadcaster = SessionBroadcaster::with_session(Some(session("u1")));
        let (listener, seen) = recorder();

        let _subscription = broadcaster.subscribe(listener);

        assert_eq!(*seen.lock().unwrap(), vec![Some(session("u1"))]);
    }

    #[test]
    fn test_publish_reaches_every_listener() {
        let broadcaster = SessionBroadcaster::new();
        let (first, first_seen) = recorder();
        let (second, second_seen) = recorder();
        let _a = broadcaster.subscribe(first);
        let _b = broadcaster.subscribe(second);

        broadcaster.publish(Some(session("u2")));
        broadcaster.publish(None);

        let expected = vec![None, Some(session("u2")), None];
        assert_eq!(*first_seen.lock().unwrap(), expected);
        assert_eq!(*second_seen.lock().unwrap(), expected);
        assert_eq!(broadcaster.current(), None);
    }

    #[test]
    fn test_dropping_subscription_removes_listener() {
        let broadcaster = SessionBroadcaster::new();
        let (listener, seen) = recorder();

        let subscription = broadcaster.subscribe(listener);
        assert_eq!(broadcaster.listener_count(), 1);

        subscription.unsubscribe();
        assert_eq!(broadcaster.listener_count(), 0);

        broadcaster.publish(Some(session("u3")));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscription_outliving_broadcaster_is_harmless() {
        let broadcaster = SessionBroadcaster::new();
        let (listener, _seen) = recorder();
        let subscription = broadcaster.subscribe(listener);

        drop(broadcaster);
        drop(subscription);
    }

    #[test]
    fn test_listener_may_publish_reentrantly() {
        let broadcaster = SessionBroadcaster::new();
        let inner = broadcaster.clone();
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);

        let _subscription = broadcaster.subscribe(Arc::new(move |current| {
            *counter.lock().unwrap() += 1;
            if current.is_some() {
                inner.publish(None);
            }
        }));

        broadcaster.publish(Some(session("u4")));

        assert_eq!(*fired.lock().unwrap(), 3);
        assert_eq!(broadcaster.current(), None);
    }
}
