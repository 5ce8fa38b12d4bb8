//! Scoped event listener registration
//!
//! An [`EventHub`] stands in for an event target (a media element, the
//! document). Subscribing hands back a [`Subscription`] that queues delivered
//! events; dropping the subscription detaches it from the hub, so a player
//! that goes away cannot leak listeners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Synchronous verdict on an event: `true` suppresses the default action
pub type Interceptor<E> = fn(&E) -> bool;

struct Listener<E> {
    tx: Option<UnboundedSender<E>>,
    intercept: Option<Interceptor<E>>,
}

struct HubInner<E> {
    next_id: u64,
    listeners: HashMap<u64, Listener<E>>,
}

type Shared<E> = Arc<Mutex<HubInner<E>>>;

fn lock<E>(inner: &Mutex<HubInner<E>>) -> MutexGuard<'_, HubInner<E>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of emitting one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub delivered: usize,
    pub default_prevented: bool,
}

/// A cloneable event target
pub struct EventHub<E> {
    inner: Shared<E>,
}

impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventHub<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }

    /// Attach a queueing listener
    pub fn subscribe(&self) -> Subscription<E> {
        self.attach(true, None)
    }

    /// Attach a listener that only decides whether to suppress the default action
    pub fn intercept(&self, intercept: Interceptor<E>) -> Subscription<E> {
        self.attach(false, Some(intercept))
    }

    fn attach(&self, queue: bool, intercept: Option<Interceptor<E>>) -> Subscription<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx = queue.then_some(tx);
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Listener { tx, intercept });

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}

impl<E: Clone> EventHub<E> {
    /// Deliver an event to every attached listener
    pub fn emit(&self, event: E) -> Dispatch {
        let inner = lock(&self.inner);
        let mut dispatch = Dispatch::default();

        for listener in inner.listeners.values() {
            if let Some(intercept) = listener.intercept {
                dispatch.default_prevented |= intercept(&event);
            }
            if let Some(ref tx) = listener.tx {
                if tx.send(event.clone()).is_ok() {
                    dispatch.delivered += 1;
                }
            }
        }

        dispatch
    }
}

/// A live listener registration. Detaches on drop.
pub struct Subscription<E> {
    id: u64,
    rx: UnboundedReceiver<E>,
    hub: Weak<Mutex<HubInner<E>>>,
}

impl<E> Subscription<E> {
    /// Take every event queued since the last call
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event. `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<E> {
        self.rx.recv().await
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub).listeners.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_detaches() {
        let hub: EventHub<u32> = EventHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);

        drop(first);
        assert_eq!(hub.listener_count(), 1);
        drop(second);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_emit_queues_per_listener() {
        let hub: EventHub<&'static str> = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.emit("timeupdate").delivered, 2);
        hub.emit("ended");

        assert_eq!(a.drain(), vec!["timeupdate", "ended"]);
        assert_eq!(b.drain(), vec!["timeupdate", "ended"]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_interceptor_prevents_default() {
        let hub: EventHub<u32> = EventHub::new();
        let _plain = hub.subscribe();
        assert!(!hub.emit(7).default_prevented);

        let mut odd = hub.intercept(|n| n % 2 == 1);
        let dispatch = hub.emit(7);
        assert!(dispatch.default_prevented);
        assert_eq!(dispatch.delivered, 1);
        assert!(!hub.emit(8).default_prevented);
        assert!(odd.drain().is_empty());
    }

    #[test]
    fn test_subscription_outlives_hub() {
        let hub: EventHub<u32> = EventHub::new();
        let mut sub = hub.subscribe();
        hub.emit(1);
        drop(hub);
        assert_eq!(sub.drain(), vec![1]);
    }

    #[tokio::test]
    async fn test_next_waits_for_event() {
        let hub: EventHub<u32> = EventHub::new();
        let mut sub = hub.subscribe();
        let sender = hub.clone();
        tokio::spawn(async move {
            sender.emit(5);
        });
        assert_eq!(sub.next().await, Some(5));
    }
}
