//! Signal Bus
//!
//! Name-addressed publish/subscribe with synchronous, re-entrant delivery.
//!
//! `publish` snapshots the subscriber list for the signal name, releases the
//! registry lock and only then calls the handlers. A handler may therefore
//! publish further signals (delivered before the outer `publish` returns) or
//! add/remove subscriptions; changes apply from the next `publish` on.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::signal::Signal;

/// Signal handler. Receives the bus so it can publish follow-up signals.
pub type SignalHandler = Arc<dyn Fn(&SignalBus, &Signal) + Send + Sync>;

/// Handle returned by [`SignalBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    handler: SignalHandler,
}

/// Synchronous signal bus
pub struct SignalBus {
    subscribers: RwLock<HashMap<&'static str, Vec<Subscriber>>>,
    next_id: AtomicU64,
    /// Current publish nesting depth (0 outside of any delivery)
    depth: AtomicU64,
}

impl SignalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            depth: AtomicU64::new(0),
        }
    }

    /// Subscribe `handler` to every signal addressed to `name`
    pub fn subscribe<F>(&self, name: &'static str, handler: F) -> SubscriptionId
    where
        F: Fn(&SignalBus, &Signal) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .entry(name)
            .or_default()
            .push(Subscriber {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        for list in subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `signal` to all current subscribers of its name.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, signal: &Signal) -> usize {
        let handlers: Vec<SignalHandler> = {
            let subscribers = self.subscribers.read();
            match subscribers.get(signal.name()) {
                Some(list) => list.iter().map(|s| Arc::clone(&s.handler)).collect(),
                None => Vec::new(),
            }
        };

        let depth = self.depth.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "bus: {} -> {} handler(s) (depth {})",
            signal.name(),
            handlers.len(),
            depth
        );

        for handler in &handlers {
            handler(self, signal);
        }

        self.depth.fetch_sub(1, Ordering::Relaxed);
        handlers.len()
    }

    /// Publish every signal in order
    pub fn publish_all(&self, signals: impl IntoIterator<Item = Signal>) {
        for signal in signals {
            self.publish(&signal);
        }
    }

    /// Number of subscribers registered for `name`
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers.read().get(name).map_or(0, Vec::len)
    }

    /// True while a publish is being delivered
    pub fn is_dispatching(&self) -> bool {
        self.depth.load(Ordering::Relaxed) > 0
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.read();
        let counts: HashMap<&str, usize> = subscribers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("SignalBus")
            .field("subscribers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::names;
    use parking_lot::Mutex;

    fn recorder(bus: &SignalBus, name: &'static str) -> Arc<Mutex<Vec<Signal>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe(name, move |_, signal| sink.lock().push(signal.clone()));
        log
    }

    #[test]
    fn test_publish_reaches_named_subscribers_only() {
        let bus = SignalBus::new();
        let stopped = recorder(&bus, names::SPIN_STOPPED);
        let started = recorder(&bus, names::SPIN_START_REQUESTED);

        assert_eq!(bus.publish(&Signal::SpinStopped), 1);
        assert_eq!(stopped.lock().len(), 1);
        assert!(started.lock().is_empty());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = SignalBus::new();
        assert_eq!(bus.publish(&Signal::SpinStopRequested), 0);
    }

    #[test]
    fn test_button_payload_delivered() {
        let bus = SignalBus::new();
        let presses = recorder(&bus, names::BUTTON_PRESSED);

        bus.publish(&Signal::button("Start"));

        assert_eq!(presses.lock()[0].button_name(), Some("Start"));
    }

    #[test]
    fn test_reentrant_publish_is_delivered_before_return() {
        let bus = SignalBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        bus.subscribe(names::SPIN_STOP_REQUESTED, move |bus, _| {
            o.lock().push("stop requested");
            bus.publish(&Signal::SpinStopped);
            o.lock().push("stop handler done");
        });
        let o = Arc::clone(&order);
        bus.subscribe(names::SPIN_STOPPED, move |bus, _| {
            assert!(bus.is_dispatching());
            o.lock().push("stopped");
        });

        bus.publish(&Signal::SpinStopRequested);

        assert_eq!(
            *order.lock(),
            vec!["stop requested", "stopped", "stop handler done"]
        );
        assert!(!bus.is_dispatching());
    }

    #[test]
    fn test_subscribe_during_delivery_applies_next_publish() {
        let bus = Arc::new(SignalBus::new());
        let hits = Arc::new(Mutex::new(0));

        let h = Arc::clone(&hits);
        bus.subscribe(names::SPIN_STOPPED, move |bus, _| {
            let h = Arc::clone(&h);
            bus.subscribe(names::SPIN_STOPPED, move |_, _| *h.lock() += 1);
        });

        bus.publish(&Signal::SpinStopped);
        assert_eq!(*hits.lock(), 0);

        bus.publish(&Signal::SpinStopped);
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = SignalBus::new();
        let id = bus.subscribe(names::SPIN_STOPPED, |_, _| {});
        assert_eq!(bus.subscriber_count(names::SPIN_STOPPED), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(names::SPIN_STOPPED), 0);
    }
}
