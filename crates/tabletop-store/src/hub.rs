//! Subscription fan-out shared by the store implementations.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tabletop_core::record::{Filter, Record};
use tabletop_core::store::Subscription;
use tokio::sync::mpsc;

struct Subscriber<R> {
    filter: Filter,
    sender: mpsc::UnboundedSender<Vec<R>>,
}

/// Registry of live subscriptions for one collection.
pub struct SubscriptionHub<R> {
    subscribers: Mutex<Vec<Subscriber<R>>>,
}

impl<R> std::fmt::Debug for SubscriptionHub<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHub")
            .field("subscribers", &self.lock().len())
            .finish()
    }
}

impl<R> Default for SubscriptionHub<R> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<R: Record> SubscriptionHub<R> {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and delivers `initial` to it right away.
    pub fn register(&self, filter: Filter, initial: Vec<R>) -> Subscription<R> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive, so the initial delivery cannot fail.
        let _ = sender.send(initial);
        self.lock().push(Subscriber {
            filter: filter.clone(),
            sender,
        });
        Subscription::new(filter, receiver)
    }

    /// Returns the distinct filters of live subscribers that select any of
    /// `changed`. Subscribers whose receiver was dropped are pruned.
    pub fn interested(&self, changed: &[&R]) -> Vec<Filter> {
        let mut subscribers = self.lock();
        subscribers.retain(|subscriber| !subscriber.sender.is_closed());

        let mut filters: Vec<Filter> = Vec::new();
        for subscriber in subscribers.iter() {
            let selected = changed
                .iter()
                .any(|record| subscriber.filter.matches(*record));
            if selected && !filters.contains(&subscriber.filter) {
                filters.push(subscriber.filter.clone());
            }
        }
        filters
    }

    /// Pushes `set` to every subscriber registered with `filter`.
    pub fn publish(&self, filter: &Filter, set: &[R]) {
        for subscriber in self.lock().iter().filter(|s| &s.filter == filter) {
            // A closed receiver is pruned on the next `interested` call.
            let _ = subscriber.sender.send(set.to_vec());
        }
    }

    /// Number of registered subscribers, including not-yet-pruned closed ones.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }
}

impl<R> SubscriptionHub<R> {
    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber<R>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
