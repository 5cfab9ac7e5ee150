//! # Notification Bus
//!
//! Binds handlers to notification names and dispatches events to them.
//!
//! Notification names are `<event>.<scope>`, e.g. `produce_message.producer.kafka`.
//! Dispatch is synchronous on the publishing thread; handler errors are returned to
//! the publisher, which decides whether to drop, log, or abort.

use crate::{event::Event, TranslationResult};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::trace;

/// Handler bound to a notification name
pub type Handler = Arc<dyn Fn(&Event) -> TranslationResult<()> + Send + Sync>;

/// Build the full notification name for an event within a scope
pub fn notification_name(event: &str, scope: &str) -> String {
    format!("{}.{}", event, scope)
}

/// Outcome of publishing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event was passed to this many handlers
    Handled(usize),
    /// No handler is bound to the event's name
    Ignored,
}

/// Subscription side of an event source
pub trait NotificationBus: Send + Sync {
    /// Bind a handler to a full notification name
    fn subscribe(&self, name: &str, handler: Handler);
}

/// In-process notification bus
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Handler>>>,
}

impl EventBus {
    /// Create a bus with no subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every handler bound to its name, in subscription order.
    ///
    /// # Errors
    /// Returns the first handler error; later handlers for the same event are not run.
    pub fn publish(&self, event: &Event) -> TranslationResult<Dispatch> {
        // Clone the handler list so handlers run without holding the lock
        let handlers = {
            let map = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            match map.get(&event.name) {
                Some(handlers) => handlers.clone(),
                None => {
                    trace!(event = %event.name, "No handler bound, ignoring notification");
                    return Ok(Dispatch::Ignored);
                }
            }
        };

        for handler in &handlers {
            handler(event)?;
        }

        Ok(Dispatch::Handled(handlers.len()))
    }

    /// Check whether any handler is bound to a notification name
    pub fn is_subscribed(&self, name: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Bound notification names, sorted
    pub fn subscriptions(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl NotificationBus for EventBus {
    fn subscribe(&self, name: &str, handler: Handler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions())
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
