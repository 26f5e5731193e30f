//! Typed publish/subscribe between event producers and their consumer.
//!
//! The bus is owned by the composition root and generic over the consumer it
//! dispatches into, so handlers receive `&mut C` directly instead of reaching
//! for shared global state. Handlers register against a single [`EventKind`]
//! and only see messages of that kind, in registration order.
//!
//! A handler that rejects a message (returns `Err`) is logged and skipped;
//! publishing never fails.

use crate::{
    error::Result,
    synth::message::{EventKind, MessageReceiver, SynthMessage},
};

type Handler<C> = Box<dyn FnMut(&mut C, &SynthMessage) -> Result<()> + Send>;

/// Returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Route<C> {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler<C>,
}

pub struct EventBus<C> {
    routes: Vec<Route<C>>,
    next_id: u64,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut C, &SynthMessage) -> Result<()> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.routes.push(Route {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.routes.len();
        self.routes.retain(|route| route.id != id);
        self.routes.len() != before
    }

    pub fn subscribers(&self, kind: EventKind) -> usize {
        self.routes.iter().filter(|route| route.kind == kind).count()
    }

    /// Deliver `message` to every handler registered for its kind.
    /// Returns how many handlers accepted it.
    pub fn publish(&mut self, target: &mut C, message: SynthMessage) -> usize {
        let kind = message.kind();
        let mut accepted = 0;
        for route in self.routes.iter_mut().filter(|route| route.kind == kind) {
            match (route.handler)(target, &message) {
                Ok(()) => accepted += 1,
                Err(error) => tracing::warn!(%error, ?message, "event rejected"),
            }
        }
        accepted
    }

    /// Publish everything waiting in `rx`. Returns the number of messages drained.
    pub fn drain(&mut self, target: &mut C, rx: &mut impl MessageReceiver) -> usize {
        let mut drained = 0;
        while let Some(message) = rx.pop() {
            self.publish(target, message);
            drained += 1;
        }
        drained
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
