//! Typed outcome channel with explicit subscribe / unsubscribe.
//!
//! Listeners are plain closures owned by the channel.  A listener that
//! captures presentation state must be unsubscribed before that state is torn
//! down; dropping a channel that still holds listeners logs a warning.

use super::outcome::FlightOutcome;
use bevy::prelude::*;

/// Handle returned by [`OutcomeChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(FlightOutcome) + Send + Sync>;

#[derive(Default)]
pub struct OutcomeChannel {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl OutcomeChannel {
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(FlightOutcome) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed (already removed or foreign).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        before != self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `outcome` to every listener in subscription order.
    pub fn publish(&mut self, outcome: FlightOutcome) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(outcome);
        }
    }
}

impl std::fmt::Debug for OutcomeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeChannel")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

impl Drop for OutcomeChannel {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            warn!(
                "[outcome] channel dropped with {} live subscriber(s); unsubscribe on teardown",
                self.listeners.len()
            );
        }
    }
}
