//! Session-scoped publish/subscribe bus.
//!
//! The simulation publishes onto the bus; presentation code (the HUD) listens.
//! The bus is owned by the session and emptied when the session is destroyed,
//! so no subscription outlives the session that accepted it.
//!
//! Delivery is synchronous and in subscription order.

use crate::world::EntityId;
use std::collections::BTreeMap;

/// The closed set of event names a subscriber can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameEventKind {
    BoostUpdate,
    PlayerJoin,
    PlayerLeave,
    Hit,
}

/// An event with its payload.
///
/// Only [`GameEvent::BoostUpdate`] is published by the single-player session;
/// the other variants are reserved for a multiplayer host.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Remaining boost fuel as a percentage in `[0, 100]`.
    BoostUpdate { percent: f32 },
    PlayerJoin { player_id: EntityId },
    PlayerLeave { player_id: EntityId },
    Hit { target_id: EntityId, source_id: EntityId },
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::BoostUpdate { .. } => GameEventKind::BoostUpdate,
            GameEvent::PlayerJoin { .. } => GameEventKind::PlayerJoin,
            GameEvent::PlayerLeave { .. } => GameEventKind::PlayerLeave,
            GameEvent::Hit { .. } => GameEventKind::Hit,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&GameEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    // Ordered by id so delivery follows subscription order.
    listeners: BTreeMap<SubscriptionId, (GameEventKind, Callback)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: GameEventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, (kind, Box::new(callback)));
        id
    }

    /// Returns `false` when `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn emit(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for (listening_for, callback) in self.listeners.values_mut() {
            if *listening_for == kind {
                callback(event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: GameEventKind) -> usize {
        self.listeners
            .values()
            .filter(|(listening_for, _)| *listening_for == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<GameEvent>>>, impl FnMut(&GameEvent) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |e: &GameEvent| sink.lock().unwrap().push(e.clone()))
    }

    #[test]
    fn emit_reaches_only_matching_kind() {
        let mut bus = EventBus::new();
        let (boosts, on_boost) = recorder();
        let (hits, on_hit) = recorder();
        bus.subscribe(GameEventKind::BoostUpdate, on_boost);
        bus.subscribe(GameEventKind::Hit, on_hit);

        bus.emit(&GameEvent::BoostUpdate { percent: 42.0 });

        assert_eq!(
            *boosts.lock().unwrap(),
            vec![GameEvent::BoostUpdate { percent: 42.0 }]
        );
        assert!(hits.lock().unwrap().is_empty(), "hit listener must not fire");
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (seen, callback) = recorder();
        let id = bus.subscribe(GameEventKind::BoostUpdate, callback);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id), "second unsubscribe is a no-op");
        bus.emit(&GameEvent::BoostUpdate { percent: 1.0 });

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn delivery_follows_subscription_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3 {
            let order = order.clone();
            bus.subscribe(GameEventKind::PlayerJoin, move |_| {
                order.lock().unwrap().push(tag)
            });
        }

        bus.emit(&GameEvent::PlayerJoin {
            player_id: EntityId::new(),
        });

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut bus = EventBus::new();
        bus.subscribe(GameEventKind::BoostUpdate, |_| {});
        bus.subscribe(GameEventKind::PlayerLeave, |_| {});
        assert_eq!(bus.subscriber_count(GameEventKind::BoostUpdate), 1);

        bus.clear();

        assert!(bus.is_empty());
        assert_eq!(bus.subscriber_count(GameEventKind::BoostUpdate), 0);
    }
}
