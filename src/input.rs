//! Input capture: held-key tracking and the injected input source.
//!
//! ## Flow
//!
//! 1. The host (Bevy window, a test, a replay) pushes [`InputSignal`]s through
//!    an [`InputFeed`].
//! 2. The session owns the matching [`InputSource`] and drains it at the start
//!    of every frame into its [`HeldKeys`] set.
//! 3. [`ShipInput::from_keys`] resolves held labels through the configured
//!    [`KeyBindings`] into the controls the ship integrator reads.
//!
//! Destroying the session detaches the source; the feed then drops anything
//! pushed to it.

use crate::config::KeyBindings;
use bevy::log::debug;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// A discrete notification from the host's input surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSignal {
    KeyDown(String),
    KeyUp(String),
    /// The window lost focus; any key may have been released unseen.
    FocusLost,
    /// Primary pointer press: the fire action.
    Click,
}

/// Capability the session subscribes to at start and releases at destroy.
pub trait InputSource: Send + Sync {
    /// Take every signal received since the last call, oldest first.
    fn drain(&mut self) -> Vec<InputSignal>;

    /// Stop accepting signals.  Idempotent.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

#[derive(Debug)]
struct Queue {
    signals: VecDeque<InputSignal>,
    attached: bool,
}

impl Default for Queue {
    fn default() -> Self {
        Self {
            signals: VecDeque::new(),
            attached: true,
        }
    }
}

fn lock(queue: &Mutex<Queue>) -> MutexGuard<'_, Queue> {
    // A panic while holding the lock cannot leave the queue half-updated.
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Session side of a signal queue.
#[derive(Debug, Default)]
pub struct QueuedInput {
    queue: Arc<Mutex<Queue>>,
}

/// Host side of a signal queue.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct InputFeed {
    queue: Arc<Mutex<Queue>>,
}

impl QueuedInput {
    /// Create a connected source/feed pair.
    pub fn channel() -> (QueuedInput, InputFeed) {
        let queue = Arc::new(Mutex::new(Queue::default()));
        (
            QueuedInput {
                queue: queue.clone(),
            },
            InputFeed { queue },
        )
    }
}

impl InputSource for QueuedInput {
    fn drain(&mut self) -> Vec<InputSignal> {
        lock(&self.queue).signals.drain(..).collect()
    }

    fn detach(&mut self) {
        let mut queue = lock(&self.queue);
        queue.attached = false;
        queue.signals.clear();
    }

    fn is_attached(&self) -> bool {
        lock(&self.queue).attached
    }
}

impl InputFeed {
    /// Queue a signal.  Returns `false` (and drops it) once the session has
    /// detached.
    pub fn push(&self, signal: InputSignal) -> bool {
        let mut queue = lock(&self.queue);
        if !queue.attached {
            debug!("input feed detached; dropping {signal:?}");
            return false;
        }
        queue.signals.push_back(signal);
        true
    }

    pub fn key_down(&self, label: impl Into<String>) -> bool {
        self.push(InputSignal::KeyDown(label.into()))
    }

    pub fn key_up(&self, label: impl Into<String>) -> bool {
        self.push(InputSignal::KeyUp(label.into()))
    }

    pub fn focus_lost(&self) -> bool {
        self.push(InputSignal::FocusLost)
    }

    pub fn click(&self) -> bool {
        self.push(InputSignal::Click)
    }

    pub fn is_attached(&self) -> bool {
        lock(&self.queue).attached
    }
}

/// Set of currently held key labels, stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: HashSet<String>,
}

impl HeldKeys {
    pub fn press(&mut self, label: &str) {
        self.keys.insert(label.to_lowercase());
    }

    pub fn release(&mut self, label: &str) {
        self.keys.remove(&label.to_lowercase());
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, label: &str) -> bool {
        self.keys.contains(&label.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Ship controls held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub forward: bool,
    pub reverse: bool,
    pub boost: bool,
}

impl ShipInput {
    pub fn from_keys(keys: &HeldKeys, bindings: &KeyBindings) -> Self {
        Self {
            rotate_left: keys.is_held(&bindings.rotate_left),
            rotate_right: keys.is_held(&bindings.rotate_right),
            forward: keys.is_held(&bindings.forward),
            reverse: keys.is_held(&bindings.reverse),
            boost: keys.is_held(&bindings.boost),
        }
    }
}
