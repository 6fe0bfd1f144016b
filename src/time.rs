//! Millisecond time source for the session.
//!
//! Frame deltas, projectile ages and the fire cooldown all read the same
//! [`Clock`].  The Bevy host copies `Time::elapsed` into a [`FrameClock`]
//! every frame, so pausing or scaling virtual time pauses or scales the
//! session with it; tests set the same clock by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic time source in milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// Clock that reports whatever was last stored in it.  Clones share the same
/// reading.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    bits: Arc<AtomicU64>,
}

impl FrameClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    pub fn set(&self, ms: f64) {
        self.bits.store(ms.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }
}

impl Clock for FrameClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = FrameClock::new(5.0);
        let view = clock.clone();
        clock.advance(10.0);
        assert_eq!(view.now_ms(), 15.0);
    }

    #[test]
    fn set_overwrites_reading() {
        let clock = FrameClock::default();
        assert_eq!(clock.now_ms(), 0.0);
        clock.set(1234.5);
        assert_eq!(clock.now_ms(), 1234.5);
    }
}
