//! The player ship and its kinematic integrator.
//!
//! ## Update pipeline (order matters)
//!
//! 1. Rotate from held rotate controls.
//! 2. Derive the thrust heading `(cos r, sin r)`.
//! 3. Reset acceleration; forward thrust, else half-strength reverse.
//! 4. Boost: multiply thrust and burn fuel, or recharge.
//! 5. Integrate velocity, then apply per-frame drag.
//! 6. Clamp speed to `max_velocity`.
//! 7. Integrate position and clamp each axis to the world.
//!
//! Hitting a world edge stops the ship there but keeps its velocity, so it
//! stays pinned while it keeps pushing outward.

use crate::config::GameConfig;
use crate::input::ShipInput;
use crate::surface::DrawSurface;
use crate::world::{heading, EntityId};
use bevy::color::Color;
use bevy::math::Vec2;

/// Local-space hull outline; the nose points along +X.
const HULL: [Vec2; 3] = [
    Vec2::new(20.0, 0.0),
    Vec2::new(-10.0, -10.0),
    Vec2::new(-10.0, 10.0),
];

/// Local-space exhaust flame drawn while boosting.
const FLAME: [Vec2; 4] = [
    Vec2::new(-10.0, 0.0),
    Vec2::new(-20.0, -5.0),
    Vec2::new(-25.0, 0.0),
    Vec2::new(-20.0, 5.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: EntityId,
    pub position: Vec2,
    /// Radians, unbounded.
    pub rotation: f32,
    pub velocity: Vec2,
    /// Acceleration sampled during the last update; not carried between frames.
    pub acceleration: Vec2,
    pub boost_fuel: f32,
    /// Session-clock time (ms) of the last successful shot.
    pub last_shot: Option<f64>,
    /// Whether boost was active during the last update.
    pub boosting: bool,
}

impl Ship {
    /// A ship at rest with a full tank, facing +X.
    pub fn new(id: EntityId, position: Vec2, max_boost_fuel: f32) -> Self {
        Self {
            id,
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            boost_fuel: max_boost_fuel,
            last_shot: None,
            boosting: false,
        }
    }

    /// Advance the ship by `dt` seconds.
    pub fn update(&mut self, input: &ShipInput, dt: f32, config: &GameConfig) {
        if input.rotate_left {
            self.rotation -= config.rotation_speed * dt;
        }
        if input.rotate_right {
            self.rotation += config.rotation_speed * dt;
        }

        let direction = heading(self.rotation);

        // Forward is checked first, so it wins when both are held.
        self.acceleration = if input.forward {
            direction * config.ship_acceleration
        } else if input.reverse {
            -direction * config.ship_acceleration * config.reverse_thrust_factor
        } else {
            Vec2::ZERO
        };

        self.boosting = input.boost && self.boost_fuel > 0.0;
        let boost_multiplier = if self.boosting {
            self.boost_fuel = (self.boost_fuel - config.boost_consumption_rate * dt).max(0.0);
            config.boost_multiplier
        } else {
            self.boost_fuel =
                (self.boost_fuel + config.boost_recharge_rate * dt).min(config.max_boost_fuel);
            1.0
        };

        self.velocity += self.acceleration * boost_multiplier * dt;
        self.velocity *= config.drag;

        let speed = self.velocity.length();
        if speed > config.max_velocity {
            self.velocity *= config.max_velocity / speed;
        }

        self.position += self.velocity * dt;
        self.position = config.world().clamp(self.position);
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        heading(self.rotation)
    }

    /// Point `offset` units ahead of the ship centre along its heading.
    #[inline]
    pub fn nose(&self, offset: f32) -> Vec2 {
        self.position + self.direction() * offset
    }

    /// Remaining fuel as a percentage of `max_boost_fuel`.
    pub fn boost_percent(&self, max_boost_fuel: f32) -> f32 {
        self.boost_fuel / max_boost_fuel * 100.0
    }

    /// Draw the hull outline and, while boosting, the exhaust flame.
    ///
    /// Leaves the surface translated and rotated into ship space; callers wrap
    /// this in `save` / `restore`.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.translate(self.position);
        surface.rotate(self.rotation);

        surface.stroke_path(&HULL, true, Color::WHITE);

        if self.boosting {
            surface.fill_path(&FLAME, Color::srgb_u8(0xff, 0x66, 0x00));
        }
    }
}
