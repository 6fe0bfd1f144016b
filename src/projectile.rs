//! Projectiles: one kinematic shape, a closed set of cosmetic variants.
//!
//! Every projectile moves in a straight line at constant velocity.  Liveness
//! (lifetime and world bounds) is decided by the session, never here.  The
//! [`ProjectileKind`] carries purely visual sub-state that is advanced
//! alongside the motion and read only by [`Projectile::draw`].
//!
//! | Kind | Look |
//! |------|------|
//! | [`ProjectileKind::Missile`] | Small cyan dot pulsing at 10 rad/s |
//! | [`ProjectileKind::ColorMissile`] | White gradient core, 10 orbiting coloured balls with fading trails |

use crate::config::MissileStyle;
use crate::surface::{DrawSurface, Fill};
use crate::world::EntityId;
use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::TAU;

/// Pulse rate of the plain missile (rad/s).
const PULSE_RATE: f32 = 10.0;

/// Pulse rate of each orbiting ball (rad/s).
const BALL_PULSE_RATE: f32 = 3.0;

/// Relative amplitude of the ball size pulse.
const BALL_PULSE_DEPTH: f32 = 0.3;

/// Radius of the colour missile's gradient core.
const CORE_RADIUS: f32 = 6.0;

fn palette() -> [Color; 4] {
    [
        Color::srgb_u8(191, 46, 240),
        Color::srgb_u8(237, 62, 247),
        Color::srgb_u8(254, 236, 179),
        Color::srgb_u8(255, 246, 234),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    /// Constant for the projectile's whole life.
    pub velocity: Vec2,
    /// Session-clock spawn time (ms).
    pub created_at: f64,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileKind {
    Missile(PulseMissile),
    ColorMissile(OrbitalCluster),
}

impl Projectile {
    /// Spawn a projectile of the given style.  `rng` seeds the cosmetic state.
    pub fn spawn(
        style: MissileStyle,
        position: Vec2,
        velocity: Vec2,
        created_at: f64,
        trail_length: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let kind = match style {
            MissileStyle::Missile => ProjectileKind::Missile(PulseMissile::default()),
            MissileStyle::ColorMissile => {
                ProjectileKind::ColorMissile(OrbitalCluster::new(trail_length, rng))
            }
        };
        Self {
            id: EntityId::new(),
            position,
            velocity,
            created_at,
            kind,
        }
    }

    /// Move by `velocity * dt`, then advance the cosmetic state.
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        match &mut self.kind {
            ProjectileKind::Missile(missile) => missile.advance(dt),
            ProjectileKind::ColorMissile(cluster) => cluster.advance(dt, self.position),
        }
    }

    /// Milliseconds since spawn at session time `now`.
    #[inline]
    pub fn age_ms(&self, now: f64) -> f64 {
        now - self.created_at
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        match &self.kind {
            ProjectileKind::Missile(missile) => missile.draw(self.position, surface),
            ProjectileKind::ColorMissile(cluster) => cluster.draw(self.position, surface),
        }
    }
}

// ── Plain missile ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulseMissile {
    /// Wrapped to `[0, 2π)`.
    pub pulse_phase: f32,
}

impl PulseMissile {
    fn advance(&mut self, dt: f32) {
        self.pulse_phase = (self.pulse_phase + dt * PULSE_RATE).rem_euclid(TAU);
    }

    pub fn radius(&self) -> f32 {
        2.0 + self.pulse_phase.sin()
    }

    fn draw(&self, position: Vec2, surface: &mut dyn DrawSurface) {
        surface.fill_circle(
            position,
            self.radius(),
            Fill::Solid(Color::srgb_u8(0x00, 0xff, 0xff)),
        );
    }
}

// ── Colour missile ────────────────────────────────────────────────────────────

/// A past ball position kept for the fading trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalBall {
    /// Offset from the projectile centre.
    pub offset: Vec2,
    /// Orbit radius: the offset's length at spawn.
    pub radius: f32,
    pub base_size: f32,
    pub size: f32,
    /// Angular speed (rad/s); sign sets the orbit direction.
    pub speed: f32,
    pub phase: f32,
    pub color: Color,
    /// Newest point first.
    pub trail: VecDeque<TrailPoint>,
}

impl OrbitalBall {
    fn random(
        rng: &mut impl Rng,
        spread: f32,
        size: std::ops::Range<f32>,
        speed: f32,
        trail_length: usize,
    ) -> Self {
        let offset = Vec2::new(
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
        );
        let base_size = rng.gen_range(size);
        let colors = palette();
        Self {
            offset,
            radius: offset.length(),
            base_size,
            size: base_size,
            speed: rng.gen_range(-speed..speed),
            phase: rng.gen_range(0.0..TAU),
            color: colors[rng.gen_range(0..colors.len())],
            trail: VecDeque::with_capacity(trail_length + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalCluster {
    /// Seconds of simulation time since spawn; drives the orbit angle.
    pub elapsed: f32,
    pub trail_length: usize,
    pub balls: Vec<OrbitalBall>,
}

impl OrbitalCluster {
    /// Six wide, slow outer balls and four tight, faster inner balls.
    pub fn new(trail_length: usize, rng: &mut impl Rng) -> Self {
        let mut balls: Vec<OrbitalBall> = (0..6)
            .map(|_| OrbitalBall::random(&mut *rng, 4.0, 5.0..8.0, 1.0, trail_length))
            .collect();
        balls.extend(
            (0..4).map(|_| OrbitalBall::random(&mut *rng, 2.0, 3.0..5.0, 1.5, trail_length)),
        );
        Self {
            elapsed: 0.0,
            trail_length,
            balls,
        }
    }

    fn advance(&mut self, dt: f32, center: Vec2) {
        self.elapsed += dt;
        for ball in &mut self.balls {
            let angle = self.elapsed * ball.speed;
            ball.offset = Vec2::new(angle.cos(), angle.sin()) * ball.radius;

            ball.phase += dt * BALL_PULSE_RATE;
            ball.size = ball.base_size * (1.0 + BALL_PULSE_DEPTH * ball.phase.sin());

            ball.trail.push_front(TrailPoint {
                position: center + ball.offset,
                size: ball.size,
                color: ball.color,
            });
            ball.trail.truncate(self.trail_length);
        }
    }

    fn draw(&self, center: Vec2, surface: &mut dyn DrawSurface) {
        let cap = self.trail_length as f32;
        for ball in &self.balls {
            if ball.trail.len() > 1 {
                for (i, point) in ball.trail.iter().enumerate() {
                    let radius = point.size * (1.0 - i as f32 / cap);
                    surface.fill_circle(point.position, radius, Fill::Solid(point.color));
                }
            }
        }

        surface.fill_circle(
            center,
            CORE_RADIUS,
            Fill::RadialGradient {
                inner: Color::srgba(1.0, 1.0, 1.0, 0.8),
                outer: Color::srgba(1.0, 1.0, 1.0, 0.0),
            },
        );

        for ball in &self.balls {
            surface.fill_circle(center + ball.offset, ball.size, Fill::Solid(ball.color));
        }
    }
}
