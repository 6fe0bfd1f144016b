//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::GameConfig::default`] copies every
//! value below, and `assets/game.toml` can override any subset at startup.
//!
//! Times are in seconds unless the name ends in `_MS` (milliseconds on the
//! session clock).  Distances are world units (one unit = one canvas pixel at
//! camera scale 1).

// ── World Bounds ──────────────────────────────────────────────────────────────

/// Width of the playable world.  The ship clamps to `[0, WORLD_WIDTH]`;
/// projectiles despawn once they leave it.
pub const WORLD_WIDTH: f32 = 4000.0;

/// Height of the playable world.
pub const WORLD_HEIGHT: f32 = 4000.0;

// ── Ship: Movement ────────────────────────────────────────────────────────────

/// Turn rate while a rotate key is held (rad/s).
pub const ROTATION_SPEED: f32 = 3.5;

/// Forward thrust acceleration (u/s²).
pub const SHIP_ACCELERATION: f32 = 200.0;

/// Reverse thrust as a fraction of [`SHIP_ACCELERATION`].
pub const REVERSE_THRUST_FACTOR: f32 = 0.5;

/// Per-frame multiplicative velocity decay.
///
/// Applied once per `update` call regardless of `dt`, so effective damping
/// depends on frame rate.  0.98 at 60 Hz sheds roughly 70 % of speed per second.
pub const DRAG: f32 = 0.98;

/// Hard cap on ship speed (u/s).
pub const MAX_VELOCITY: f32 = 400.0;

// ── Ship: Boost ───────────────────────────────────────────────────────────────

/// Thrust multiplier while boosting.
pub const BOOST_MULTIPLIER: f32 = 2.0;

/// Fuel drained per second of boost.
pub const BOOST_CONSUMPTION_RATE: f32 = 30.0;

/// Fuel regained per second while not boosting.
pub const BOOST_RECHARGE_RATE: f32 = 10.0;

/// Fuel tank capacity.  A full tank lasts `MAX_BOOST_FUEL / BOOST_CONSUMPTION_RATE` s.
pub const MAX_BOOST_FUEL: f32 = 100.0;

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Muzzle speed (u/s).
pub const PROJECTILE_SPEED: f32 = 500.0;

/// Minimum interval between shots (ms).
pub const PROJECTILE_COOLDOWN_MS: f64 = 250.0;

/// Projectiles older than this are retired even when still in bounds (ms).
pub const PROJECTILE_LIFETIME_MS: f64 = 2000.0;

/// Distance from ship centre to the nose, where projectiles spawn.
pub const NOSE_OFFSET: f32 = 20.0;

/// Maximum number of trail points kept per orbiting ball.
pub const TRAIL_LENGTH: usize = 15;

// ── Star Field ────────────────────────────────────────────────────────────────

/// World area covered per star.  4000×4000 / 10 000 = 1600 stars.
pub const STAR_AREA: f32 = 10_000.0;

/// Probability that a star is drawn at size 1 (otherwise size 2).
pub const SMALL_STAR_CHANCE: f64 = 0.9;

// ── Presentation ──────────────────────────────────────────────────────────────

/// Font size of the boost gauge HUD text.
pub const HUD_FONT_SIZE: f32 = 18.0;
