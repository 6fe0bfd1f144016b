//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! The session copies the config at construction; edits after that point do
//! not reach a running session.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{SessionError, SessionResult};
use crate::world::WorldBounds;
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Default location of the override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/game.toml";

/// Which projectile variant the fire action spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissileStyle {
    /// Plain pulsing dot.
    Missile,
    /// Core with orbiting, trailing coloured balls.
    #[default]
    ColorMissile,
}

/// Key labels bound to each ship control.
///
/// Labels are compared lower-cased, the same way captured keys are stored.
/// Space is the single-character string `" "`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub rotate_left: String,
    pub rotate_right: String,
    pub forward: String,
    pub reverse: String,
    pub boost: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            rotate_left: "a".into(),
            rotate_right: "d".into(),
            forward: "w".into(),
            reverse: "s".into(),
            boost: " ".into(),
        }
    }
}

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World Bounds ─────────────────────────────────────────────────────────
    pub world_width: f32,
    pub world_height: f32,

    // ── Ship: Movement ────────────────────────────────────────────────────────
    pub rotation_speed: f32,
    pub ship_acceleration: f32,
    pub reverse_thrust_factor: f32,
    pub drag: f32,
    pub max_velocity: f32,

    // ── Ship: Boost ───────────────────────────────────────────────────────────
    pub boost_multiplier: f32,
    pub boost_consumption_rate: f32,
    pub boost_recharge_rate: f32,
    pub max_boost_fuel: f32,

    // ── Projectiles ───────────────────────────────────────────────────────────
    pub projectile_speed: f32,
    pub projectile_cooldown_ms: f64,
    pub projectile_lifetime_ms: f64,
    pub nose_offset: f32,
    pub trail_length: usize,
    pub missile_style: MissileStyle,

    // ── Star Field ────────────────────────────────────────────────────────────
    pub star_area: f32,
    /// Fixed seed for stars and missile cosmetics; `None` draws from entropy.
    pub rng_seed: Option<u64>,

    // ── Presentation ──────────────────────────────────────────────────────────
    pub hud_font_size: f32,

    // ── Input ─────────────────────────────────────────────────────────────────
    pub keys: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World Bounds
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            // Ship: Movement
            rotation_speed: ROTATION_SPEED,
            ship_acceleration: SHIP_ACCELERATION,
            reverse_thrust_factor: REVERSE_THRUST_FACTOR,
            drag: DRAG,
            max_velocity: MAX_VELOCITY,
            // Ship: Boost
            boost_multiplier: BOOST_MULTIPLIER,
            boost_consumption_rate: BOOST_CONSUMPTION_RATE,
            boost_recharge_rate: BOOST_RECHARGE_RATE,
            max_boost_fuel: MAX_BOOST_FUEL,
            // Projectiles
            projectile_speed: PROJECTILE_SPEED,
            projectile_cooldown_ms: PROJECTILE_COOLDOWN_MS,
            projectile_lifetime_ms: PROJECTILE_LIFETIME_MS,
            nose_offset: NOSE_OFFSET,
            trail_length: TRAIL_LENGTH,
            missile_style: MissileStyle::default(),
            // Star Field
            star_area: STAR_AREA,
            rng_seed: None,
            // Presentation
            hud_font_size: HUD_FONT_SIZE,
            // Input
            keys: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    /// The world rectangle described by `world_width` × `world_height`.
    #[inline]
    pub fn world(&self) -> WorldBounds {
        WorldBounds::new(self.world_width, self.world_height)
    }

    /// Reject values the integrator cannot work with.
    pub fn validate(&self) -> SessionResult<()> {
        positive("world_width", self.world_width)?;
        positive("world_height", self.world_height)?;
        positive("max_velocity", self.max_velocity)?;
        positive("max_boost_fuel", self.max_boost_fuel)?;
        positive("star_area", self.star_area)?;
        non_negative("rotation_speed", self.rotation_speed)?;
        non_negative("ship_acceleration", self.ship_acceleration)?;
        non_negative("reverse_thrust_factor", self.reverse_thrust_factor)?;
        non_negative("boost_consumption_rate", self.boost_consumption_rate)?;
        non_negative("boost_recharge_rate", self.boost_recharge_rate)?;
        non_negative("projectile_speed", self.projectile_speed)?;
        non_negative("projectile_cooldown_ms", self.projectile_cooldown_ms as f32)?;
        positive("projectile_lifetime_ms", self.projectile_lifetime_ms as f32)?;
        non_negative("nose_offset", self.nose_offset)?;
        positive("hud_font_size", self.hud_font_size)?;

        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(SessionError::InvalidConfig {
                name: "drag",
                value: self.drag as f64,
                expected: "(0.0, 1.0]",
            });
        }
        if !(self.boost_multiplier >= 1.0 && self.boost_multiplier.is_finite()) {
            return Err(SessionError::InvalidConfig {
                name: "boost_multiplier",
                value: self.boost_multiplier as f64,
                expected: "[1.0, ∞)",
            });
        }
        if self.trail_length == 0 {
            return Err(SessionError::InvalidConfig {
                name: "trail_length",
                value: 0.0,
                expected: "[1, ∞)",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> SessionResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SessionError::InvalidConfig {
            name,
            value: value as f64,
            expected: "(0.0, ∞)",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> SessionResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SessionError::InvalidConfig {
            name,
            value: value as f64,
            expected: "[0.0, ∞)",
        })
    }
}

/// Read `path` and overlay it onto the defaults.
///
/// A missing file is silently ignored.  TOML parse errors and values that fail
/// [`GameConfig::validate`] are logged and the defaults are returned instead;
/// a bad config file never stops the game from starting.
pub fn load_game_config_from(path: impl AsRef<Path>) -> GameConfig {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            info!("No {} found; using compiled defaults", path.display());
            return GameConfig::default();
        }
    };

    match parse_game_config(&contents) {
        Ok(config) => {
            info!("Loaded game config from {}", path.display());
            config
        }
        Err(reason) => {
            warn!("Ignoring {}: {reason}; using defaults", path.display());
            GameConfig::default()
        }
    }
}

/// Parse and validate a TOML document.
pub fn parse_game_config(contents: &str) -> Result<GameConfig, String> {
    let config = toml::from_str::<GameConfig>(contents).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Startup system: overwrite the [`GameConfig`] resource from [`CONFIG_PATH`].
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    *config = load_game_config_from(CONFIG_PATH);
}
