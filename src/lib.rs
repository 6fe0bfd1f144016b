//! Starship sandbox library
//!
//! A single-ship space-combat playground: thrust, boost and drag physics in a
//! bounded world, missiles with orbiting cosmetic particles, and a camera that
//! follows the ship across a static starfield.
//!
//! The simulation ([`session::GameSession`] and everything below it) is
//! headless and renders through [`surface::DrawSurface`]; [`plugin`] hosts it
//! in a Bevy window.

pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod input;
pub mod plugin;
pub mod projectile;
pub mod session;
pub mod ship;
pub mod starfield;
pub mod surface;
pub mod time;
pub mod world;
