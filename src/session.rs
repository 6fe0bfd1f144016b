//! The game session: owns every piece of world state and drives the frame loop.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──► Running ──destroy()──► Destroyed (terminal)
//! ```
//!
//! A session starts `Running` with its first frame already requested.  The
//! host calls [`GameSession::frame`] (or [`GameSession::tick`]) whenever
//! [`GameSession::wants_frame`] is true and [`GameSession::render`] to draw.
//! After `destroy()` every entry point is a no-op, including a frame callback
//! the host had already scheduled.
//!
//! ## Frame pipeline
//!
//! 1. Drain the injected [`InputSource`] into the held-key set (clicks fire).
//! 2. `dt` = seconds since the previous frame's timestamp.
//! 3. Ship physics from the held keys.
//! 4. Camera recentres on the ship.
//! 5. Retire projectiles that are too old **or** outside the world, then move
//!    the survivors.
//! 6. Publish [`GameEvent::BoostUpdate`].

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::constants::SMALL_STAR_CHANCE;
use crate::error::{SessionError, SessionResult};
use crate::events::{EventBus, GameEvent};
use crate::input::{HeldKeys, InputSignal, InputSource, ShipInput};
use crate::projectile::Projectile;
use crate::ship::Ship;
use crate::starfield::{draw_stars, generate_stars, Star};
use crate::surface::DrawSurface;
use crate::time::Clock;
use crate::world::EntityId;
use bevy::color::Color;
use bevy::log::{debug, info};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// Terminal: no further updates, renders, shots, or input.
    Destroyed,
}

#[derive(Resource)]
pub struct GameSession {
    config: GameConfig,
    state: SessionState,
    player_id: EntityId,
    /// Always exactly one entry: the player's ship.
    ships: HashMap<EntityId, Ship>,
    /// Draw order only; liveness does not depend on position in the list.
    projectiles: Vec<Projectile>,
    stars: Vec<Star>,
    camera: Camera,
    keys: HeldKeys,
    events: EventBus,
    clock: Box<dyn Clock>,
    input: Box<dyn InputSource>,
    rng: StdRng,
    /// Timestamp (ms) of the previous frame; seeded at construction.
    last_timestamp: f64,
    pending_frame: bool,
    frame_count: u64,
}

impl GameSession {
    /// Build the world and start the loop.
    ///
    /// `viewport` is the size of the drawing surface the session will render
    /// into; `None` means there is no surface and construction fails.
    pub fn new(
        config: GameConfig,
        viewport: Option<Vec2>,
        clock: impl Clock + 'static,
        input: impl InputSource + 'static,
    ) -> SessionResult<Self> {
        let viewport = viewport.ok_or(SessionError::MissingSurface)?;
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = config.world();
        let stars = generate_stars(world, config.star_area, SMALL_STAR_CHANCE, &mut rng);

        let player_id = EntityId::new();
        let ship = Ship::new(player_id, world.center(), config.max_boost_fuel);
        let mut camera = Camera::new(viewport, world);
        camera.follow(ship.position.x, ship.position.y);

        info!(
            "Session started: ship {} in {}x{} world, {} stars, viewport {}x{}",
            player_id,
            world.width,
            world.height,
            stars.len(),
            viewport.x,
            viewport.y
        );

        let last_timestamp = clock.now_ms();
        Ok(Self {
            config,
            state: SessionState::Running,
            player_id,
            ships: HashMap::from([(player_id, ship)]),
            projectiles: Vec::new(),
            stars,
            camera,
            keys: HeldKeys::default(),
            events: EventBus::new(),
            clock: Box::new(clock),
            input: Box::new(input),
            rng,
            last_timestamp,
            pending_frame: true,
            frame_count: 0,
        })
    }

    // ── Frame loop ────────────────────────────────────────────────────────────

    /// Frame callback for a host-supplied timestamp (ms, session clock).
    pub fn frame(&mut self, timestamp_ms: f64) -> SessionResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        self.pending_frame = false;

        self.process_input();

        let dt = ((timestamp_ms - self.last_timestamp) / 1000.0).max(0.0) as f32;
        self.last_timestamp = timestamp_ms;

        self.update(dt, timestamp_ms)?;

        self.frame_count += 1;
        self.pending_frame = true;
        Ok(())
    }

    /// Frame callback stamped with the session's own clock.
    pub fn tick(&mut self) -> SessionResult<()> {
        let now = self.clock.now_ms();
        self.frame(now)
    }

    fn process_input(&mut self) {
        for signal in self.input.drain() {
            match signal {
                InputSignal::KeyDown(label) => self.key_down(&label),
                InputSignal::KeyUp(label) => self.key_up(&label),
                InputSignal::FocusLost => self.focus_lost(),
                InputSignal::Click => {
                    self.handle_click();
                }
            }
        }
    }

    fn update(&mut self, dt: f32, now: f64) -> SessionResult<()> {
        let input = ShipInput::from_keys(&self.keys, &self.config.keys);
        let ship = self
            .ships
            .get_mut(&self.player_id)
            .ok_or(SessionError::ShipNotFound { id: self.player_id })?;
        ship.update(&input, dt, &self.config);

        let position = ship.position;
        let percent = ship.boost_percent(self.config.max_boost_fuel);

        self.camera.follow(position.x, position.y);

        let lifetime = self.config.projectile_lifetime_ms;
        let world = self.config.world();
        self.projectiles
            .retain(|p| p.age_ms(now) < lifetime && world.contains(p.position));
        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }

        self.events.emit(&GameEvent::BoostUpdate { percent });
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Draw the frame: background, then stars, ships and projectiles in world
    /// space under the camera transform.
    pub fn render(&self, surface: &mut dyn DrawSurface) -> SessionResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        if !self.ships.contains_key(&self.player_id) {
            return Err(SessionError::ShipNotFound { id: self.player_id });
        }

        let viewport = surface.viewport();
        surface.fill_rect(Vec2::ZERO, viewport, Color::BLACK);

        self.camera.apply(surface);

        draw_stars(&self.stars, surface);

        for ship in self.ships.values() {
            surface.save();
            ship.draw(surface);
            surface.restore();
        }

        for projectile in &self.projectiles {
            projectile.draw(surface);
        }

        surface.restore();
        Ok(())
    }

    // ── Fire action ───────────────────────────────────────────────────────────

    /// Fire from the ship's nose if the cooldown has elapsed.
    ///
    /// Returns `true` when a projectile was spawned.
    pub fn handle_click(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let now = self.clock.now_ms();
        let Some(ship) = self.ships.get_mut(&self.player_id) else {
            return false;
        };
        if let Some(last) = ship.last_shot {
            if now - last < self.config.projectile_cooldown_ms {
                return false;
            }
        }

        let direction = ship.direction();
        let position = ship.nose(self.config.nose_offset);
        ship.last_shot = Some(now);

        let projectile = Projectile::spawn(
            self.config.missile_style,
            position,
            direction * self.config.projectile_speed,
            now,
            self.config.trail_length,
            &mut self.rng,
        );
        debug!("Fired projectile {} at {:?}", projectile.id, position);
        self.projectiles.push(projectile);
        true
    }

    // ── Input capture ─────────────────────────────────────────────────────────

    pub fn key_down(&mut self, label: &str) {
        if self.is_running() {
            self.keys.press(label);
        }
    }

    pub fn key_up(&mut self, label: &str) {
        if self.is_running() {
            self.keys.release(label);
        }
    }

    /// Forget every held key; the window may have missed their release.
    pub fn focus_lost(&mut self) {
        self.keys.clear();
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    /// Stop the loop, detach input and drop all event subscriptions.
    /// Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.state = SessionState::Destroyed;
        self.pending_frame = false;
        self.input.detach();
        self.events.clear();
        info!(
            "Session destroyed after {} frames ({} projectiles live)",
            self.frame_count,
            self.projectiles.len()
        );
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn ship(&self) -> SessionResult<&Ship> {
        self.ships
            .get(&self.player_id)
            .ok_or(SessionError::ShipNotFound { id: self.player_id })
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.keys
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Whether the session has asked the host for another frame callback.
    pub fn wants_frame(&self) -> bool {
        self.pending_frame
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GameEventKind;
    use crate::input::{InputFeed, QueuedInput};
    use crate::surface::{DrawCommand, RecordingSurface};
    use crate::time::FrameClock;
    use std::sync::{Arc, Mutex};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    struct Harness {
        session: GameSession,
        clock: FrameClock,
        feed: InputFeed,
    }

    fn harness_with(config: GameConfig) -> Harness {
        let clock = FrameClock::new(0.0);
        let (source, feed) = QueuedInput::channel();
        let session = GameSession::new(
            GameConfig {
                rng_seed: Some(42),
                ..config
            },
            Some(VIEWPORT),
            clock.clone(),
            source,
        )
        .expect("valid session");
        Harness {
            session,
            clock,
            feed,
        }
    }

    fn harness() -> Harness {
        harness_with(GameConfig::default())
    }

    impl Harness {
        /// Advance the clock by `ms` and run one frame.
        fn step(&mut self, ms: f64) {
            self.clock.advance(ms);
            self.session.tick().expect("frame should succeed");
        }
    }

    // ── construction ──────────────────────────────────────────────────────────

    #[test]
    fn construction_without_surface_fails() {
        let (source, _feed) = QueuedInput::channel();
        let result = GameSession::new(GameConfig::default(), None, FrameClock::new(0.0), source);
        assert!(matches!(result, Err(SessionError::MissingSurface)));
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let (source, _feed) = QueuedInput::channel();
        let config = GameConfig {
            max_velocity: -1.0,
            ..Default::default()
        };
        let result = GameSession::new(config, Some(VIEWPORT), FrameClock::new(0.0), source);
        assert!(matches!(
            result,
            Err(SessionError::InvalidConfig {
                name: "max_velocity",
                ..
            })
        ));
    }

    #[test]
    fn new_session_is_running_with_a_centred_ship() {
        let h = harness();
        let ship = h.session.ship().unwrap();

        assert!(h.session.is_running());
        assert!(h.session.wants_frame(), "loop starts immediately");
        assert_eq!(ship.id, h.session.player_id());
        assert_eq!(ship.position, Vec2::new(2000.0, 2000.0));
        assert_eq!(ship.boost_fuel, h.session.config().max_boost_fuel);
        assert_eq!(h.session.stars().len(), 1600);
        assert!(h.session.projectiles().is_empty());
        assert_eq!(h.session.camera().position, Vec2::new(1600.0, 1700.0));
    }

    // ── frame loop ────────────────────────────────────────────────────────────

    #[test]
    fn first_frame_measures_from_construction() {
        let clock = FrameClock::new(1000.0);
        let (source, feed) = QueuedInput::channel();
        let mut session = GameSession::new(
            GameConfig::default(),
            Some(VIEWPORT),
            clock.clone(),
            source,
        )
        .unwrap();
        feed.key_down("w");

        session.frame(1500.0).unwrap();

        // dt = 0.5 s: v = 200 * 0.5 * 0.98 = 98, x += 98 * 0.5.
        let ship = session.ship().unwrap();
        assert!((ship.velocity.x - 98.0).abs() < 1e-3, "{:?}", ship.velocity);
        assert!((ship.position.x - 2049.0).abs() < 1e-3, "{:?}", ship.position);
        assert_eq!(session.frame_count(), 1);
    }

    #[test]
    fn backwards_timestamp_is_a_zero_step() {
        let mut h = harness();
        h.feed.key_down("w");
        h.session.frame(-500.0).unwrap();
        assert_eq!(h.session.ship().unwrap().position, Vec2::new(2000.0, 2000.0));
    }

    #[test]
    fn camera_tracks_ship_every_frame() {
        let mut h = harness();
        h.feed.key_down("w");
        for _ in 0..30 {
            h.step(16.0);
            let ship = h.session.ship().unwrap().position;
            assert_eq!(h.session.camera().position, ship - VIEWPORT / 2.0);
        }
    }

    #[test]
    fn boost_update_is_published_each_frame() {
        let mut h = harness();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        h.session
            .events_mut()
            .subscribe(GameEventKind::BoostUpdate, move |e| {
                if let GameEvent::BoostUpdate { percent } = e {
                    sink.lock().unwrap().push(*percent);
                }
            });

        h.feed.key_down(" ");
        h.step(100.0);
        h.step(100.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        // 30 fuel/s for 0.1 s = 3 % of a 100-unit tank per frame.
        assert!((seen[0] - 97.0).abs() < 1e-3, "{seen:?}");
        assert!((seen[1] - 94.0).abs() < 1e-3, "{seen:?}");
    }

    // ── firing ────────────────────────────────────────────────────────────────

    #[test]
    fn fire_spawns_at_the_nose_with_muzzle_velocity() {
        let mut h = harness();
        assert!(h.session.handle_click(), "first shot is never on cooldown");

        let p = &h.session.projectiles()[0];
        assert_eq!(p.position, Vec2::new(2020.0, 2000.0));
        assert_eq!(p.velocity, Vec2::new(500.0, 0.0));
        assert_eq!(p.created_at, 0.0);
        assert_eq!(h.session.ship().unwrap().last_shot, Some(0.0));
    }

    #[test]
    fn second_shot_inside_cooldown_is_ignored() {
        let mut h = harness();
        assert!(h.session.handle_click());
        h.clock.advance(100.0);
        assert!(!h.session.handle_click());
        assert_eq!(h.session.projectiles().len(), 1);

        h.clock.advance(151.0); // 251 ms since the first shot
        assert!(h.session.handle_click());
        assert_eq!(h.session.projectiles().len(), 2);
    }

    #[test]
    fn click_signals_fire_on_the_next_frame() {
        let mut h = harness();
        h.feed.click();
        assert!(h.session.projectiles().is_empty());

        h.step(16.0);

        assert_eq!(h.session.projectiles().len(), 1);
    }

    // ── projectile retirement ─────────────────────────────────────────────────

    #[test]
    fn projectile_expires_at_lifetime_even_in_bounds() {
        let mut h = harness();
        h.session.handle_click();

        h.step(1999.0);
        assert_eq!(h.session.projectiles().len(), 1, "still alive before lifetime");
        assert!(h.session.config().world().contains(h.session.projectiles()[0].position));

        h.step(1.0);
        assert!(h.session.projectiles().is_empty(), "retired at exactly the lifetime");
    }

    #[test]
    fn projectile_leaving_world_is_removed_next_frame() {
        let mut h = harness_with(GameConfig {
            projectile_speed: 100_000.0,
            ..Default::default()
        });
        h.session.handle_click();

        h.step(100.0);
        let p = &h.session.projectiles()[0];
        assert!(!h.session.config().world().contains(p.position), "left the world");

        h.step(16.0);
        assert!(h.session.projectiles().is_empty());
    }

    #[test]
    fn survivors_keep_their_order() {
        let mut h = harness();
        h.session.handle_click();
        h.clock.advance(300.0);
        h.session.handle_click();
        let ids: Vec<_> = h.session.projectiles().iter().map(|p| p.id).collect();

        h.step(16.0);

        let after: Vec<_> = h.session.projectiles().iter().map(|p| p.id).collect();
        assert_eq!(ids, after);
    }

    // ── input capture ─────────────────────────────────────────────────────────

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut h = harness();
        h.feed.key_down("w");
        h.feed.key_down("D");
        h.step(16.0);
        assert_eq!(h.session.held_keys().len(), 2);
        assert!(h.session.held_keys().is_held("d"));

        h.feed.focus_lost();
        h.step(16.0);

        assert!(h.session.held_keys().is_empty());
    }

    // ── rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn render_draws_background_then_world_with_balanced_stack() {
        let mut h = harness();
        h.session.handle_click();
        let mut surface = RecordingSurface::new(VIEWPORT);

        h.session.render(&mut surface).unwrap();

        assert_eq!(
            surface.commands[0],
            DrawCommand::Rect {
                origin: Vec2::ZERO,
                size: VIEWPORT,
                color: Color::BLACK,
            }
        );
        assert_eq!(surface.open_saves(), 0);
        // The ship sits at the viewport centre, nose pointing right.
        let hull = surface.strokes().next().expect("ship outline");
        assert!((hull[0] - Vec2::new(420.0, 300.0)).length() < 1e-3);
        // Stars + core + 10 balls.
        assert_eq!(surface.circles().count(), 1600 + 11);
    }

    // ── destroy ───────────────────────────────────────────────────────────────

    #[test]
    fn destroy_turns_every_entry_point_into_a_no_op() {
        let mut h = harness();
        h.session
            .events_mut()
            .subscribe(GameEventKind::BoostUpdate, |_| {});
        h.step(16.0);
        let before = h.session.ship().unwrap().clone();

        h.session.destroy();
        h.session.destroy();

        assert_eq!(h.session.state(), SessionState::Destroyed);
        assert!(!h.session.wants_frame());
        assert!(h.session.events_mut().is_empty());
        assert!(!h.feed.key_down("w"), "input listeners are detached");

        // A frame callback scheduled before destroy fires late.
        h.step(500.0);
        h.session.key_down("w");
        assert!(!h.session.handle_click());

        let mut surface = RecordingSurface::new(VIEWPORT);
        h.session.render(&mut surface).unwrap();

        assert!(surface.commands.is_empty());
        assert_eq!(h.session.ship().unwrap(), &before);
        assert!(h.session.projectiles().is_empty());
        assert!(h.session.held_keys().is_empty());
        assert_eq!(h.session.frame_count(), 1);
        assert!(!h.session.wants_frame(), "a stale frame does not reschedule");
    }
}
