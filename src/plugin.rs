//! Bevy host for a [`GameSession`]: window input, frame driving, gizmo
//! rendering, and the boost HUD.
//!
//! ## Systems
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | [`load_game_config`] | Startup | Overlay `assets/game.toml` onto [`GameConfig`] |
//! | [`setup_camera`] | Startup | Fixed `Camera2d`; the session does its own camera math |
//! | [`start_session`] | Startup | Build the session from the primary window size |
//! | [`setup_boost_hud`] | Startup | Top-left boost gauge text |
//! | [`forward_input_system`] | Update | Keyboard / focus / click → [`InputFeed`] |
//! | [`escape_destroys_session_system`] | Update | Escape ends the session |
//! | [`drive_session_system`] | Update | One session frame per Bevy frame, stamped with `Time` |
//! | [`render_session_system`] | Update | Draw the session through [`GizmoSurface`] |
//! | [`boost_hud_system`] | Update | Refresh the gauge text |
//!
//! The Bevy camera never moves.  [`GizmoSurface`] maps the session's canvas
//! space (origin top-left, +Y down) onto it.
//!
//! Session time is Bevy's [`Time`] (virtual clock) in milliseconds, copied into
//! the session's [`FrameClock`] before each frame.  Pausing `Time<Virtual>`
//! freezes ship physics, projectile ages and the fire cooldown.

use crate::config::{load_game_config, GameConfig};
use crate::events::{EventBus, GameEvent, GameEventKind, SubscriptionId};
use crate::input::{InputFeed, QueuedInput};
use crate::session::GameSession;
use crate::surface::{DrawSurface, Fill, TransformStack};
use crate::time::FrameClock;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowFocused};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Gizmo rings used to approximate a filled circle.
const MAX_FILL_RINGS: usize = 8;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<BoostGauge>()
            .add_systems(
                Startup,
                (
                    // Config first so the session sees the final values.
                    load_game_config,
                    setup_camera,
                    start_session,
                    setup_boost_hud,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    forward_input_system,
                    escape_destroys_session_system,
                    drive_session_system,
                    render_session_system,
                    boost_hud_system,
                )
                    .chain()
                    .run_if(resource_exists::<GameSession>),
            );
    }
}

// ── Resources / components ────────────────────────────────────────────────────

/// Host side of the session's input channel.
#[derive(Resource, Clone)]
pub struct SessionInput(pub InputFeed);

/// Host side of the session's clock.
#[derive(Resource, Clone)]
pub struct SessionClock(pub FrameClock);

/// Last published boost percentage, written by an event-bus subscription.
#[derive(Resource, Clone)]
pub struct BoostGauge(Arc<AtomicU32>);

impl Default for BoostGauge {
    fn default() -> Self {
        Self(Arc::new(AtomicU32::new(100.0f32.to_bits())))
    }
}

impl BoostGauge {
    pub fn percent(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, percent: f32) {
        self.0.store(percent.to_bits(), Ordering::Relaxed);
    }

    /// Keep this gauge in step with the bus's boost updates.
    pub fn attach(&self, events: &mut EventBus) -> SubscriptionId {
        let gauge = self.clone();
        events.subscribe(GameEventKind::BoostUpdate, move |event| {
            if let GameEvent::BoostUpdate { percent } = event {
                gauge.set(*percent);
            }
        })
    }
}

/// Marker for the boost gauge text entity.
#[derive(Component)]
pub struct BoostHud;

// ── Startup ───────────────────────────────────────────────────────────────────

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Start a session sized to the primary window and wire the gauge to it.
///
/// Fails with [`SessionError::MissingSurface`](crate::error::SessionError)
/// when there is no window to draw into.
pub fn start_session(
    mut commands: Commands,
    config: Res<GameConfig>,
    gauge: Res<BoostGauge>,
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
) -> Result {
    let viewport = windows
        .single()
        .ok()
        .map(|window| Vec2::new(window.width(), window.height()));

    let (source, feed) = QueuedInput::channel();
    let clock = FrameClock::new(elapsed_ms(&time));
    let mut session = GameSession::new((*config).clone(), viewport, clock.clone(), source)?;

    gauge.attach(session.events_mut());

    commands.insert_resource(session);
    commands.insert_resource(SessionInput(feed));
    commands.insert_resource(SessionClock(clock));
    Ok(())
}

pub fn setup_boost_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Text::new("Boost: 100%"),
        TextFont {
            font_size: config.hud_font_size,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.6, 0.2)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        BoostHud,
    ));
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Canvas-style label for a logical key: printable keys lower-cased, space as
/// `" "`, named keys by their lower-cased name (`"arrowleft"`).
pub fn key_label(key: &Key) -> String {
    match key {
        Key::Character(text) => text.to_lowercase(),
        Key::Space => " ".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// Push window input into the session's feed.
pub fn forward_input_system(
    feed: Res<SessionInput>,
    mut keyboard: MessageReader<KeyboardInput>,
    mut focus: MessageReader<WindowFocused>,
    mouse: Res<ButtonInput<MouseButton>>,
) {
    for event in keyboard.read() {
        let label = key_label(&event.logical_key);
        match event.state {
            ButtonState::Pressed => feed.0.key_down(label),
            ButtonState::Released => feed.0.key_up(label),
        };
    }

    for event in focus.read() {
        if !event.focused {
            feed.0.focus_lost();
        }
    }

    if mouse.just_pressed(MouseButton::Left) {
        feed.0.click();
    }
}

pub fn escape_destroys_session_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<GameSession>,
) {
    if keys.just_pressed(KeyCode::Escape) && session.is_running() {
        session.destroy();
    }
}

#[inline]
fn elapsed_ms(time: &Time) -> f64 {
    time.elapsed_secs_f64() * 1000.0
}

/// Run a session frame whenever the session has requested one.
///
/// The session clock is advanced first so clicks drained during the frame are
/// stamped with the same time as the frame itself.
pub fn drive_session_system(
    time: Res<Time>,
    clock: Res<SessionClock>,
    mut session: ResMut<GameSession>,
) -> Result {
    let now = elapsed_ms(&time);
    clock.0.set(now);
    if session.wants_frame() {
        session.frame(now)?;
    }
    Ok(())
}

pub fn render_session_system(session: Res<GameSession>, mut gizmos: Gizmos) -> Result {
    let mut surface = GizmoSurface::new(&mut gizmos, session.camera().viewport);
    session.render(&mut surface)?;
    Ok(())
}

pub fn boost_hud_system(
    gauge: Res<BoostGauge>,
    session: Res<GameSession>,
    mut text_query: Query<&mut Text, With<BoostHud>>,
) {
    let label = if session.is_running() {
        format!("Boost: {:.0}%", gauge.percent())
    } else {
        "Session ended".to_string()
    };
    for mut text in text_query.iter_mut() {
        if text.0 != label {
            text.0 = label.clone();
        }
    }
}

// ── Gizmo surface ─────────────────────────────────────────────────────────────

/// [`DrawSurface`] over Bevy immediate-mode gizmos.
///
/// Gizmos only draw lines, so fills are approximated: circles by concentric
/// rings (gradients interpolate ring colour), polygons by outline plus a fan
/// from the centroid.  Rectangles are outlines only; the black backdrop on
/// screen comes from `ClearColor`.
pub struct GizmoSurface<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    viewport: Vec2,
    stack: TransformStack,
}

impl<'a, 'w, 's> GizmoSurface<'a, 'w, 's> {
    pub fn new(gizmos: &'a mut Gizmos<'w, 's>, viewport: Vec2) -> Self {
        Self {
            gizmos,
            viewport,
            stack: TransformStack::default(),
        }
    }

    /// Local canvas point → Bevy world point for a camera at the origin.
    fn to_world(&self, p: Vec2) -> Vec2 {
        let screen = self.stack.apply(p);
        Vec2::new(
            screen.x - self.viewport.x / 2.0,
            self.viewport.y / 2.0 - screen.y,
        )
    }

    fn rings(radius: f32) -> usize {
        (radius.ceil() as usize).clamp(1, MAX_FILL_RINGS)
    }
}

impl DrawSurface for GizmoSurface<'_, '_, '_> {
    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn transforms(&mut self) -> &mut TransformStack {
        &mut self.stack
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let center = self.to_world(origin + size / 2.0);
        self.gizmos
            .rect_2d(Isometry2d::from_translation(center), size, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: Fill) {
        if radius <= 0.0 {
            return;
        }
        let center = self.to_world(center);
        let rings = Self::rings(radius);
        for i in 0..rings {
            // Outermost ring first; t runs 1 → 0 from rim to centre.
            let t = 1.0 - i as f32 / rings as f32;
            let color = match fill {
                Fill::Solid(color) => color,
                Fill::RadialGradient { inner, outer } => {
                    let (a, b) = (inner.to_linear(), outer.to_linear());
                    Color::from(a * (1.0 - t) + b * t)
                }
            };
            self.gizmos.circle_2d(center, radius * t, color);
        }
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Color) {
        let mut world: Vec<Vec2> = points.iter().map(|p| self.to_world(*p)).collect();
        if closed {
            if let Some(first) = world.first().copied() {
                world.push(first);
            }
        }
        self.gizmos.linestrip_2d(world, color);
    }

    fn fill_path(&mut self, points: &[Vec2], color: Color) {
        if points.is_empty() {
            return;
        }
        self.stroke_path(points, true, color);
        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        let hub = self.to_world(centroid);
        for p in points {
            let rim = self.to_world(*p);
            self.gizmos.line_2d(hub, rim, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_are_lower_cased() {
        assert_eq!(key_label(&Key::Character("W".into())), "w");
        assert_eq!(key_label(&Key::Space), " ");
        assert_eq!(key_label(&Key::ArrowLeft), "arrowleft");
    }

    #[test]
    fn ring_count_is_bounded() {
        assert_eq!(GizmoSurface::rings(0.2), 1);
        assert_eq!(GizmoSurface::rings(2.0), 2);
        assert_eq!(GizmoSurface::rings(40.0), MAX_FILL_RINGS);
    }

    #[test]
    fn gauge_round_trips_percent() {
        let gauge = BoostGauge::default();
        assert_eq!(gauge.percent(), 100.0);
        gauge.clone().set(37.5);
        assert_eq!(gauge.percent(), 37.5, "clones share the same cell");
    }

    #[test]
    fn attached_gauge_reads_boost_updates() {
        let gauge = BoostGauge::default();
        let mut bus = EventBus::new();
        gauge.attach(&mut bus);
        bus.emit(&GameEvent::BoostUpdate { percent: 12.0 });
        assert_eq!(gauge.percent(), 12.0);
    }
}
