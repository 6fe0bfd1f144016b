//! Viewport that tracks a point in the world.
//!
//! The camera snaps to its target every frame (no easing) and is not clamped to
//! the world, so near an edge the view shows empty space past the boundary.

use crate::surface::DrawSurface;
use crate::world::WorldBounds;
use bevy::math::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position of the viewport's top-left corner.
    pub position: Vec2,
    pub viewport: Vec2,
    pub world: WorldBounds,
}

impl Camera {
    pub fn new(viewport: Vec2, world: WorldBounds) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
            world,
        }
    }

    /// Centre the viewport on `(target_x, target_y)`.
    pub fn follow(&mut self, target_x: f32, target_y: f32) {
        self.position.x = target_x - self.viewport.x / 2.0;
        self.position.y = target_y - self.viewport.y / 2.0;
    }

    /// Open a save on `surface` and shift its origin so world coordinates can
    /// be drawn directly.  Pair with `surface.restore()`.
    pub fn apply(&self, surface: &mut dyn DrawSurface) {
        surface.save();
        surface.translate(-self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Fill, RecordingSurface};
    use bevy::color::Color;

    fn camera() -> Camera {
        Camera::new(Vec2::new(800.0, 600.0), WorldBounds::new(4000.0, 4000.0))
    }

    #[test]
    fn follow_centres_target_exactly() {
        let mut cam = camera();
        cam.follow(1000.0, 2000.0);
        assert_eq!(cam.position, Vec2::new(600.0, 1700.0));
    }

    #[test]
    fn follow_ignores_prior_state() {
        let mut cam = camera();
        cam.position = Vec2::new(-9999.0, 12345.0);
        cam.follow(10.0, 10.0);
        assert_eq!(cam.position, Vec2::new(-390.0, -290.0), "no clamping, no easing");
    }

    #[test]
    fn apply_puts_followed_point_at_screen_centre() {
        let mut cam = camera();
        cam.follow(1500.0, 700.0);
        let mut surface = RecordingSurface::new(cam.viewport);

        cam.apply(&mut surface);
        surface.fill_circle(Vec2::new(1500.0, 700.0), 1.0, Fill::Solid(Color::WHITE));
        surface.restore();

        let (center, _, _) = surface.circles().next().unwrap();
        assert_eq!(center, Vec2::new(400.0, 300.0));
    }
}
