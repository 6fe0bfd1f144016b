//! Static background stars, generated once per session.

use crate::surface::{DrawSurface, Fill};
use crate::world::WorldBounds;
use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec2,
    /// Alpha in `[0.5, 1.0)`.
    pub brightness: f32,
    /// Radius: 1 or 2.
    pub size: f32,
}

/// Scatter `floor(area / star_area)` stars uniformly over the world.
pub fn generate_stars(
    world: WorldBounds,
    star_area: f32,
    small_star_chance: f64,
    rng: &mut impl Rng,
) -> Vec<Star> {
    let count = (world.area() / star_area).floor() as usize;
    (0..count)
        .map(|_| Star {
            position: Vec2::new(
                rng.gen::<f32>() * world.width,
                rng.gen::<f32>() * world.height,
            ),
            brightness: 0.5 + rng.gen::<f32>() * 0.5,
            size: if rng.gen_bool(small_star_chance) {
                1.0
            } else {
                2.0
            },
        })
        .collect()
}

pub fn draw_stars(stars: &[Star], surface: &mut dyn DrawSurface) {
    for star in stars {
        surface.fill_circle(
            star.position,
            star.size,
            Fill::Solid(Color::srgba(1.0, 1.0, 1.0, star.brightness)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn count_follows_world_area() {
        let mut rng = StdRng::seed_from_u64(1);
        let stars = generate_stars(WorldBounds::new(1000.0, 505.0), 10_000.0, 0.9, &mut rng);
        assert_eq!(stars.len(), 50);
    }

    #[test]
    fn stars_respect_ranges() {
        let world = WorldBounds::new(2000.0, 2000.0);
        let mut rng = StdRng::seed_from_u64(2);
        let stars = generate_stars(world, 10_000.0, 0.9, &mut rng);

        for star in &stars {
            assert!(world.contains(star.position));
            assert!((0.5..1.0).contains(&star.brightness));
            assert!(star.size == 1.0 || star.size == 2.0);
        }
        let small = stars.iter().filter(|s| s.size == 1.0).count();
        assert!(small > stars.len() / 2, "most stars should be small");
    }

    #[test]
    fn same_seed_same_sky() {
        let world = WorldBounds::new(500.0, 500.0);
        let a = generate_stars(world, 1000.0, 0.9, &mut StdRng::seed_from_u64(9));
        let b = generate_stars(world, 1000.0, 0.9, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
