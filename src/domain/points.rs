//! Synthetic point generation standing in for spatial reconstruction.

use glam::Vec3;
use rand::Rng;

use crate::domain::models::ScenePoint;

/// Default number of points per generated set.
pub const DEFAULT_POINT_COUNT: usize = 50;

/// Default edge length of the cube the points are scattered in.
pub const DEFAULT_SPAN: f32 = 30.0;

/// Scatters points uniformly inside a cube centered on the origin.
///
/// The random source is injected so callers can seed it: the service uses a
/// persistent generator, tests use a fixed seed and assert exact positions.
#[derive(Debug, Clone, Copy)]
pub struct PointGenerator {
    span: f32,
}

impl PointGenerator {
    pub fn new(span: f32) -> Self {
        Self { span }
    }

    /// Produce exactly `count` points, each coordinate drawn independently
    /// and uniformly from `[-span/2, span/2]`.
    pub fn generate<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<ScenePoint> {
        let half = self.span / 2.0;
        (0..count)
            .map(|id| ScenePoint {
                id: id as u32,
                position: Vec3::new(
                    rng.gen_range(-half..=half),
                    rng.gen_range(-half..=half),
                    rng.gen_range(-half..=half),
                ),
            })
            .collect()
    }
}

impl Default for PointGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SPAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_exactly_the_requested_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = PointGenerator::default().generate(&mut rng, DEFAULT_POINT_COUNT);
        assert_eq!(points.len(), DEFAULT_POINT_COUNT);
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let points = PointGenerator::default().generate(&mut rng, 10);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.id, i as u32);
        }
    }

    #[test]
    fn coordinates_stay_inside_the_span() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = PointGenerator::new(30.0).generate(&mut rng, 500);
        for point in &points {
            for coord in point.position.to_array() {
                assert!(
                    (-15.0..=15.0).contains(&coord),
                    "coordinate {coord} escaped the scan volume"
                );
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_cloud() {
        let generator = PointGenerator::new(8.0);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(
            generator.generate(&mut a, 25),
            generator.generate(&mut b, 25)
        );
    }

    #[test]
    fn different_seeds_diverge() {
        let generator = PointGenerator::new(8.0);
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(2);
        assert_ne!(
            generator.generate(&mut a, 25),
            generator.generate(&mut b, 25)
        );
    }
}
