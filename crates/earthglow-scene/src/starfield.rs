//! Random point cloud surrounding the scene.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::material::PointMaterial;
use crate::transform::Transform;

/// Number of stars in the field.
pub const STAR_COUNT: usize = 20_000;
/// Stars fill the cube `[-HALF_EXTENT, HALF_EXTENT]^3`.
pub const HALF_EXTENT: f64 = 3.0;

/// Star positions are fixed after generation; only the field as a whole
/// rotates.
#[derive(Clone, Debug)]
pub struct Starfield {
    points: Vec<[f32; 3]>,
    pub material: PointMaterial,
    pub transform: Transform,
}

impl Starfield {
    /// Sample [`STAR_COUNT`] points uniformly in the cube.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let side = HALF_EXTENT * 2.0;
        let points = (0..STAR_COUNT)
            .map(|_| {
                std::array::from_fn(|_| ((rng.random::<f64>() - 0.5) * side) as f32)
            })
            .collect();

        Self {
            points,
            material: PointMaterial::default(),
            transform: Transform::default(),
        }
    }

    /// Deterministic field for `Some(seed)`, a fresh one from OS entropy
    /// otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self::generate(&mut rng)
    }

    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_count() {
        let field = Starfield::from_seed(Some(1));
        assert_eq!(field.len(), 20_000);
    }

    #[test]
    fn test_points_inside_cube() {
        let field = Starfield::from_seed(Some(99));
        for p in field.points() {
            for c in p {
                assert!((-3.0..=3.0).contains(c), "coordinate {c} outside cube");
            }
        }
    }

    #[test]
    fn test_points_cover_the_cube() {
        let field = Starfield::from_seed(Some(5));
        let max = field
            .points()
            .iter()
            .flat_map(|p| p.iter().copied())
            .fold(f32::MIN, f32::max);
        let min = field
            .points()
            .iter()
            .flat_map(|p| p.iter().copied())
            .fold(f32::MAX, f32::min);
        assert!(max > 2.9 && min < -2.9);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = Starfield::from_seed(Some(42));
        let b = Starfield::from_seed(Some(42));
        assert_eq!(a.points(), b.points());
        let c = Starfield::from_seed(Some(43));
        assert_ne!(a.points(), c.points());
    }

    #[test]
    fn test_unseeded_field_is_full() {
        let field = Starfield::from_seed(None);
        assert_eq!(field.len(), STAR_COUNT);
        assert_eq!(field.transform, Transform::default());
    }
}
