//! Uniform spawn sampling with bounded attempts.
//!
//! [`UniformSpawnSampler`] draws candidate points uniformly over the
//! horizontal extent of an area and keeps the first one the obstacle
//! predicate accepts. [`sample_or_fallback`] wraps any [`SpawnSampler`],
//! lifts its answer to the spawn height and degrades to the area center
//! instead of failing.

use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wayfind_core::{Bounds, SampleError, SpawnSampler, Vec3};

/// Reference [`SpawnSampler`] drawing from a seeded ChaCha8 stream.
///
/// Candidates are `center + (U(-ex, ex), 0, U(-ez, ez))`: they lie on
/// the horizontal plane through the area center, whatever the vertical
/// extent.
#[derive(Clone, Debug)]
pub struct UniformSpawnSampler {
    rng: ChaCha8Rng,
}

impl UniformSpawnSampler {
    /// Create a sampler seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restart the candidate stream.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl SpawnSampler for UniformSpawnSampler {
    fn sample(
        &mut self,
        bounds: &Bounds,
        is_free: &dyn Fn(Vec3) -> bool,
        max_attempts: u32,
    ) -> Result<Vec3, SampleError> {
        let ex = bounds.extents.x;
        let ez = bounds.extents.z;
        for _ in 0..max_attempts {
            let dx = self.rng.random_range(-ex..=ex);
            let dz = self.rng.random_range(-ez..=ez);
            let candidate = bounds.center + Vec3::new(dx, 0.0, dz);
            if is_free(candidate) {
                return Ok(candidate);
            }
        }
        Err(SampleError::Exhausted {
            attempts: max_attempts,
        })
    }
}

/// A spawn position and whether it came from the fallback path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    /// Where to spawn.
    pub position: Vec3,
    /// `true` when sampling was exhausted and the safe point was used.
    pub fell_back: bool,
}

/// Sample a free point and lift it by `height`, or fall back to the area
/// center lifted by the same `height` when the sampler gives up.
/// `is_free` is checked at the lifted point. Exhaustion is logged, never
/// propagated.
pub fn sample_or_fallback(
    sampler: &mut dyn SpawnSampler,
    bounds: &Bounds,
    is_free: &dyn Fn(Vec3) -> bool,
    max_attempts: u32,
    height: f32,
) -> SpawnPoint {
    let lift = Vec3::UP * height;
    let lifted_free = |p: Vec3| is_free(p + lift);
    match sampler.sample(bounds, &lifted_free, max_attempts) {
        Ok(floor) => SpawnPoint {
            position: floor + lift,
            fell_back: false,
        },
        Err(e) => {
            let position = bounds.center + lift;
            warn!("spawn sampling failed ({e}); using safe point {position:?}");
            SpawnPoint {
                position,
                fell_back: true,
            }
        }
    }
}

/// Uniform heading in `[0, 360)` degrees.
pub fn random_yaw<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(0.0..360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn area() -> Bounds {
        Bounds::new(Vec3::new(5.0, 0.0, 5.0), Vec3::new(10.0, 2.0, 10.0))
    }

    #[test]
    fn samples_inside_horizontal_extent() {
        let mut sampler = UniformSpawnSampler::new(11);
        for _ in 0..200 {
            let p = sampler.sample(&area(), &|_| true, 10).unwrap();
            assert!((p.x - 5.0).abs() <= 10.0);
            assert!((p.z - 5.0).abs() <= 10.0);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let calls = Cell::new(0u32);
        let mut sampler = UniformSpawnSampler::new(11);
        let result = sampler.sample(
            &area(),
            &|_| {
                calls.set(calls.get() + 1);
                false
            },
            50,
        );
        assert_eq!(result, Err(SampleError::Exhausted { attempts: 50 }));
        assert_eq!(calls.get(), 50);
    }

    #[test]
    fn predicate_filters_candidates() {
        let mut sampler = UniformSpawnSampler::new(5);
        // Only the positive-x half is free.
        let p = sampler.sample(&area(), &|p| p.x > 5.0, 1000).unwrap();
        assert!(p.x > 5.0);
    }

    #[test]
    fn fallback_uses_lifted_center() {
        let mut sampler = UniformSpawnSampler::new(1);
        let spawn = sample_or_fallback(&mut sampler, &area(), &|_| false, 5, 1.0);
        assert!(spawn.fell_back);
        assert_eq!(spawn.position, Vec3::new(5.0, 1.0, 5.0));
    }

    #[test]
    fn sampled_and_fallback_points_share_height() {
        let mut sampler = UniformSpawnSampler::new(4);
        let checked = Cell::new(0.0f32);
        let sampled = sample_or_fallback(
            &mut sampler,
            &area(),
            &|p| {
                checked.set(p.y);
                true
            },
            5,
            2.5,
        );
        assert!(!sampled.fell_back);
        assert_eq!(sampled.position.y, 2.5);
        assert_eq!(checked.get(), 2.5);

        let fallback = sample_or_fallback(&mut sampler, &area(), &|_| false, 5, 2.5);
        assert!(fallback.fell_back);
        assert_eq!(fallback.position.y, sampled.position.y);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = UniformSpawnSampler::new(99);
        let mut b = UniformSpawnSampler::new(99);
        for _ in 0..20 {
            assert_eq!(
                a.sample(&area(), &|_| true, 1),
                b.sample(&area(), &|_| true, 1)
            );
        }
    }

    #[test]
    fn zero_extent_samples_center() {
        let flat = Bounds::new(Vec3::new(1.0, 0.0, 2.0), Vec3::ZERO);
        let mut sampler = UniformSpawnSampler::new(3);
        let p = sampler.sample(&flat, &|_| true, 1).unwrap();
        assert_eq!(p, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn random_yaw_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..500 {
            let y = random_yaw(&mut rng);
            assert!((0.0..360.0).contains(&y));
        }
    }
}
