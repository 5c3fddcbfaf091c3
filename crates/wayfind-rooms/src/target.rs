//! Target placement inside the goal room.

use rand::Rng;
use serde::{Deserialize, Serialize};
use wayfind_core::{ConfigError, Vec3};

/// Where the target goes relative to the goal room's center.
///
/// The horizontal offset is drawn uniformly in
/// `[-horizontal_offset, horizontal_offset]` on both horizontal axes;
/// the vertical offset is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPlacement {
    /// Maximum horizontal displacement from the room center. Default: 1.0.
    pub horizontal_offset: f32,
    /// Height above the room center. Default: 0.5.
    pub height: f32,
}

impl Default for TargetPlacement {
    fn default() -> Self {
        Self {
            horizontal_offset: 1.0,
            height: 0.5,
        }
    }
}

impl TargetPlacement {
    /// Check that both offsets are finite and the horizontal one non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.horizontal_offset.is_finite() || self.horizontal_offset < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "target.horizontal_offset",
                reason: format!(
                    "must be finite and >= 0, got {}",
                    self.horizontal_offset
                ),
            });
        }
        if !self.height.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "target.height",
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Draw a target position around `room_center`.
    pub fn place<R: Rng + ?Sized>(&self, room_center: Vec3, rng: &mut R) -> Vec3 {
        let h = self.horizontal_offset;
        let dx = rng.random_range(-h..=h);
        let dz = rng.random_range(-h..=h);
        room_center + Vec3::new(dx, self.height, dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn placement_stays_within_offset() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let placement = TargetPlacement {
            horizontal_offset: 1.5,
            height: 0.5,
        };
        let center = Vec3::new(10.0, 0.0, -4.0);
        for _ in 0..500 {
            let p = placement.place(center, &mut rng);
            assert!((p.x - center.x).abs() <= 1.5);
            assert!((p.z - center.z).abs() <= 1.5);
            assert_eq!(p.y, 0.5);
        }
    }

    #[test]
    fn zero_offset_places_on_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let placement = TargetPlacement {
            horizontal_offset: 0.0,
            height: 1.0,
        };
        let p = placement.place(Vec3::new(2.0, 0.0, 2.0), &mut rng);
        assert_eq!(p, Vec3::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn negative_offset_rejected() {
        let placement = TargetPlacement {
            horizontal_offset: -1.0,
            height: 0.5,
        };
        assert!(placement.validate().is_err());
    }
}
