//! Minimal 3D geometry used by the episode core.
//!
//! The core never integrates motion itself; it only needs positions to
//! place rooms, targets and agents, and distances to decide when a
//! travelling agent has arrived. The vertical axis is `y`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point or direction in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west axis.
    pub x: f32,
    /// Vertical axis.
    pub y: f32,
    /// North-south axis.
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    /// Unit vector pointing up.
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    /// Construct a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    /// Whether every component is exactly zero.
    ///
    /// Used to recognise the degenerate "no stop recorded" position.
    pub fn is_origin(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Whether every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Position plus heading about the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// Heading in degrees, `[0, 360)`.
    pub yaw_degrees: f32,
}

impl Pose {
    /// Construct a pose.
    pub const fn new(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            yaw_degrees,
        }
    }

    /// Same position, different heading.
    pub fn with_yaw(self, yaw_degrees: f32) -> Self {
        Self {
            position: self.position,
            yaw_degrees,
        }
    }
}

/// Axis-aligned box described by its center and half-extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Center of the box.
    pub center: Vec3,
    /// Half-size along each axis. All components must be non-negative.
    pub extents: Vec3,
}

impl Bounds {
    /// Construct bounds from center and half-extents.
    pub const fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    /// Check that the bounds are finite with non-negative extents.
    pub fn validate(&self) -> Result<(), String> {
        if !self.center.is_finite() || !self.extents.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        if self.extents.x < 0.0 || self.extents.y < 0.0 || self.extents.z < 0.0 {
            return Err(format!(
                "extents must be non-negative, got ({}, {}, {})",
                self.extents.x, self.extents.y, self.extents.z
            ));
        }
        Ok(())
    }

    /// Whether `p` lies inside the box (inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        (p.x - self.center.x).abs() <= self.extents.x
            && (p.y - self.center.y).abs() <= self.extents.y
            && (p.z - self.center.z).abs() <= self.extents.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distance_three_four_five() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn origin_detection() {
        assert!(Vec3::ZERO.is_origin());
        assert!(!Vec3::new(0.0, 1e-6, 0.0).is_origin());
    }

    #[test]
    fn bounds_rejects_negative_extents() {
        let b = Bounds::new(Vec3::ZERO, Vec3::new(1.0, -1.0, 1.0));
        assert!(b.validate().is_err());
    }

    #[test]
    fn bounds_rejects_nan_center() {
        let b = Bounds::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(b.validate().is_err());
    }

    #[test]
    fn bounds_contains_is_inclusive() {
        let b = Bounds::new(Vec3::new(10.0, 0.0, 10.0), Vec3::new(2.0, 1.0, 2.0));
        assert!(b.contains(Vec3::new(12.0, 1.0, 8.0)));
        assert!(!b.contains(Vec3::new(12.5, 0.0, 10.0)));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            ax in -100.0f32..100.0, az in -100.0f32..100.0,
            bx in -100.0f32..100.0, bz in -100.0f32..100.0,
        ) {
            let a = Vec3::new(ax, 0.0, az);
            let b = Vec3::new(bx, 0.0, bz);
            prop_assert!((a.distance(b) - b.distance(a)).abs() < 1e-4);
            prop_assert!(a.distance(b) >= 0.0);
        }
    }
}
