//! World-space geometry: [`Vec3`].
//!
//! The world is Y-up. Grid addressing only looks at the XZ plane; the Y
//! component carries ground height once a point has been sampled.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A 3D world-space point or vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Return a copy with the Y component replaced.
    #[inline]
    pub const fn with_y(self, y: f32) -> Self {
        Self {
            x: self.x,
            y,
            z: self.z,
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Squared euclidean length.
    #[inline]
    pub fn squared_length(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.squared_length().sqrt()
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Distance between two points measured in the XZ plane only.
    #[inline]
    pub fn distance_xz(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Closest XZ-plane distance from this point to the segment `a-b`.
    pub fn segment_distance_xz(self, a: Self, b: Self) -> f32 {
        let dx = b.x - a.x;
        let dz = b.z - a.z;
        let len2 = dx * dx + dz * dz;
        let t = if len2 > 0.0 {
            (((self.x - a.x) * dx + (self.z - a.z) * dz) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Vec3::new(a.x + t * dx, 0.0, a.z + t * dz).distance_xz(self)
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 { self * (1.0 / len) } else { Self::ZERO }
    }

    /// Whether every component is finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 8.0);
        assert_eq!(a + b, Vec3::new(5.0, 8.0, 11.0));
        assert_eq!(b - a, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn lengths_and_distances() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert_eq!(v.squared_length(), 25.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(Vec3::ZERO.distance(v), 5.0);

        let high = Vec3::new(3.0, 10.0, 4.0);
        assert_eq!(Vec3::ZERO.distance_xz(high), 5.0);
    }

    #[test]
    fn segment_distance_in_plane() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 5.0, 10.0);
        assert_eq!(Vec3::new(3.0, 0.0, 4.0).segment_distance_xz(a, b), 3.0);
        // Beyond an endpoint the distance is to that endpoint.
        assert_eq!(Vec3::new(0.0, 0.0, 13.0).segment_distance_xz(a, b), 3.0);
        assert_eq!(Vec3::new(-3.0, 0.0, -4.0).segment_distance_xz(a, b), 5.0);
        // Degenerate segment.
        assert_eq!(Vec3::new(3.0, 7.0, 4.0).segment_distance_xz(a, a), 5.0);
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let n = Vec3::new(0.0, 0.0, -7.0).normalized();
        assert_eq!(n, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn with_y_replaces_height() {
        let v = Vec3::new(1.0, 2.0, 3.0).with_y(-4.0);
        assert_eq!(v, Vec3::new(1.0, -4.0, 3.0));
    }

    #[test]
    fn display_format() {
        assert_eq!(Vec3::new(1.0, 0.5, -2.0).to_string(), "(1, 0.5, -2)");
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn vec3_round_trip() {
        let v = Vec3::new(1.5, -2.0, 30.25);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vec3 = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
