//! Small vector math used by the stock components.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - position, velocity, Euler angles, scale
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// All ones
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Component-wise approximate equality.
    #[must_use]
    pub fn abs_diff_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(arr: [f32; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let mut sum = a + b;
        assert_eq!(sum, Vec3::new(5.0, 7.0, 9.0));

        sum *= 2.0;
        assert_eq!(sum, Vec3::new(10.0, 14.0, 18.0));
        assert!(sum.abs_diff_eq(Vec3::new(10.0, 14.0, 18.001), 0.01));
        assert!(!sum.abs_diff_eq(Vec3::new(10.0, 14.0, 18.1), 0.01));
    }

    #[test]
    fn test_vec3_bytemuck() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 12); // 3 * 4 bytes
    }

    #[test]
    fn test_vec3_serde_as_array() {
        #[derive(Deserialize)]
        struct Holder {
            v: Vec3,
        }
        let holder: Holder = toml::from_str("v = [1.0, -2.5, 0.0]").unwrap();
        assert_eq!(holder.v, Vec3::new(1.0, -2.5, 0.0));
    }
}
