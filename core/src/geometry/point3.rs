//! 3-D Points

use super::{max, min, vector3, Axis, Float, Vector3};
use num_traits::Num;
use std::ops;

/// A 3-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D point containing `Float` values.
pub type Point3f = Point3<Float>;

/// Creates a new 3-D point.
///
/// * `x`: X-coordinate.
/// * `y`: Y-coordinate.
/// * `z`: Z-coordinate.
pub fn point3<T>(x: T, y: T, z: T) -> Point3<T> {
    Point3 { x, y, z }
}

impl<T: Num> Point3<T> {
    /// Returns true if any coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Return the component-wise minimum coordinate values with another point.
    ///
    /// * `other` - The other point.
    pub fn min(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        point3(
            min(self.x, other.x),
            min(self.y, other.y),
            min(self.z, other.z),
        )
    }

    /// Return the component-wise maximum coordinate values with another point.
    ///
    /// * `other` - The other point.
    pub fn max(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        point3(
            max(self.x, other.x),
            max(self.y, other.y),
            max(self.z, other.z),
        )
    }
}

impl<T: Num> ops::Add<Vector3<T>> for Point3<T> {
    type Output = Point3<T>;

    /// Offsets the point by the given vector.
    ///
    /// * `other` - The vector to add.
    fn add(self, other: Vector3<T>) -> Self::Output {
        point3(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num> ops::Add for Point3<T> {
    type Output = Point3<T>;

    /// Adds the given point and returns the result. Only meaningful for
    /// weighted sums such as `lerp`.
    ///
    /// * `other` - The point to add.
    fn add(self, other: Self) -> Self::Output {
        point3(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num> ops::Sub for Point3<T> {
    type Output = Vector3<T>;

    /// Subtracts the given point and returns the vector towards that point.
    ///
    /// * `other` - The point to subtract.
    fn sub(self, other: Self) -> Self::Output {
        vector3(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num> ops::Sub<Vector3<T>> for Point3<T> {
    type Output = Point3<T>;

    /// Subtracts the given vector and returns the result.
    ///
    /// * `other` - The vector to subtract.
    fn sub(self, other: Vector3<T>) -> Self::Output {
        point3(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> ops::Mul<T> for Point3<T> {
    type Output = Point3<T>;

    /// Scale the point.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        point3(f * self.x, f * self.y, f * self.z)
    }
}

impl ops::Mul<Point3<Float>> for Float {
    type Output = Point3<Float>;

    /// Scale the point.
    ///
    /// * `p` - The point.
    fn mul(self, p: Point3<Float>) -> Point3<Float> {
        point3(self * p.x, self * p.y, self * p.z)
    }
}

impl<T: Num + Copy> ops::Div<T> for Point3<T> {
    type Output = Point3<T>;

    /// Scale the point by 1/f.
    ///
    /// * `f` - The scaling factor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());

        let inv = T::one() / f;
        point3(inv * self.x, inv * self.y, inv * self.z)
    }
}

impl<T> ops::Index<Axis> for Point3<T> {
    type Output = T;

    /// Index the point by an axis to get the immutable coordinate axis value.
    ///
    /// * `axis` - A 3-D coordinate axis.
    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
