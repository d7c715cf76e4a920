//! 3-D Axis Aligned Bounding Boxes.

use super::{lerp, max, min, point3, vector3, Axis, Float, Point3, Union, Vector3};
use num_traits::bounds::Bounded;
use num_traits::Num;
use std::ops::Index;

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3<T: Num> {
    /// Minimum bounds.
    pub p_min: Point3<T>,

    /// Maximum bounds.
    pub p_max: Point3<T>,
}

/// 3-D bounding box containing `Float` points.
pub type Bounds3f = Bounds3<Float>;

/// Creates a new 3-D bounding box from 2 points. The minimum and maximum bounds
/// are used for each coordinate axis.
///
/// * `p1` - First point.
/// * `p2` - Second point.
pub fn bounds3<T: Num + PartialOrd + Copy>(p1: Point3<T>, p2: Point3<T>) -> Bounds3<T> {
    Bounds3 {
        p_min: point3(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
        p_max: point3(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
    }
}

/// Returns a 3-D bounding box where minimum and maximum bounds are maximum and
/// minimum values respectively of the type's limits. This is so we can easily grow
/// the bounding box from nothing iteratively.
pub fn empty_bounds3<T: Num + Bounded + PartialOrd + Copy>() -> Bounds3<T> {
    // Don't call bounds3<T>() because it'll create the largest bounding box
    // by flipping p_min and p_max.
    Bounds3 {
        p_min: point3(T::max_value(), T::max_value(), T::max_value()),
        p_max: point3(T::min_value(), T::min_value(), T::min_value()),
    }
}

impl<T: Num + PartialOrd + Copy> From<Point3<T>> for Bounds3<T> {
    /// Use a 3-D point as minimum and maximum 3-D bounds.
    ///
    /// * `p` - 3-D point.
    fn from(p: Point3<T>) -> Self {
        Bounds3 { p_min: p, p_max: p }
    }
}

impl<T: Num + Copy> Bounds3<T> {
    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point. Its components are the width, depth and height.
    pub fn diagonal(&self) -> Vector3<T> {
        self.p_max - self.p_min
    }

    /// Returns the extent of the box along an axis.
    ///
    /// * `axis` - The axis.
    pub fn extent(&self, axis: Axis) -> T {
        self.p_max[axis] - self.p_min[axis]
    }

    /// Pad the bounding box by a constant amount in all dimensions.
    ///
    /// * `delta` - Padding amount.
    pub fn expand(&self, delta: T) -> Bounds3<T> {
        // Don't call bounds3<T>() to prevent flipping p_min and p_max when
        // the input is empty box.
        Bounds3 {
            p_min: self.p_min - vector3(delta, delta, delta),
            p_max: self.p_max + vector3(delta, delta, delta),
        }
    }

    /// Returns the coordinates of one of the eight corners. Bit 0 of `corner`
    /// selects the x bound, bit 1 the y bound and bit 2 the z bound.
    ///
    /// * `corner` - Corner index in [0, 7].
    pub fn corner(&self, corner: u8) -> Point3<T> {
        debug_assert!(corner < 8);
        let x = corner & 1;
        let y = if corner & 2 == 0 { 0 } else { 1 };
        let z = if corner & 4 == 0 { 0 } else { 1 };
        point3(self[x].x, self[y].y, self[z].z)
    }

    /// Returns all eight corners.
    pub fn corners(&self) -> [Point3<T>; 8] {
        [
            self.corner(0),
            self.corner(1),
            self.corner(2),
            self.corner(3),
            self.corner(4),
            self.corner(5),
            self.corner(6),
            self.corner(7),
        ]
    }
}

impl Bounds3<Float> {
    /// Returns the center of the box.
    pub fn center(&self) -> Point3<Float> {
        lerp(0.5, self.p_min, self.p_max)
    }

    /// Returns true if all coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.p_min.is_finite() && self.p_max.is_finite()
    }
}

impl<T: Num> Index<u8> for Bounds3<T> {
    type Output = Point3<T>;

    /// Index the minimum and maximum bounds.
    ///
    /// * `i` - 0 for minimum and 1 for maximum.
    fn index(&self, index: u8) -> &Self::Output {
        match index {
            0 => &self.p_min,
            1 => &self.p_max,
            _ => panic!("Invalid index for std::Index on Bounds3<T>"),
        }
    }
}

impl<T: Num + PartialOrd + Copy> Union<Point3<T>> for Bounds3<T> {
    /// Return a bounding box containing the itself and a point.
    ///
    /// * `other` - The point.
    fn union(&self, other: &Point3<T>) -> Self {
        Bounds3 {
            p_min: self.p_min.min(other),
            p_max: self.p_max.max(other),
        }
    }
}

impl<T: Num + PartialOrd + Copy> Union<Bounds3<T>> for Bounds3<T> {
    /// Return a bounding box containing both bounding boxes.
    ///
    /// * `other` - The other bounding box.
    fn union(&self, other: &Bounds3<T>) -> Self {
        Bounds3 {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
