//! Transformations

use super::{matrix4x4, point3, Dot, Float, Matrix4x4, Point3f, Vector3f};
use std::ops::Mul;

/// A transformation for mapping from points to points and vectors to vectors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse transformation matrix.
    pub m_inv: Matrix4x4,
}

/// Create a transformation representing a translation.
///
/// * `delta` -  Translation.
#[rustfmt::skip]
pub fn translate(delta: &Vector3f) -> Transform {
    Transform {
        m: matrix4x4(
            1.0, 0.0, 0.0, delta.x,
            0.0, 1.0, 0.0, delta.y,
            0.0, 0.0, 1.0, delta.z,
            0.0, 0.0, 0.0, 1.0,
        ),
        m_inv: matrix4x4(
            1.0, 0.0, 0.0, -delta.x,
            0.0, 1.0, 0.0, -delta.y,
            0.0, 0.0, 1.0, -delta.z,
            0.0, 0.0, 0.0,  1.0,
        ),
    }
}

/// Create a transformation representing a scale. A zero factor collapses the
/// axis; the inverse then holds infinities and must not be used.
///
/// * `x` -  Scaling factor in x-axis.
/// * `y` -  Scaling factor in y-axis.
/// * `z` -  Scaling factor in z-axis.
#[rustfmt::skip]
pub fn scale(x: Float, y: Float, z: Float) -> Transform {
    Transform {
        m: matrix4x4(
            x,   0.0, 0.0, 0.0,
            0.0, y,   0.0, 0.0,
            0.0, 0.0, z,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ),
        m_inv: matrix4x4(
            1.0 / x, 0.0,     0.0,     0.0,
            0.0,     1.0 / y, 0.0,     0.0,
            0.0,     0.0,     1.0 / z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        ),
    }
}

/// Create a transformation representing rotation about the x-axis.
///
/// * `theta` -  Angle in degrees.
#[rustfmt::skip]
pub fn rotate_x(theta: Float) -> Transform {
    let r = theta.to_radians();
    let sin_theta = r.sin();
    let cos_theta = r.cos();
    let m = matrix4x4(
        1.0, 0.0,        0.0,       0.0,
        0.0, cos_theta, -sin_theta, 0.0,
        0.0, sin_theta,  cos_theta, 0.0,
        0.0, 0.0,        0.0,       1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about the y-axis.
///
/// * `theta` -  Angle in degrees.
#[rustfmt::skip]
pub fn rotate_y(theta: Float) -> Transform {
    let r = theta.to_radians();
    let sin_theta = r.sin();
    let cos_theta = r.cos();
    let m = matrix4x4(
         cos_theta, 0.0, sin_theta, 0.0,
         0.0,       1.0, 0.0,       0.0,
        -sin_theta, 0.0, cos_theta, 0.0,
         0.0,       0.0, 0.0,       1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about the z-axis.
///
/// * `theta` -  Angle in degrees.
#[rustfmt::skip]
pub fn rotate_z(theta: Float) -> Transform {
    let r = theta.to_radians();
    let sin_theta = r.sin();
    let cos_theta = r.cos();
    let m = matrix4x4(
        cos_theta, -sin_theta, 0.0, 0.0,
        sin_theta,  cos_theta, 0.0, 0.0,
        0.0,        0.0,       1.0, 0.0,
        0.0,        0.0,       0.0, 1.0,
    );
    Transform { m, m_inv: m.transpose() }
}

/// Create a transformation representing rotation about a vector. The axis
/// does not need to be normalized.
///
/// * `theta` - Angle in degrees.
/// * `axis`  - Vector.
pub fn rotate_axis(theta: Float, axis: &Vector3f) -> Transform {
    let a = axis.normalize();
    let r = theta.to_radians();
    let sin_theta = r.sin();
    let cos_theta = r.cos();
    let mut m = Matrix4x4::default();

    // Compute rotation of first basis vector
    m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
    m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
    m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
    m.m[0][3] = 0.0;

    // Compute rotations of second and third basis vectors
    m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
    m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
    m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
    m.m[1][3] = 0.0;

    m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
    m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
    m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
    m.m[2][3] = 0.0;

    Transform {
        m,
        m_inv: m.transpose(),
    }
}

/// Generate a world-to-camera transformation to point a camera to a desired
/// location. Camera space is right-handed in the world's sense: `+x` is
/// screen right, `+y` is screen up and `+z` is the viewing direction, so a
/// point in front of the camera has positive `z`.
///
/// `look - pos` must not be parallel to `up`.
///
/// * `pos`  - Position of camera.
/// * `look` - Position to point towards.
/// * `up`   - Used to orient the camera's viewing direction implied by `pos`
///            and `look`.
#[rustfmt::skip]
pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Transform {
    let dir = (*look - *pos).normalize();
    let right = dir.cross(&up.normalize()).normalize();
    let new_up = right.cross(&dir);

    let camera_to_world = matrix4x4(
        right.x, new_up.x, dir.x, pos.x,
        right.y, new_up.y, dir.y, pos.y,
        right.z, new_up.z, dir.z, pos.z,
        0.0,     0.0,      0.0,   1.0,
    );

    // The basis is orthonormal so the inverse is the transposed rotation
    // followed by the rotated negative translation.
    let p = Vector3f::from(*pos);
    let world_to_camera = matrix4x4(
        right.x,  right.y,  right.z,  -right.dot(&p),
        new_up.x, new_up.y, new_up.z, -new_up.dot(&p),
        dir.x,    dir.y,    dir.z,    -dir.dot(&p),
        0.0,      0.0,      0.0,      1.0,
    );

    Transform {
        m: world_to_camera,
        m_inv: camera_to_world,
    }
}

impl Transform {
    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Transform {
        Transform {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    /// Applies transformation to a given point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m;
        let xp = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let yp = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let zp = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let wp = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];

        debug_assert!(wp != 0.0, "Transformation<Point3f>: wp is zero");

        if wp == 1.0 {
            point3(xp, yp, zp)
        } else {
            point3(xp, yp, zp) / wp
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    /// Composes this transformation with another one. The resulting transform
    /// is the same as applying `rhs` then `self`.
    ///
    /// * `rhs` - The transformation to compose.
    fn mul(self, rhs: Self) -> Self {
        Transform {
            m: self.m * rhs.m,
            m_inv: rhs.m_inv * self.m_inv,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
