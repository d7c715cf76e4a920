//! Object groups and bounding box aggregation.

use crate::config::SizeEnvelope;
use crate::error::{Error, Result};
use crate::geometry::*;
use crate::pnr::*;

/// Prefix marking helper geometry that is never measured.
pub const HELPER_PREFIX: char = '_';

/// Anything that can report its bounding box corners in world space.
pub trait MeshBounds {
    /// Returns the name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the eight corners of the mesh's local bounding box transformed
    /// to world space, in scene units.
    fn world_corners(&self) -> [Point3f; 8];

    /// Returns true for helper geometry that is excluded from measurement.
    fn is_helper(&self) -> bool {
        self.name().starts_with(HELPER_PREFIX)
    }
}

/// A mesh placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstance {
    /// Mesh name.
    pub name: String,

    /// Bounding box in object space.
    pub bounds: Bounds3f,

    /// Object to world transformation.
    pub object_to_world: Transform,
}

impl MeshInstance {
    /// Create a new mesh instance.
    ///
    /// * `name`            - Mesh name.
    /// * `bounds`          - Bounding box in object space.
    /// * `object_to_world` - Object to world transformation.
    pub fn new(name: &str, bounds: Bounds3f, object_to_world: Transform) -> Self {
        Self {
            name: String::from(name),
            bounds,
            object_to_world,
        }
    }
}

impl MeshBounds for MeshInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn world_corners(&self) -> [Point3f; 8] {
        self.bounds
            .corners()
            .map(|c| self.object_to_world.transform_point(&c))
    }
}

/// A named collection of meshes rendered as one subject, plus the lights the
/// host placed in it.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectGroup {
    /// Group name.
    pub name: String,

    /// Meshes in scene order.
    pub meshes: Vec<MeshInstance>,

    /// Names of host lights inside the group.
    pub lights: Vec<String>,

    /// Millimeters per scene unit.
    pub mm_per_unit: Float,
}

impl ObjectGroup {
    /// Create an empty group measured in millimeters.
    ///
    /// * `name` - Group name.
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            meshes: vec![],
            lights: vec![],
            mm_per_unit: 1.0,
        }
    }

    /// Returns true if the group has neither meshes nor lights.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.lights.is_empty()
    }

    /// Returns the number of host lights.
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Returns the meshes that contribute to the bounding box.
    pub fn render_meshes(&self) -> impl Iterator<Item = &MeshInstance> {
        self.meshes.iter().filter(|m| !m.is_helper())
    }

    /// Returns the composite world bounding box in millimeters.
    ///
    /// * `envelope` - Accepted size range.
    pub fn measure(&self, envelope: &SizeEnvelope) -> Result<Bounds3f> {
        aggregate_bounds(self.render_meshes(), self.mm_per_unit, envelope)
    }
}

/// Merges the world-space corners of every mesh into one bounding box in
/// millimeters. Corners are transformed before the min/max reduction so
/// rotated meshes are bounded correctly.
///
/// * `meshes`      - Meshes to measure.
/// * `mm_per_unit` - Millimeters per scene unit.
/// * `envelope`    - Accepted size range for each extent.
pub fn aggregate_bounds<'a, M, I>(
    meshes: I,
    mm_per_unit: Float,
    envelope: &SizeEnvelope,
) -> Result<Bounds3f>
where
    M: MeshBounds + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let mut count = 0_usize;
    let bounds = meshes
        .into_iter()
        .inspect(|_| count += 1)
        .flat_map(|m| m.world_corners())
        .fold(empty_bounds3::<Float>(), |b, c| b.union(&(mm_per_unit * c)));

    if count == 0 {
        return Err(Error::EmptyGroup);
    }

    for axis in Axis::ALL {
        let size_mm = bounds.extent(axis);
        if !bounds.is_finite() || !envelope.accepts(size_mm) {
            return Err(Error::DegenerateGeometry {
                dimension: axis.extent_name(),
                size_mm,
                min_mm: envelope.min_mm,
                max_mm: envelope.max_mm,
            });
        }
    }

    debug!(
        "Aggregated {count} meshes: {:.3} x {:.3} x {:.3} mm",
        bounds.extent(Axis::X),
        bounds.extent(Axis::Y),
        bounds.extent(Axis::Z)
    );
    Ok(bounds)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn cube(name: &str, size: Float, object_to_world: Transform) -> MeshInstance {
        let h = size / 2.0;
        MeshInstance::new(
            name,
            bounds3(point3(-h, -h, -h), point3(h, h, h)),
            object_to_world,
        )
    }

    fn boxed(w: Float, d: Float, h: Float) -> MeshInstance {
        MeshInstance::new(
            "box",
            bounds3(point3(0.0, 0.0, 0.0), point3(w, d, h)),
            Transform::default(),
        )
    }

    fn identity() -> Transform {
        translate(&vector3(0.0, 0.0, 0.0))
    }

    #[test]
    fn empty_group_fails() {
        let group = ObjectGroup::new("RENDER_Empty");
        assert_eq!(
            group.measure(&SizeEnvelope::default()),
            Err(Error::EmptyGroup)
        );
    }

    #[test]
    fn helpers_only_is_empty() {
        let mut group = ObjectGroup::new("RENDER_Helpers");
        group.meshes.push(cube("_ground", 100.0, identity()));
        assert_eq!(
            group.measure(&SizeEnvelope::default()),
            Err(Error::EmptyGroup)
        );
    }

    #[test]
    fn helpers_are_not_measured() {
        let mut group = ObjectGroup::new("RENDER_Can");
        group.meshes.push(cube("can", 50.0, identity()));
        group.meshes.push(cube("_shadow_catcher", 5000.0, identity()));
        let b = group.measure(&SizeEnvelope::default()).unwrap();
        assert_eq!(b.diagonal(), vector3(50.0, 50.0, 50.0));
        assert_eq!(group.render_meshes().count(), 1);
    }

    #[test]
    fn composite_spans_all_meshes() {
        let mut group = ObjectGroup::new("RENDER_Pair");
        group.meshes.push(cube("left", 10.0, translate(&vector3(-20.0, 0.0, 0.0))));
        group.meshes.push(cube("right", 10.0, translate(&vector3(20.0, 0.0, 5.0))));
        let b = group.measure(&SizeEnvelope::default()).unwrap();
        assert_eq!(b.p_min, point3(-25.0, -5.0, -5.0));
        assert_eq!(b.p_max, point3(25.0, 5.0, 10.0));
    }

    #[test]
    fn rotated_mesh_uses_transformed_corners() {
        let mut group = ObjectGroup::new("RENDER_Rotated");
        group.meshes.push(cube("cube", 100.0, rotate_z(45.0)));
        let b = group.measure(&SizeEnvelope::default()).unwrap();
        let expected = 100.0 * Float::sqrt(2.0);
        assert!(approx_eq!(Float, b.extent(Axis::X), expected, epsilon = 1e-9));
        assert!(approx_eq!(Float, b.extent(Axis::Y), expected, epsilon = 1e-9));
        assert!(approx_eq!(Float, b.extent(Axis::Z), 100.0, epsilon = 1e-9));
    }

    #[test]
    fn unit_scale_converts_to_mm() {
        let mut group = ObjectGroup::new("RENDER_Meters");
        group.mm_per_unit = 1000.0;
        group.meshes.push(boxed(0.066, 0.066, 0.122));
        let b = group.measure(&SizeEnvelope::default()).unwrap();
        assert!(approx_eq!(Float, b.extent(Axis::X), 66.0, epsilon = 1e-9));
        assert!(approx_eq!(Float, b.extent(Axis::Z), 122.0, epsilon = 1e-9));
    }

    #[test]
    fn size_envelope_boundaries() {
        let envelope = SizeEnvelope::default();

        let result = aggregate_bounds(&[boxed(10.0, 10.0, 0.5)], 1.0, &envelope);
        assert!(matches!(
            result,
            Err(Error::DegenerateGeometry {
                dimension: "height",
                ..
            })
        ));

        let result = aggregate_bounds(&[boxed(10.0, 10.0, 15000.0)], 1.0, &envelope);
        assert!(matches!(
            result,
            Err(Error::DegenerateGeometry {
                dimension: "height",
                ..
            })
        ));

        assert!(aggregate_bounds(&[boxed(10.0, 10.0, 1.0)], 1.0, &envelope).is_ok());
        assert!(aggregate_bounds(&[boxed(10000.0, 1.0, 1.0)], 1.0, &envelope).is_ok());

        // A flat plane has no depth.
        let result = aggregate_bounds(&[boxed(100.0, 0.0, 100.0)], 1.0, &envelope);
        assert!(matches!(
            result,
            Err(Error::DegenerateGeometry {
                dimension: "depth",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_geometry_is_degenerate() {
        let result = aggregate_bounds(
            &[boxed(10.0, Float::NAN, 10.0)],
            1.0,
            &SizeEnvelope::default(),
        );
        assert!(matches!(result, Err(Error::DegenerateGeometry { .. })));
    }

    prop_point3!(
        offset_f64,
        Float,
        -500.0..500.0f64,
        -500.0..500.0f64,
        -500.0..500.0f64
    );

    proptest! {
        #[test]
        fn composite_contains_every_corner(
            o1 in offset_f64(),
            o2 in offset_f64(),
            theta in 0.0..360.0f64,
            size in 1.0..200.0f64,
        ) {
            let meshes = [
                cube("a", size, translate(&Vector3f::from(o1)) * rotate_x(theta)),
                cube("b", size, translate(&Vector3f::from(o2)) * rotate_z(theta)),
            ];
            let b = aggregate_bounds(&meshes, 1.0, &SizeEnvelope::default()).unwrap();
            for m in meshes.iter() {
                for c in m.world_corners() {
                    prop_assert!(c.x >= b.p_min.x && c.x <= b.p_max.x);
                    prop_assert!(c.y >= b.p_min.y && c.y <= b.p_max.y);
                    prop_assert!(c.z >= b.p_min.z && c.z <= b.p_max.z);
                }
            }
        }
    }
}
