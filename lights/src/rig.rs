//! Three-Point Light Rig

use scale_core::config::*;
use scale_core::geometry::*;
use scale_core::pnr::*;
use std::fmt;

/// Role of a light in the rig.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LightRole {
    /// Front-right, elevated main light.
    Key,

    /// Front-left, lower softening light.
    Fill,

    /// Back light separating the subject edges from the background.
    Rim,
}

impl fmt::Display for LightRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Key => "key",
            Self::Fill => "fill",
            Self::Rim => "rim",
        };
        f.write_str(s)
    }
}

/// Calibrated parameters of one square area light at the reference height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigLightSpec {
    /// Role.
    pub role: LightRole,

    /// Energy in watts.
    pub base_energy: Float,

    /// Offset from the rig origin in millimeters.
    pub offset: Vector3f,

    /// XYZ Euler rotation in degrees.
    pub rotation_deg: Vector3f,

    /// Edge length of the square emitter.
    pub size: Float,
}

/// The default key/fill/rim rig and its calibration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThreePointRig {
    /// Reference height and scale range.
    pub settings: LightRigSettings,

    /// Key, fill and rim lights.
    pub lights: [RigLightSpec; 3],
}

impl Default for ThreePointRig {
    fn default() -> Self {
        Self::new(LightRigSettings::default())
    }
}

impl ThreePointRig {
    /// Create the default rig with the given calibration.
    ///
    /// * `settings` - Reference height and scale range.
    pub fn new(settings: LightRigSettings) -> Self {
        Self {
            settings,
            lights: [
                RigLightSpec {
                    role: LightRole::Key,
                    base_energy: 1000.0,
                    offset: vector3(150.0, -200.0, 250.0),
                    rotation_deg: vector3(45.0, 0.0, 30.0),
                    size: 2.0,
                },
                RigLightSpec {
                    role: LightRole::Fill,
                    base_energy: 300.0,
                    offset: vector3(-200.0, -150.0, 100.0),
                    rotation_deg: vector3(60.0, 0.0, -45.0),
                    size: 3.0,
                },
                RigLightSpec {
                    role: LightRole::Rim,
                    base_energy: 500.0,
                    offset: vector3(100.0, 200.0, 200.0),
                    rotation_deg: vector3(135.0, 0.0, 20.0),
                    size: 1.5,
                },
            ],
        }
    }

    /// Returns the uniform rig scale for an object height, limited to the
    /// configured range.
    ///
    /// * `object_height_mm` - Object height.
    pub fn rig_scale(&self, object_height_mm: Float) -> Float {
        let s = &self.settings;
        clamp(
            object_height_mm / s.reference_height_mm,
            s.min_scale,
            s.max_scale,
        )
    }

    /// Returns the calibration of a light.
    ///
    /// * `role` - The light role.
    pub fn spec(&self, role: LightRole) -> &RigLightSpec {
        match role {
            LightRole::Key => &self.lights[0],
            LightRole::Fill => &self.lights[1],
            LightRole::Rim => &self.lights[2],
        }
    }
}

/// A rig light placed for a particular object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigLight {
    /// Role.
    pub role: LightRole,

    /// World position in millimeters.
    pub location: Point3f,

    /// XYZ Euler rotation in radians.
    pub rotation: Vector3f,

    /// Energy in watts.
    pub energy: Float,

    /// Edge length of the square emitter.
    pub size: Float,

    /// Light to world transformation. The emitter faces its local -Z axis.
    pub light_to_world: Transform,
}

/// How a group is lit.
#[derive(Clone, Debug, PartialEq)]
pub enum LightingPlan {
    /// The default rig, scaled to the object.
    DefaultRig {
        rig_scale: Float,
        key_energy: Float,
        fill_energy: Float,
        rim_energy: Float,
        lights: Vec<RigLight>,
    },

    /// The group brings its own lights; the default rig is hidden, not
    /// deleted.
    Override { light_count: usize },
}

impl LightingPlan {
    /// Returns true if the group's own lights are used.
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override { .. })
    }
}

impl fmt::Display for LightingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultRig {
                rig_scale,
                key_energy,
                fill_energy,
                rim_energy,
                ..
            } => write!(
                f,
                "default rig at scale {rig_scale:.3} (key {key_energy:.1} W, fill {fill_energy:.1} W, \
                 rim {rim_energy:.1} W)"
            ),
            Self::Override { light_count } => write!(f, "{light_count} custom light(s)"),
        }
    }
}

/// Plans the lighting for a group.
///
/// Groups with host lights override the rig. Otherwise the rig is centered on
/// the object and scaled uniformly by `height / reference_height`; offsets and
/// emitter sizes follow the scale and every energy is multiplied by the
/// square of it to compensate the inverse-square falloff over the longer
/// throw.
///
/// * `object_height_mm` - Object height.
/// * `light_count`      - Number of host lights in the group.
/// * `center`           - Bounding box center.
/// * `rig`              - Rig calibration.
pub fn plan_lighting(
    object_height_mm: Float,
    light_count: usize,
    center: Point3f,
    rig: &ThreePointRig,
) -> LightingPlan {
    if light_count > 0 {
        debug!("Using {light_count} custom light(s)");
        return LightingPlan::Override { light_count };
    }

    let rig_scale = rig.rig_scale(object_height_mm);
    let falloff = rig_scale * rig_scale;

    let lights: Vec<RigLight> = rig
        .lights
        .iter()
        .map(|spec| {
            let location = center + spec.offset * rig_scale;
            let r = spec.rotation_deg;
            let light_to_world = translate(&Vector3f::from(location))
                * rotate_z(r.z)
                * rotate_y(r.y)
                * rotate_x(r.x)
                * scale(spec.size * rig_scale, spec.size * rig_scale, 1.0);

            RigLight {
                role: spec.role,
                location,
                rotation: vector3(radians(r.x), radians(r.y), radians(r.z)),
                energy: spec.base_energy * falloff,
                size: spec.size * rig_scale,
                light_to_world,
            }
        })
        .collect();

    debug!("Light rig scale {rig_scale:.3} for {object_height_mm:.1} mm");
    LightingPlan::DefaultRig {
        rig_scale,
        key_energy: rig.spec(LightRole::Key).base_energy * falloff,
        fill_energy: rig.spec(LightRole::Fill).base_energy * falloff,
        rim_energy: rig.spec(LightRole::Rim).base_energy * falloff,
        lights,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn origin() -> Point3f {
        point3(0.0, 0.0, 0.0)
    }

    fn energies(plan: &LightingPlan) -> (Float, Float, Float, Float) {
        match plan {
            LightingPlan::DefaultRig {
                rig_scale,
                key_energy,
                fill_energy,
                rim_energy,
                ..
            } => (*rig_scale, *key_energy, *fill_energy, *rim_energy),
            LightingPlan::Override { .. } => panic!("expected default rig"),
        }
    }

    #[test]
    fn reference_height_is_unscaled() {
        let plan = plan_lighting(200.0, 0, origin(), &ThreePointRig::default());
        assert_eq!(energies(&plan), (1.0, 1000.0, 300.0, 500.0));
    }

    #[test]
    fn double_height_quadruples_energy() {
        let plan = plan_lighting(400.0, 0, origin(), &ThreePointRig::default());
        assert_eq!(energies(&plan), (2.0, 4000.0, 1200.0, 2000.0));
    }

    #[test]
    fn cola_can_height() {
        let plan = plan_lighting(122.0, 0, origin(), &ThreePointRig::default());
        let (s, key, _, _) = energies(&plan);
        assert!(approx_eq!(Float, s, 0.61, ulps = 2));
        assert!(approx_eq!(Float, key, 1000.0 * 0.61 * 0.61, epsilon = 1e-9));
    }

    #[test]
    fn host_lights_override() {
        let plan = plan_lighting(200.0, 2, origin(), &ThreePointRig::default());
        assert_eq!(plan, LightingPlan::Override { light_count: 2 });
        assert!(plan.is_override());
        assert_eq!(plan.to_string(), "2 custom light(s)");
    }

    #[test]
    fn scale_is_clamped() {
        let rig = ThreePointRig::default();
        assert_eq!(rig.rig_scale(1.0), 0.1);
        assert_eq!(rig.rig_scale(10000.0), 20.0);

        let rig = ThreePointRig::new(LightRigSettings {
            reference_height_mm: 100.0,
            min_scale: 0.5,
            max_scale: 2.0,
        });
        assert_eq!(rig.rig_scale(10.0), 0.5);
        assert_eq!(rig.rig_scale(150.0), 1.5);
    }

    #[test]
    fn lights_follow_center_and_scale() {
        let center = point3(10.0, 20.0, 61.0);
        let plan = plan_lighting(100.0, 0, center, &ThreePointRig::default());
        let LightingPlan::DefaultRig { lights, .. } = plan else {
            panic!("expected default rig");
        };
        assert_eq!(lights.len(), 3);

        let key = lights[0];
        assert_eq!(key.role, LightRole::Key);
        assert_eq!(key.location, point3(85.0, -80.0, 186.0));
        assert_eq!(key.size, 1.0);
        assert!(approx_eq!(Float, key.rotation.x, radians(45.0), ulps = 2));

        // The emitter center sits at the light position.
        let p = key.light_to_world.transform_point(&origin());
        assert!(approx_eq!(Float, p.x, key.location.x, epsilon = 1e-9));
        assert!(approx_eq!(Float, p.y, key.location.y, epsilon = 1e-9));
        assert!(approx_eq!(Float, p.z, key.location.z, epsilon = 1e-9));

        let rim = lights[2];
        assert_eq!(rim.role, LightRole::Rim);
        assert!(rim.location.y > center.y);
    }

    proptest! {
        #[test]
        fn energy_follows_inverse_square(h in 20.0..4000.0f64) {
            let rig = ThreePointRig::default();
            let plan = plan_lighting(h, 0, origin(), &rig);
            let (s, key, fill, rim) = energies(&plan);
            prop_assert!(approx_eq!(Float, s, h / 200.0, ulps = 2));
            prop_assert!(approx_eq!(Float, key, 1000.0 * s * s, ulps = 4));
            prop_assert!(approx_eq!(Float, fill, 300.0 * s * s, ulps = 4));
            prop_assert!(approx_eq!(Float, rim, 500.0 * s * s, ulps = 4));
        }
    }
}
