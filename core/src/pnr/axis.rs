//! Axis

/// Axis enumeration
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Axis {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the physical name of the extent measured along the axis with
    /// the host convention (+Z up, camera looking along +Y).
    pub fn extent_name(&self) -> &'static str {
        match self {
            Axis::X => "width",
            Axis::Y => "depth",
            Axis::Z => "height",
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_names_follow_z_up_convention() {
        assert_eq!(Axis::X.extent_name(), "width");
        assert_eq!(Axis::Y.extent_name(), "depth");
        assert_eq!(Axis::Z.extent_name(), "height");
    }

    #[test]
    fn all_axes_in_order() {
        assert_eq!(Axis::ALL, [Axis::X, Axis::Y, Axis::Z]);
        assert_eq!(Axis::default(), Axis::X);
    }
}
