//! Clamp

use num_traits::Num;

/// Clamps a value x to [min, max].
///
/// * `x` - The number to clamp.
/// * `min` - Minimum value.
/// * `max` - Maximum value.
pub fn clamp<T>(x: T, min: T, max: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_value_in_range() {
        assert_eq!(clamp(0.61, 0.1, 20.0), 0.61);
        assert_eq!(clamp(0.005, 0.1, 20.0), 0.1);
        assert_eq!(clamp(50.0, 0.1, 20.0), 20.0);
        assert_eq!(clamp(-3, 0, 500), 0);
    }
}
