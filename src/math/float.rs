/// Tolerance shared by every geometric comparison in the crate.
pub const EPSILON: f32 = 1e-6;

pub fn degrees_to_radians(d: f32) -> f32 {
    d * (std::f32::consts::PI / 180.0)
}

pub fn radians_to_degrees(r: f32) -> f32 {
    r * (180.0 / std::f32::consts::PI)
}

pub trait FloatExt: Sized {
    /// Returns `Some(self)` if `self` is farther than `eps` from zero.
    ///
    /// Returns `None` for NaN and `Some` for +/- infinity.
    fn non_zero(self, eps: Self) -> Option<Self>;

    /// Equality within [`EPSILON`].
    fn approx_eq(self, other: Self) -> bool;
}

impl FloatExt for f32 {
    fn non_zero(self, eps: f32) -> Option<f32> {
        (self.abs() > eps).then_some(self)
    }

    fn approx_eq(self, other: f32) -> bool {
        (self - other).abs() <= EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::FloatExt;

    #[test]
    fn non_zero() {
        assert_eq!(0.0f32.non_zero(0.1), None);
        assert_eq!(1.0f32.non_zero(0.1), Some(1.0));
        assert_eq!((-0.01f32).non_zero(0.1), None);
        assert_eq!((-1.0f32).non_zero(0.1), Some(-1.0));
        assert_eq!(f32::NAN.non_zero(0.1), None);
        assert_eq!(f32::INFINITY.non_zero(0.1), Some(f32::INFINITY));
    }

    #[test]
    fn approx_eq() {
        assert!(1.0f32.approx_eq(1.0 + 1e-7));
        assert!(!1.0f32.approx_eq(1.001));
    }
}
