use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::FromPrimitive;

pub trait DecimalHelpers {
    /// Exact two-place amount, or `None` for NaN and infinities.
    fn to_money(&self) -> Option<BigDecimal>;
}

impl DecimalHelpers for f64 {
    fn to_money(&self) -> Option<BigDecimal> {
        BigDecimal::from_f64(*self).map(|bd| bd.with_scale_round(2, RoundingMode::HalfUp))
    }
}

impl DecimalHelpers for Option<f64> {
    fn to_money(&self) -> Option<BigDecimal> {
        self.and_then(|value| value.to_money())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_floats_become_cents() {
        assert_eq!(12.5f64.to_money(), Some(BigDecimal::from_str("12.50").unwrap()));
        assert_eq!(0.1f64.to_money(), Some(BigDecimal::from_str("0.10").unwrap()));
        assert_eq!(19.999f64.to_money(), Some(BigDecimal::from_str("20.00").unwrap()));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert_eq!(f64::NAN.to_money(), None);
        assert_eq!(None::<f64>.to_money(), None);
    }
}
