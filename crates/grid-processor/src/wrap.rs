//! Longitude wrapping.

/// Wrap `x` into `[min, max)`.
///
/// With `include_max`, a value exactly equal to `max` is kept as is, so the
/// result range becomes `[min, max]`.
#[inline]
pub fn wrap_num(x: f64, min: f64, max: f64, include_max: bool) -> f64 {
    if include_max && x == max {
        return x;
    }
    let d = max - min;
    ((x - min) % d + d) % d + min
}

/// Wrap a longitude into `[discontinuity, discontinuity + 360)`.
#[inline]
pub fn wrap_longitude(lon: f64, discontinuity: f64) -> f64 {
    wrap_num(lon, discontinuity, discontinuity + 360.0, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_into_standard_range() {
        assert_eq!(wrap_longitude(190.0, -180.0), -170.0);
        assert_eq!(wrap_longitude(-190.0, -180.0), 170.0);
        assert_eq!(wrap_longitude(180.0, -180.0), -180.0);
        assert_eq!(wrap_longitude(45.0, -180.0), 45.0);
    }

    #[test]
    fn test_wrap_into_shifted_range() {
        assert_eq!(wrap_longitude(-10.0, 0.0), 350.0);
        assert_eq!(wrap_longitude(725.0, 0.0), 5.0);
        assert_eq!(wrap_longitude(-30.0, 20.0), 330.0);
    }

    #[test]
    fn test_include_max() {
        assert_eq!(wrap_num(180.0, -180.0, 180.0, true), 180.0);
        assert_eq!(wrap_num(180.0, -180.0, 180.0, false), -180.0);
    }

    #[test]
    fn test_idempotent_and_in_range() {
        for &min in &[-180.0, 0.0, 20.5, -300.0] {
            for i in 0..276 {
                let x = -1000.0 + i as f64 * 7.25;
                let once = wrap_longitude(x, min);
                assert!(once >= min && once < min + 360.0, "{} wrapped to {}", x, once);
                assert_eq!(wrap_longitude(once, min), once);
            }
        }
    }
}
