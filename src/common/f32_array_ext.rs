//! `[f32]` extensions.

use core::f32::consts::{LN_2, LOG10_E, SQRT_2};

use micromath::F32Ext;

/// `[f32]` extensions.
pub trait F32ArrayExt {
    /// Returns the maximum absolute value.
    fn peak_level(&self) -> f32;
    /// Returns the sum of squared values.
    fn energy(&self) -> f32;
    /// Returns the [Euclidean norm](https://en.wikipedia.org/wiki/Norm_(mathematics)#Euclidean_norm).
    fn l2_norm(&self) -> f32;
    /// Returns the inner product with another slice of the same length.
    fn dot(&self, other: &[f32]) -> f32;
}

/// Square root of a non-negative value. micromath's approximation is
/// refined with two Newton steps, and zero maps to exactly zero.
pub fn refined_sqrt(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut y = F32Ext::sqrt(x);
    for _ in 0..2 {
        y = 0.5 * (y + x / y);
    }
    y
}

/// Base 10 logarithm of a positive value, accurate to f32 precision.
/// micromath's `log10` is off by up to a few percent, so the value is split
/// into a mantissa in `[1/√2, √2)` and a power of two, and the logarithm of
/// the mantissa is summed from the series `ln(m) = 2 atanh((m - 1) / (m + 1))`.
/// Returns `-inf` for 0 and NaN for negative values.
pub fn refined_log10(x: f32) -> f32 {
    if x.is_nan() || x < 0.0 {
        return f32::NAN;
    }
    if x == 0.0 {
        return f32::NEG_INFINITY;
    }
    if x.is_infinite() {
        return f32::INFINITY;
    }

    let (mut mantissa, mut exponent) = split_exponent(x);
    if mantissa > SQRT_2 {
        mantissa *= 0.5;
        exponent += 1;
    }
    let s = (mantissa - 1.0) / (mantissa + 1.0);
    let s2 = s * s;
    let ln_mantissa =
        2.0 * s * (1.0 + s2 * (1.0 / 3.0 + s2 * (1.0 / 5.0 + s2 * (1.0 / 7.0 + s2 / 9.0))));
    (exponent as f32 * LN_2 + ln_mantissa) * LOG10_E
}

/// Splits a positive finite value into a mantissa in `[1, 2)` and a binary exponent.
fn split_exponent(x: f32) -> (f32, i32) {
    let mut bits = x.to_bits();
    let mut bias = 127;
    if bits >> 23 == 0 {
        // Subnormal, scale by 2^23 first
        bits = (x * 8_388_608.0).to_bits();
        bias += 23;
    }
    let exponent = ((bits >> 23) & 0xff) as i32 - bias;
    let mantissa = f32::from_bits((bits & 0x007f_ffff) | 0x3f80_0000);
    (mantissa, exponent)
}

impl F32ArrayExt for [f32] {
    fn peak_level(&self) -> f32 {
        let mut max: f32 = 0.0;
        for sample in self.iter() {
            let value = sample.abs();
            if value > max {
                max = value
            }
        }
        max
    }

    fn energy(&self) -> f32 {
        self.iter().map(|x| x * x).sum()
    }

    fn l2_norm(&self) -> f32 {
        refined_sqrt(self.energy())
    }

    fn dot(&self, other: &[f32]) -> f32 {
        if self.len() != other.len() {
            panic!(
                "Dot product of slices with lengths {} and {}",
                self.len(),
                other.len()
            )
        }
        self.iter().zip(other.iter()).map(|(a, b)| a * b).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{refined_log10, refined_sqrt, F32ArrayExt};

    #[test]
    fn test_empty_slice() {
        let window: [f32; 0] = [];
        assert!(window.peak_level() == 0.0);
        assert!(window.energy() == 0.0);
        assert!(window.l2_norm() == 0.0);
    }

    #[test]
    fn test_norm_and_dot() {
        let a = [3.0_f32, -4.0];
        let b = [1.0_f32, 2.0];
        assert_eq!(a.peak_level(), 4.0);
        assert_eq!(a.energy(), 25.0);
        assert!((a.l2_norm() - 5.0).abs() <= 1e-5);
        assert_eq!(a.dot(&b), -5.0);
    }

    #[test]
    fn test_refined_sqrt() {
        for i in 1..1000 {
            let x = (i as f32) * 0.37;
            let reference = x.sqrt();
            assert!((refined_sqrt(x) - reference).abs() <= 1e-5 * reference);
        }
        assert_eq!(refined_sqrt(0.0), 0.0);
    }

    #[test]
    fn test_refined_log10() {
        let check = |x: f32| {
            let reference = x.log10();
            assert!((refined_log10(x) - reference).abs() <= 1e-5 * reference.abs().max(1.0));
        };
        for i in 1..1000 {
            check((i as f32) * 0.37);
        }
        for x in [1e-30, 1e-4, 0.01, 0.1, 0.5, 0.999, 1.0, 1.001, 2.0, 1e6, 1e30] {
            check(x);
        }
        assert_eq!(refined_log10(1.0), 0.0);
        assert!((refined_log10(1e-40) + 40.0).abs() <= 1e-3);
        assert_eq!(refined_log10(0.0), f32::NEG_INFINITY);
        assert!(refined_log10(-1.0).is_nan());
    }

    #[test]
    #[should_panic]
    fn test_dot_length_mismatch() {
        let _ = [1.0_f32].dot(&[1.0, 2.0]);
    }
}
