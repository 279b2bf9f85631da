//! Arithmetic and formatting for quantities that grow without bound.
//!
//! Rebirths and codes compound multipliers multiplicatively, so a handful of
//! operations can push a plain `f64` product to infinity. Everything that
//! accumulates onto a stored multiplier goes through [`saturating_multiply`].

/// Products above this are clamped to `f64::MAX`.
pub const SATURATION_THRESHOLD: f64 = f64::MAX / 10.0;

/// Shown in place of a number that is not finite.
pub const UNBOUNDED: &str = "∞";

/// `a * b`, clamped to `f64::MAX` on overflow, NaN, or anything above
/// [`SATURATION_THRESHOLD`].
pub fn saturating_multiply(a: f64, b: f64) -> f64 {
    let product = a * b;
    if !product.is_finite() || product > SATURATION_THRESHOLD {
        f64::MAX
    } else {
        product
    }
}

/// `a + b`, clamped to `f64::MAX` when the sum is not finite.
pub fn saturating_add(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.is_finite() {
        sum
    } else {
        f64::MAX
    }
}

/// Suffix table, largest first.
const SUFFIXES: &[(f64, &str)] = &[(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "k")];

/// Past this many trillions the suffixed form stops being readable.
const SCIENTIFIC_FROM: f64 = 1e21 * 1e12;

/// Format a number for display: `1.50k`, `2.00M`, `12.5`, or [`UNBOUNDED`].
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return UNBOUNDED.to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    if n >= SCIENTIFIC_FROM {
        return format!("{:.2e}", n);
    }
    for &(scale, suffix) in SUFFIXES {
        if n >= scale {
            return format!("{:.2}{}", n / scale, suffix);
        }
    }

    let rounded = (n * 100.0).round() / 100.0;
    let s = format!("{:.2}", rounded);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_in_range_is_plain_product() {
        assert_eq!(saturating_multiply(3.0, 4.0), 12.0);
        assert_eq!(saturating_multiply(1.0, 2f64.powi(100)), 2f64.powi(100));
    }

    #[test]
    fn multiply_overflow_saturates() {
        assert_eq!(saturating_multiply(f64::MAX, 2.0), f64::MAX);
        assert_eq!(saturating_multiply(1e300, 1e300), f64::MAX);
    }

    #[test]
    fn multiply_above_threshold_saturates() {
        // Finite, but past MAX / 10.
        assert_eq!(saturating_multiply(f64::MAX / 4.0, 1.0), f64::MAX);
    }

    #[test]
    fn multiply_nan_saturates() {
        assert_eq!(saturating_multiply(0.0, f64::INFINITY), f64::MAX);
    }

    #[test]
    fn saturated_value_stays_saturated() {
        let mut m = 1.0;
        for _ in 0..20 {
            m = saturating_multiply(m, 2f64.powi(100));
        }
        assert_eq!(m, f64::MAX);
        assert_eq!(saturating_multiply(m, 2.0), f64::MAX);
    }

    #[test]
    fn add_clamps_overflow() {
        assert_eq!(saturating_add(1.0, 2.0), 3.0);
        assert_eq!(saturating_add(f64::MAX, f64::MAX), f64::MAX);
    }

    #[test]
    fn format_small_values() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(3.14159), "3.14");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn format_suffixes() {
        assert_eq!(format_number(1_000.0), "1.00k");
        assert_eq!(format_number(1_500.0), "1.50k");
        assert_eq!(format_number(2_000_000.0), "2.00M");
        assert_eq!(format_number(3_250_000_000.0), "3.25B");
        assert_eq!(format_number(1e12), "1.00T");
        assert_eq!(format_number(4.5e15), "4500.00T");
    }

    #[test]
    fn format_huge_values_use_exponent() {
        assert_eq!(format_number(f64::MAX), "1.80e308");
    }

    #[test]
    fn format_non_finite_is_sentinel() {
        assert_eq!(format_number(f64::INFINITY), UNBOUNDED);
        assert_eq!(format_number(f64::NEG_INFINITY), UNBOUNDED);
        assert_eq!(format_number(f64::NAN), UNBOUNDED);
    }

    #[test]
    fn format_negative() {
        assert_eq!(format_number(-1_500.0), "-1.50k");
        assert_eq!(format_number(-2.0), "-2");
    }
}
