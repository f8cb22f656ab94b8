//! Volumetric utilization of a packing result.

use crate::model::PlacedItem;
use crate::units::normalize_dims;

/// Rounds to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `placed × item_volume / container_volume × 100`, rounded to two decimals
/// and clamped to `[0, 100]`.
///
/// Both volumes must be in the same unit. A degenerate container yields 0.
///
/// # Examples
/// ```
/// use load_it_now::utilization::utilization_percent;
///
/// assert_eq!(utilization_percent(60_000.0, 500.0, 120), 100.0);
/// assert_eq!(utilization_percent(1000.0, 1.0, 333), 33.3);
/// ```
pub fn utilization_percent(container_volume: f64, item_volume: f64, placed_count: usize) -> f64 {
    if !(container_volume > 0.0) || !(item_volume > 0.0) {
        return 0.0;
    }
    let raw = placed_count as f64 * item_volume / container_volume * 100.0;
    round2(raw).clamp(0.0, 100.0)
}

/// Utilization of a `pack` result, computed from the caller's raw
/// dimensions and unit tags.
///
/// Both triples go through the same normalization `pack` applies, so mixed
/// units give the same figure as the run itself.
pub fn utilization(
    container_dims: (f64, f64, f64),
    container_unit: &str,
    item_dims: (f64, f64, f64),
    item_unit: &str,
    placed: &[PlacedItem],
) -> f64 {
    let (cl, cw, ch) = normalize_dims(container_dims, container_unit);
    let (il, iw, ih) = normalize_dims(item_dims, item_unit);
    utilization_percent(cl * cw * ch, il * iw * ih, placed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::pack;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(utilization_percent(3.0, 1.0, 1), 33.33);
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(utilization_percent(0.0, 1.0, 3), 0.0);
        assert_eq!(utilization_percent(10.0, 0.0, 3), 0.0);
        assert_eq!(utilization_percent(f64::NAN, 1.0, 3), 0.0);
        assert_eq!(utilization_percent(10.0, 1.0, 0), 0.0);
    }

    #[test]
    fn clamps_to_one_hundred() {
        assert_eq!(utilization_percent(10.0, 1.0, 11), 100.0);
    }

    #[test]
    fn uses_normalized_volumes() {
        let placed = pack((1.0, 1.0, 1.0), "m", (50.0, 50.0, 50.0), "cm").unwrap();
        assert_eq!(placed.len(), 8);
        assert_eq!(
            utilization((1.0, 1.0, 1.0), "m", (50.0, 50.0, 50.0), "cm", &placed),
            100.0
        );
        assert_eq!(
            utilization((100.0, 100.0, 100.0), "cm", (500.0, 500.0, 500.0), "mm", &placed),
            100.0
        );
    }
}
