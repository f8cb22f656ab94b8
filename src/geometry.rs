//! Geometric checks over placed items.
//!
//! The engine uses these for its defensive bounds re-check; tests use them
//! to verify that no two placements overlap.

use crate::model::PlacedItem;
use crate::types::{BoundingBox, Vec3};

/// Checks whether two placed items share positive volume.
///
/// Uses Axis-Aligned Bounding Box (AABB) collision detection. Items that
/// merely touch along a face do not intersect.
pub fn intersects(a: &PlacedItem, b: &PlacedItem) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Volume shared by two placed items.
pub fn overlap_volume(a: &PlacedItem, b: &PlacedItem) -> f64 {
    a.bounding_box().intersection_volume(&b.bounding_box())
}

/// Checks that a box at `position` with extents `dims` lies inside
/// `[0, bounds.x] × [0, bounds.y] × [0, bounds.z]`.
pub fn within_bounds(position: Vec3, dims: Vec3, bounds: Vec3, tolerance: f64) -> bool {
    let container = BoundingBox::from_position_and_dims(Vec3::zero(), bounds);
    let candidate = BoundingBox::from_position_and_dims(position, dims);
    container.contains(&candidate, tolerance)
}

/// Returns the first pair of placements (by sequence) that overlap, if any.
pub fn first_overlap(placements: &[PlacedItem]) -> Option<(usize, usize)> {
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            if intersects(a, b) {
                return Some((a.sequence, b.sequence));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;
    use crate::orientation::Orientation;

    fn placed(sequence: usize, position: (f64, f64, f64), dims: (f64, f64, f64)) -> PlacedItem {
        let dims = Dimension::from_tuple(dims).unwrap();
        PlacedItem {
            sequence,
            item_id: 0,
            position,
            orientation: Orientation::natural(&dims),
        }
    }

    #[test]
    fn detects_overlap() {
        let a = placed(0, (0.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let b = placed(1, (5.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        assert!(intersects(&a, &b));
        assert!((overlap_volume(&a, &b) - 500.0).abs() < 1e-9);
        assert_eq!(first_overlap(&[a, b]), Some((0, 1)));
    }

    #[test]
    fn touching_faces_do_not_overlap() {
        let a = placed(0, (0.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let b = placed(1, (10.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let c = placed(2, (0.0, 0.0, 10.0), (10.0, 10.0, 10.0));
        assert!(!intersects(&a, &b));
        assert_eq!(first_overlap(&[a, b, c]), None);
    }

    #[test]
    fn bounds_check_respects_tolerance() {
        let bounds = Vec3::new(10.0, 10.0, 10.0);
        let dims = Vec3::new(5.0, 5.0, 5.0);
        assert!(within_bounds(Vec3::new(5.0, 5.0, 5.0), dims, bounds, 1e-6));
        assert!(within_bounds(Vec3::new(5.0005, 0.0, 0.0), dims, bounds, 1e-3));
        assert!(!within_bounds(Vec3::new(6.0, 0.0, 0.0), dims, bounds, 1e-3));
        assert!(!within_bounds(Vec3::new(-1.0, 0.0, 0.0), dims, bounds, 1e-3));
    }
}
