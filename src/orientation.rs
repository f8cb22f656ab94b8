//! Axis-aligned orientations of a box.
//!
//! A box has six axis permutations. Permutations that produce the same
//! extents (two or three equal sides) are collapsed, so a cube yields a
//! single orientation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::Dimension;
use crate::types::{EPSILON_GENERAL, Vec3};

/// Quarter turns about the world axes that bring a box from its natural
/// orientation into a permuted one.
///
/// Rotations are applied about fixed axes in X, then Y, then Z order.
/// Only renderers consume this; placement logic uses `Orientation::dims`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Rotation {
    /// Source axis for each target axis: `dims.x = natural[permutation[0]]`, ...
    pub permutation: [usize; 3],
    /// Rotation angles in degrees about (x, y, z).
    #[schema(value_type = [f64; 3])]
    pub degrees: (f64, f64, f64),
}

/// All six permutations, natural first.
const ROTATIONS: [Rotation; 6] = [
    Rotation {
        permutation: [0, 1, 2],
        degrees: (0.0, 0.0, 0.0),
    },
    Rotation {
        permutation: [0, 2, 1],
        degrees: (90.0, 0.0, 0.0),
    },
    Rotation {
        permutation: [1, 0, 2],
        degrees: (0.0, 0.0, 90.0),
    },
    Rotation {
        permutation: [1, 2, 0],
        degrees: (90.0, 90.0, 0.0),
    },
    Rotation {
        permutation: [2, 0, 1],
        degrees: (90.0, 0.0, 90.0),
    },
    Rotation {
        permutation: [2, 1, 0],
        degrees: (0.0, 90.0, 0.0),
    },
];

/// One orientation of an item: its extents along (x, y, z) plus how it was
/// obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub dims: Vec3,
    pub rotation: Rotation,
    /// `false` only for the natural orientation.
    pub rotated: bool,
}

impl Orientation {
    /// The item as given, without any rotation.
    pub fn natural(dims: &Dimension) -> Self {
        Self {
            dims: dims.as_vec3(),
            rotation: ROTATIONS[0],
            rotated: false,
        }
    }

    fn from_rotation(natural: Vec3, rotation: Rotation) -> Self {
        let [a, b, c] = rotation.permutation;
        Self {
            dims: Vec3::new(natural.axis(a), natural.axis(b), natural.axis(c)),
            rotation,
            rotated: rotation.permutation != [0, 1, 2],
        }
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.dims.volume()
    }
}

/// Enumerates the distinct orientations of `dims`.
///
/// The natural orientation always comes first and the order is fixed, which
/// keeps tie-breaking during scoring deterministic. With `allow_rotation`
/// set to `false` only the natural orientation is returned.
pub fn enumerate_orientations(dims: &Dimension, allow_rotation: bool) -> Vec<Orientation> {
    if !allow_rotation {
        return vec![Orientation::natural(dims)];
    }

    let natural = dims.as_vec3();
    let mut orientations: Vec<Orientation> = Vec::with_capacity(ROTATIONS.len());
    for rotation in ROTATIONS {
        let candidate = Orientation::from_rotation(natural, rotation);
        let duplicate = orientations
            .iter()
            .any(|existing| existing.dims.approx_eq(&candidate.dims, EPSILON_GENERAL));
        if !duplicate {
            orientations.push(candidate);
        }
    }
    orientations
}
