//! Placement substrates.
//!
//! A `SpatialIndex` tracks where the container still has room and proposes
//! the best-scoring (slot, orientation) pair for the next item. Two
//! implementations exist and can be swapped per run:
//!
//! - [`GuillotineIndex`]: a list of disjoint free boxes, split on every
//!   placement (exact, the default)
//! - [`ExtremePointIndex`]: candidate corner points checked against a
//!   sampled occupancy grid (approximate, kept for A/B comparison)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::orientation::Orientation;
use crate::scoring::PlacementScorer;
use crate::types::Vec3;

mod extreme_point;
mod guillotine;

pub use extreme_point::{ExtremePoint, ExtremePointIndex, OccupancyGrid};
pub use guillotine::{FreeSpace, GuillotineIndex};

/// A proposed placement: which slot of the index it came from, where the
/// minimum corner goes and which orientation to use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Index into the substrate's slot list (free space or extreme point).
    pub slot: usize,
    pub position: Vec3,
    pub orientation: Orientation,
    pub score: f64,
}

/// Common interface of both placement substrates.
///
/// A candidate returned by `best_candidate` stays valid until the next
/// mutating call; the engine either commits or discards it immediately.
pub trait SpatialIndex {
    /// Best-scoring candidate over all open slots and `orientations`, or
    /// `None` if nothing fits anywhere.
    fn best_candidate(
        &mut self,
        orientations: &[Orientation],
        scorer: &PlacementScorer,
    ) -> Option<Candidate>;

    /// Marks the candidate's volume as occupied and updates the open slots.
    fn commit(&mut self, candidate: &Candidate);

    /// Drops the candidate's slot without occupying anything.
    fn discard(&mut self, candidate: &Candidate);

    /// Periodic housekeeping after a commit.
    fn maintain(&mut self, _orientations: &[Orientation]) {}

    /// Number of open slots.
    fn open_slots(&self) -> usize;
}

/// Which substrate a packing run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    #[default]
    Guillotine,
    ExtremePoint,
}

impl PlacementStrategy {
    pub const fn code(&self) -> &'static str {
        match self {
            PlacementStrategy::Guillotine => "guillotine",
            PlacementStrategy::ExtremePoint => "extreme_point",
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PlacementStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "guillotine" => Ok(PlacementStrategy::Guillotine),
            "extreme_point" | "extreme_points" | "ep" => Ok(PlacementStrategy::ExtremePoint),
            other => Err(format!("unknown placement strategy '{}'", other)),
        }
    }
}
