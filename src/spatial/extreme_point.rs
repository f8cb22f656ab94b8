//! Extreme point heuristic over a voxel occupancy grid.
//!
//! Candidate positions are integer corner points derived from the far faces
//! of items already placed, starting at the origin. Whether an item fits at
//! a point is decided by sampling the occupancy grid (one cell per
//! centimeter) instead of testing every covered cell:
//!
//! - always: the eight corner cells and the center cell of the box
//! - when any extent exceeds 10 cells: an interior lattice with a stride of
//!   about a fifth of each extent
//!
//! This is an approximation. A pathological occupancy pattern that slips
//! between samples is not detected; exhaustive checking would make each
//! probe cost the full box volume.

use crate::error::ValidationError;
use crate::orientation::Orientation;
use crate::scoring::PlacementScorer;
use crate::spatial::{Candidate, SpatialIndex};
use crate::types::{EPSILON_FIT, EPSILON_GENERAL, Vec3};

/// Extent (in cells) above which interior sampling kicks in.
const INTERIOR_SAMPLING_THRESHOLD: usize = 10;
/// Number of interior samples per axis, roughly.
const INTERIOR_SAMPLES_PER_AXIS: usize = 5;

/// Dense 3D boolean lattice, one cell per unit of length.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    size: [usize; 3],
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Allocates a grid covering `bounds` (each axis rounded up).
    ///
    /// Fails when the grid would exceed `max_cells`.
    pub fn new(bounds: Vec3, max_cells: u64) -> Result<Self, ValidationError> {
        let size = [
            cells_for(bounds.x),
            cells_for(bounds.y),
            cells_for(bounds.z),
        ];
        let cells = (size[0] as u64)
            .checked_mul(size[1] as u64)
            .and_then(|v| v.checked_mul(size[2] as u64))
            .unwrap_or(u64::MAX);
        if cells > max_cells {
            return Err(ValidationError::GridTooLarge {
                cells,
                limit: max_cells,
            });
        }

        Ok(Self {
            size,
            cells: vec![false; cells as usize],
        })
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size[1] + y) * self.size[0] + x
    }

    /// Cells outside the grid count as occupied.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        if x >= self.size[0] || y >= self.size[1] || z >= self.size[2] {
            return true;
        }
        self.cells[self.index(x, y, z)]
    }

    /// Marks the cell block `[min, min + span)` as occupied, clipped to the grid.
    pub fn fill(&mut self, min: [usize; 3], span: [usize; 3]) {
        let end = [
            (min[0] + span[0]).min(self.size[0]),
            (min[1] + span[1]).min(self.size[1]),
            (min[2] + span[2]).min(self.size[2]),
        ];
        for z in min[2]..end[2] {
            for y in min[1]..end[1] {
                let row = self.index(0, y, z);
                self.cells[row + min[0]..row + end[0]].fill(true);
            }
        }
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// Number of grid cells needed to cover `length`.
fn cells_for(length: f64) -> usize {
    ((length - EPSILON_GENERAL).ceil().max(1.0)) as usize
}

/// Number of cells an item extent occupies.
fn span_for(extent: f64) -> usize {
    ((extent - EPSILON_FIT).ceil().max(1.0)) as usize
}

/// A candidate minimum-corner position, in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExtremePoint {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl ExtremePoint {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

/// Extreme point frontier plus the grid it is validated against.
#[derive(Clone, Debug)]
pub struct ExtremePointIndex {
    bounds: Vec3,
    grid: OccupancyGrid,
    points: Vec<ExtremePoint>,
    fit_epsilon: f64,
}

impl ExtremePointIndex {
    pub fn new(bounds: Vec3, fit_epsilon: f64, max_grid_cells: u64) -> Result<Self, ValidationError> {
        Ok(Self {
            bounds,
            grid: OccupancyGrid::new(bounds, max_grid_cells)?,
            points: vec![ExtremePoint::new(0, 0, 0)],
            fit_epsilon,
        })
    }

    pub fn points(&self) -> &[ExtremePoint] {
        &self.points
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Probes whether a box of extents `dims` can sit at `point`.
    pub fn can_place(&self, point: ExtremePoint, dims: Vec3) -> bool {
        let position = point.as_vec3();
        if !(position + dims).fits_within(&self.bounds, self.fit_epsilon) {
            return false;
        }

        let [nx, ny, nz] = self.grid.size();
        let lo = [point.x, point.y, point.z];
        let span = [span_for(dims.x), span_for(dims.y), span_for(dims.z)];
        let hi = [
            (lo[0] + span[0] - 1).min(nx - 1),
            (lo[1] + span[1] - 1).min(ny - 1),
            (lo[2] + span[2] - 1).min(nz - 1),
        ];

        for x in [lo[0], hi[0]] {
            for y in [lo[1], hi[1]] {
                for z in [lo[2], hi[2]] {
                    if self.grid.is_occupied(x, y, z) {
                        return false;
                    }
                }
            }
        }
        if self.grid.is_occupied(
            (lo[0] + hi[0]) / 2,
            (lo[1] + hi[1]) / 2,
            (lo[2] + hi[2]) / 2,
        ) {
            return false;
        }

        if span.iter().any(|s| *s > INTERIOR_SAMPLING_THRESHOLD) {
            let stride = span.map(|s| (s / INTERIOR_SAMPLES_PER_AXIS).max(1));
            for x in (lo[0]..=hi[0]).step_by(stride[0]) {
                for y in (lo[1]..=hi[1]).step_by(stride[1]) {
                    for z in (lo[2]..=hi[2]).step_by(stride[2]) {
                        if self.grid.is_occupied(x, y, z) {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    /// Adds a point unless it is outside the grid, already occupied or
    /// already present.
    fn push_point(&mut self, point: ExtremePoint) {
        if self.grid.is_occupied(point.x, point.y, point.z) || self.points.contains(&point) {
            return;
        }
        self.points.push(point);
    }
}

impl SpatialIndex for ExtremePointIndex {
    fn best_candidate(
        &mut self,
        orientations: &[Orientation],
        scorer: &PlacementScorer,
    ) -> Option<Candidate> {
        // Height first, then x, then y.
        self.points.sort_by_key(|p| (p.z, p.x, p.y));

        let mut best: Option<Candidate> = None;
        for (slot, point) in self.points.iter().enumerate() {
            let position = point.as_vec3();
            let residual = self.bounds - position;
            for orientation in orientations {
                if !self.can_place(*point, orientation.dims) {
                    continue;
                }
                let score = scorer.score(residual, position, orientation.dims);
                if best.is_none_or(|current| score > current.score) {
                    best = Some(Candidate {
                        slot,
                        position,
                        orientation: *orientation,
                        score,
                    });
                }
            }
        }
        best
    }

    fn commit(&mut self, candidate: &Candidate) {
        let point = self.points.remove(candidate.slot);
        let dims = candidate.orientation.dims;
        let span = [span_for(dims.x), span_for(dims.y), span_for(dims.z)];
        self.grid.fill([point.x, point.y, point.z], span);

        self.points.retain(|p| !self.grid.is_occupied(p.x, p.y, p.z));
        self.push_point(ExtremePoint::new(point.x + span[0], point.y, point.z));
        self.push_point(ExtremePoint::new(point.x, point.y + span[1], point.z));
        self.push_point(ExtremePoint::new(point.x, point.y, point.z + span[2]));
    }

    fn discard(&mut self, candidate: &Candidate) {
        self.points.remove(candidate.slot);
    }

    fn open_slots(&self) -> usize {
        self.points.len()
    }
}
