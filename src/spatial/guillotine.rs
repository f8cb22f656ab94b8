//! Guillotine free-space list.
//!
//! Starts with one free box spanning the container. Placing an item at a
//! free box's origin cuts the remainder of that box into at most three
//! disjoint boxes:
//!
//! ```text
//! right: beyond the item along x, full width and height of the space
//! front: beyond the item along y, item length, full height of the space
//! top:   above the item,          item length and width
//! ```
//!
//! Cuts are taken relative to the space boundaries, so free boxes never
//! overlap each other or any placed item and together cover all free volume
//! that was reachable from the space.

use crate::orientation::Orientation;
use crate::scoring::PlacementScorer;
use crate::spatial::{Candidate, SpatialIndex};
use crate::types::{BoundingBox, EPSILON_GENERAL, Vec3};

/// An unoccupied axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeSpace {
    pub origin: Vec3,
    pub extents: Vec3,
}

impl FreeSpace {
    pub fn new(origin: Vec3, extents: Vec3) -> Self {
        Self { origin, extents }
    }

    #[inline]
    pub fn can_host(&self, orientation: &Orientation, tolerance: f64) -> bool {
        orientation.dims.fits_within(&self.extents, tolerance)
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.origin, self.extents)
    }

    /// Cuts the space around an item of extents `dims` placed at its origin.
    ///
    /// Successors with a non-positive extent are dropped.
    pub fn split(&self, dims: Vec3) -> Vec<FreeSpace> {
        let o = self.origin;
        let e = self.extents;
        let right = FreeSpace::new(
            Vec3::new(o.x + dims.x, o.y, o.z),
            Vec3::new(e.x - dims.x, e.y, e.z),
        );
        let front = FreeSpace::new(
            Vec3::new(o.x, o.y + dims.y, o.z),
            Vec3::new(dims.x, e.y - dims.y, e.z),
        );
        let top = FreeSpace::new(
            Vec3::new(o.x, o.y, o.z + dims.z),
            Vec3::new(dims.x, dims.y, e.z - dims.z),
        );

        [right, front, top]
            .into_iter()
            .filter(|space| {
                space.extents.x > EPSILON_GENERAL
                    && space.extents.y > EPSILON_GENERAL
                    && space.extents.z > EPSILON_GENERAL
            })
            .collect()
    }
}

/// Free-space list under guillotine splitting.
#[derive(Clone, Debug)]
pub struct GuillotineIndex {
    spaces: Vec<FreeSpace>,
    fit_epsilon: f64,
    prune_interval: usize,
    commits: usize,
}

impl GuillotineIndex {
    /// Creates the index with a single free space covering `bounds`.
    ///
    /// `prune_interval` is the number of commits between two prune passes;
    /// 0 disables periodic pruning.
    pub fn new(bounds: Vec3, fit_epsilon: f64, prune_interval: usize) -> Self {
        Self {
            spaces: vec![FreeSpace::new(Vec3::zero(), bounds)],
            fit_epsilon,
            prune_interval,
            commits: 0,
        }
    }

    pub fn spaces(&self) -> &[FreeSpace] {
        &self.spaces
    }

    /// Removes spaces that cannot host any of `orientations` and spaces that
    /// lie entirely inside another retained space. Of two identical spaces
    /// the earlier one survives.
    pub fn prune(&mut self, orientations: &[Orientation]) {
        let mut keep: Vec<bool> = self
            .spaces
            .iter()
            .map(|space| orientations.iter().any(|o| space.can_host(o, self.fit_epsilon)))
            .collect();
        let boxes: Vec<BoundingBox> = self.spaces.iter().map(FreeSpace::bounding_box).collect();

        for i in 0..boxes.len() {
            if !keep[i] {
                continue;
            }
            for j in 0..boxes.len() {
                if i == j || !keep[j] || !boxes[j].contains(&boxes[i], EPSILON_GENERAL) {
                    continue;
                }
                let identical = boxes[i].contains(&boxes[j], EPSILON_GENERAL);
                if identical && i < j {
                    continue;
                }
                keep[i] = false;
                break;
            }
        }

        let before = self.spaces.len();
        let mut flags = keep.into_iter();
        self.spaces.retain(|_| flags.next().unwrap_or(false));
        tracing::trace!(
            before,
            after = self.spaces.len(),
            "pruned guillotine free spaces"
        );
    }
}

impl SpatialIndex for GuillotineIndex {
    fn best_candidate(
        &mut self,
        orientations: &[Orientation],
        scorer: &PlacementScorer,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for (slot, space) in self.spaces.iter().enumerate() {
            for orientation in orientations {
                if !space.can_host(orientation, self.fit_epsilon) {
                    continue;
                }
                let score = scorer.score(space.extents, space.origin, orientation.dims);
                if best.is_none_or(|current| score > current.score) {
                    best = Some(Candidate {
                        slot,
                        position: space.origin,
                        orientation: *orientation,
                        score,
                    });
                }
            }
        }

        best
    }

    fn commit(&mut self, candidate: &Candidate) {
        let space = self.spaces.remove(candidate.slot);
        self.spaces.extend(space.split(candidate.orientation.dims));
        self.commits += 1;
    }

    fn discard(&mut self, candidate: &Candidate) {
        self.spaces.remove(candidate.slot);
    }

    fn maintain(&mut self, orientations: &[Orientation]) {
        if self.prune_interval > 0 && self.commits % self.prune_interval == 0 {
            self.prune(orientations);
        }
    }

    fn open_slots(&self) -> usize {
        self.spaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;
    use crate::orientation::enumerate_orientations;
    use crate::scoring::ScoreWeights;
    use crate::types::EPSILON_FIT;

    fn orientations(l: f64, w: f64, h: f64) -> Vec<Orientation> {
        enumerate_orientations(&Dimension::new(l, w, h).unwrap(), true)
    }

    #[test]
    fn split_produces_disjoint_cover() {
        let space = FreeSpace::new(Vec3::zero(), Vec3::new(10.0, 8.0, 6.0));
        let item = Vec3::new(4.0, 3.0, 2.0);
        let parts = space.split(item);
        assert_eq!(parts.len(), 3);

        let item_box = BoundingBox::from_position_and_dims(Vec3::zero(), item);
        let mut covered = item.volume();
        for (i, a) in parts.iter().enumerate() {
            assert!(!a.bounding_box().intersects(&item_box));
            for b in &parts[i + 1..] {
                assert!(!a.bounding_box().intersects(&b.bounding_box()));
            }
            covered += a.extents.volume();
        }
        assert!((covered - space.extents.volume()).abs() < 1e-9);
    }

    #[test]
    fn split_drops_empty_successors() {
        let space = FreeSpace::new(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let parts = space.split(Vec3::new(10.0, 10.0, 5.0));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].origin, Vec3::new(0.0, 0.0, 5.0));
        assert!(space.split(Vec3::new(10.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn best_candidate_prefers_tight_fit_at_origin() {
        let mut index = GuillotineIndex::new(Vec3::new(10.0, 10.0, 10.0), EPSILON_FIT, 10);
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let candidate = index
            .best_candidate(&orientations(10.0, 10.0, 5.0), &scorer)
            .unwrap();
        assert_eq!(candidate.slot, 0);
        assert_eq!(candidate.position, Vec3::zero());
        assert!(candidate.orientation.dims.fits_within(&Vec3::new(10.0, 10.0, 10.0), 0.0));
    }

    #[test]
    fn nothing_fits_in_too_small_container() {
        let mut index = GuillotineIndex::new(Vec3::new(10.0, 10.0, 10.0), EPSILON_FIT, 10);
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        assert!(
            index
                .best_candidate(&orientations(11.0, 1.0, 1.0), &scorer)
                .is_none()
        );
    }

    #[test]
    fn rotation_makes_long_item_fit() {
        let mut index = GuillotineIndex::new(Vec3::new(10.0, 2.0, 12.0), EPSILON_FIT, 10);
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let candidate = index
            .best_candidate(&orientations(11.0, 1.0, 1.0), &scorer)
            .unwrap();
        assert_eq!(candidate.orientation.dims.z, 11.0);
        assert!(candidate.orientation.rotated);
    }

    #[test]
    fn commit_replaces_space_with_successors() {
        let mut index = GuillotineIndex::new(Vec3::new(20.0, 10.0, 10.0), EPSILON_FIT, 0);
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let orientations = orientations(10.0, 10.0, 10.0);
        let candidate = index.best_candidate(&orientations, &scorer).unwrap();
        index.commit(&candidate);

        assert_eq!(index.open_slots(), 1);
        assert_eq!(index.spaces()[0].origin, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn prune_removes_unusable_and_contained_spaces() {
        let mut index = GuillotineIndex::new(Vec3::new(10.0, 10.0, 10.0), EPSILON_FIT, 0);
        index.spaces = vec![
            FreeSpace::new(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0)),
            FreeSpace::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(5.0, 5.0, 5.0)),
            FreeSpace::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0)),
            FreeSpace::new(Vec3::new(20.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
        ];

        index.prune(&orientations(2.0, 2.0, 2.0));

        assert_eq!(index.spaces().len(), 1);
        assert_eq!(index.spaces()[0].extents, Vec3::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn maintain_prunes_on_interval() {
        let mut index = GuillotineIndex::new(Vec3::new(30.0, 10.0, 10.0), EPSILON_FIT, 2);
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let wide = orientations(10.0, 10.0, 10.0);

        index.spaces.push(FreeSpace::new(
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        ));

        let candidate = index.best_candidate(&wide, &scorer).unwrap();
        index.commit(&candidate);
        index.maintain(&wide);
        assert!(index.spaces().iter().any(|s| s.extents.x == 1.0));

        let candidate = index.best_candidate(&wide, &scorer).unwrap();
        index.commit(&candidate);
        index.maintain(&wide);
        assert!(index.spaces().iter().all(|s| s.extents.x >= 10.0));
    }
}
