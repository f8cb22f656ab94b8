//! Placement scoring.
//!
//! A candidate is a (region, position, orientation) triple. Its score is a
//! weighted sum of three terms, each in `[0, 1]`:
//!
//! - volume fit: orientation volume / region volume
//! - position: `1 / (1 + x + y + z)`, favoring the bottom-left-front corner
//! - tightness: mean over the three axes of `extent / region extent`, i.e.
//!   one minus the relative slack left on that axis
//!
//! The highest score wins. Equal scores keep the first candidate evaluated.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::types::Vec3;

/// Weights of the three score terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreWeights {
    pub volume_fit: f64,
    pub position: f64,
    pub tightness: f64,
}

impl ScoreWeights {
    pub const GUILLOTINE: Self = Self::new(0.4, 0.3, 0.3);
    pub const EXTREME_POINT: Self = Self::new(0.5, 0.3, 0.2);

    pub const fn new(volume_fit: f64, position: f64, tightness: f64) -> Self {
        Self {
            volume_fit,
            position,
            tightness,
        }
    }

    /// Weights must be finite, non-negative and not all zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let all = [self.volume_fit, self.position, self.tightness];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ValidationError::InvalidConfiguration(format!(
                "score weights must be finite and non-negative, got {:?}",
                all
            )));
        }
        if all.iter().all(|w| *w == 0.0) {
            return Err(ValidationError::InvalidConfiguration(
                "at least one score weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses "volume,position,tightness".
    pub fn parse_triple(raw: &str) -> Result<Self, ValidationError> {
        let values = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                ValidationError::InvalidConfiguration(format!(
                    "score weights '{}' are not numbers: {}",
                    raw, err
                ))
            })?;
        let &[volume_fit, position, tightness] = values.as_slice() else {
            return Err(ValidationError::InvalidConfiguration(format!(
                "expected three comma separated score weights, got '{}'",
                raw
            )));
        };
        let weights = Self::new(volume_fit, position, tightness);
        weights.validate()?;
        Ok(weights)
    }
}

impl fmt::Display for ScoreWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.volume_fit, self.position, self.tightness)
    }
}

/// Ranks candidate placements.
#[derive(Clone, Copy, Debug)]
pub struct PlacementScorer {
    weights: ScoreWeights,
}

impl PlacementScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Scores placing a box with extents `dims` at `position` inside
    /// `region` (the free space or residual space the candidate came from).
    pub fn score(&self, region: Vec3, position: Vec3, dims: Vec3) -> f64 {
        let volume_fit = ratio(dims.volume(), region.volume());
        let position_pref = 1.0 / (1.0 + position.sum().max(0.0));
        let tightness =
            (ratio(dims.x, region.x) + ratio(dims.y, region.y) + ratio(dims.z, region.z)) / 3.0;

        self.weights.volume_fit * volume_fit
            + self.weights.position * position_pref
            + self.weights.tightness * tightness
    }
}

/// `part / whole` clamped to `[0, 1]`; zero when `whole` is degenerate.
fn ratio(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    (part / whole).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_fit_at_origin_scores_sum_of_weights() {
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let dims = Vec3::new(10.0, 10.0, 10.0);
        let score = scorer.score(dims, Vec3::zero(), dims);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tighter_fit_scores_higher() {
        let scorer = PlacementScorer::new(ScoreWeights::GUILLOTINE);
        let dims = Vec3::new(10.0, 10.0, 10.0);
        let tight = scorer.score(Vec3::new(10.0, 10.0, 12.0), Vec3::zero(), dims);
        let loose = scorer.score(Vec3::new(40.0, 40.0, 40.0), Vec3::zero(), dims);
        assert!(tight > loose);
    }

    #[test]
    fn closer_to_origin_scores_higher() {
        let scorer = PlacementScorer::new(ScoreWeights::EXTREME_POINT);
        let region = Vec3::new(20.0, 20.0, 20.0);
        let dims = Vec3::new(10.0, 10.0, 10.0);
        let near = scorer.score(region, Vec3::new(0.0, 0.0, 0.0), dims);
        let far = scorer.score(region, Vec3::new(10.0, 0.0, 0.0), dims);
        assert!(near > far);
    }

    #[test]
    fn parses_weight_triples() {
        assert_eq!(
            ScoreWeights::parse_triple("0.5, 0.3, 0.2").unwrap(),
            ScoreWeights::EXTREME_POINT
        );
        assert!(ScoreWeights::parse_triple("0.5,0.3").is_err());
        assert!(ScoreWeights::parse_triple("a,b,c").is_err());
        assert!(ScoreWeights::parse_triple("-1,0,0").is_err());
        assert!(ScoreWeights::parse_triple("0,0,0").is_err());
    }
}
