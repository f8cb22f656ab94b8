//! Greedy multi-type allocation under a volume and weight budget.
//!
//! Candidates are sorted by density (unit weight / unit volume, highest
//! first, stable for ties), seeded with a floor quantity and then
//! incremented while both running totals stay within budget. The loop stops
//! at the first scan that adds nothing.
//!
//! This is a heuristic. It favors dense item types and does not search for a
//! globally optimal mix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ValidationError, validate_dimension, validate_weight};
use crate::model::{Container, Dimension};
use crate::types::{Dimensional, EPSILON_GENERAL};

/// One item type competing for space, with its allocated quantity.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CombinationCandidate {
    pub name: String,
    /// Weight of one unit in kg
    pub unit_weight: f64,
    /// Volume of one unit in cm³
    pub unit_volume: f64,
    pub quantity: usize,
}

impl CombinationCandidate {
    pub fn new(
        name: impl Into<String>,
        unit_weight: f64,
        unit_volume: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_weight(unit_weight, &format!("Unit weight of '{}'", name))?;
        validate_dimension(unit_volume, &format!("Unit volume of '{}'", name))?;
        Ok(Self {
            name,
            unit_weight,
            unit_volume,
            quantity: 0,
        })
    }

    /// Candidate whose unit volume is the box volume of `dims`.
    pub fn from_dimension(
        name: impl Into<String>,
        dims: &Dimension,
        unit_weight: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(name, unit_weight, dims.volume())
    }

    /// Unit weight per unit volume.
    #[inline]
    pub fn efficiency(&self) -> f64 {
        self.unit_weight / self.unit_volume
    }

    pub fn total_weight(&self) -> f64 {
        self.unit_weight * self.quantity as f64
    }

    pub fn total_volume(&self) -> f64 {
        self.unit_volume * self.quantity as f64
    }
}

/// Volume (cm³) and weight (kg) ceilings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Budget {
    pub max_volume: f64,
    pub max_weight: f64,
}

impl Budget {
    pub fn new(max_volume: f64, max_weight: f64) -> Result<Self, ValidationError> {
        validate_dimension(max_volume, "Budget volume")?;
        validate_weight(max_weight, "Budget weight")?;
        Ok(Self {
            max_volume,
            max_weight,
        })
    }

    /// Budget whose volume ceiling is the container's true volume.
    pub fn from_container(container: &Container, max_weight: f64) -> Result<Self, ValidationError> {
        Self::new(container.total_volume(), max_weight)
    }

    fn admits(&self, volume: f64, weight: f64) -> bool {
        volume <= self.max_volume && weight <= self.max_weight
    }
}

/// Starting quantity of every candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeedFloor {
    Zero,
    /// At least one of each type, even if that overshoots the budget.
    #[default]
    One,
}

impl SeedFloor {
    pub const fn quantity(self) -> usize {
        match self {
            SeedFloor::Zero => 0,
            SeedFloor::One => 1,
        }
    }
}

impl fmt::Display for SeedFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedFloor::Zero => f.write_str("zero"),
            SeedFloor::One => f.write_str("one"),
        }
    }
}

impl FromStr for SeedFloor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(SeedFloor::Zero),
            "one" | "1" => Ok(SeedFloor::One),
            other => Err(format!("unknown seed floor '{}'", other)),
        }
    }
}

/// How a scan increments candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// One unit per candidate per scan.
    #[default]
    RoundRobin,
    /// Fill each candidate as far as it goes before moving on.
    Saturate,
}

impl FillMode {
    pub const fn code(&self) -> &'static str {
        match self {
            FillMode::RoundRobin => "round_robin",
            FillMode::Saturate => "saturate",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(FillMode::RoundRobin),
            "saturate" | "greedy" => Ok(FillMode::Saturate),
            other => Err(format!("unknown fill mode '{}'", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CombinationConfig {
    pub seed: SeedFloor,
    pub fill_mode: FillMode,
    /// Upper bound on scans; reaching it ends the run normally.
    pub max_passes: usize,
}

impl CombinationConfig {
    pub const DEFAULT_MAX_PASSES: usize = 100_000;

    pub fn builder() -> CombinationConfigBuilder {
        CombinationConfigBuilder::default()
    }
}

impl Default for CombinationConfig {
    fn default() -> Self {
        Self {
            seed: SeedFloor::default(),
            fill_mode: FillMode::default(),
            max_passes: Self::DEFAULT_MAX_PASSES,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CombinationConfigBuilder {
    config: CombinationConfig,
}

impl CombinationConfigBuilder {
    pub fn seed(mut self, seed: SeedFloor) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn fill_mode(mut self, mode: FillMode) -> Self {
        self.config.fill_mode = mode;
        self
    }

    pub fn max_passes(mut self, passes: usize) -> Self {
        self.config.max_passes = passes;
        self
    }

    pub fn build(self) -> CombinationConfig {
        self.config
    }
}

/// Final allocation.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CombinationResult {
    /// Candidates in efficiency order with their final quantities.
    pub candidates: Vec<CombinationCandidate>,
    pub total_volume: f64,
    pub total_weight: f64,
    /// Budget volume minus total volume (negative when the seed overshoots).
    pub remaining_volume: f64,
    pub remaining_weight: f64,
    pub passes: usize,
    /// The seed quantities alone already exceed the budget.
    pub seed_exceeds_budget: bool,
}

impl CombinationResult {
    pub fn quantity_of(&self, name: &str) -> Option<usize> {
        self.candidates
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.quantity)
    }

    pub fn total_units(&self) -> usize {
        self.candidates.iter().map(|c| c.quantity).sum()
    }
}

/// Allocates quantities with the default configuration.
pub fn optimize_combination(
    candidates: Vec<CombinationCandidate>,
    budget: Budget,
) -> Result<CombinationResult, ValidationError> {
    optimize_combination_with_config(candidates, budget, CombinationConfig::default())
}

/// Allocates quantities under `budget`.
///
/// Incoming `quantity` fields are ignored; every candidate starts at the
/// configured seed floor.
pub fn optimize_combination_with_config(
    mut candidates: Vec<CombinationCandidate>,
    budget: Budget,
    config: CombinationConfig,
) -> Result<CombinationResult, ValidationError> {
    Budget::new(budget.max_volume, budget.max_weight)?;
    for candidate in &candidates {
        CombinationCandidate::new(
            candidate.name.as_str(),
            candidate.unit_weight,
            candidate.unit_volume,
        )?;
    }

    candidates.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));

    let seed = config.seed.quantity();
    for candidate in candidates.iter_mut() {
        candidate.quantity = seed;
    }
    let mut volume: f64 = candidates.iter().map(CombinationCandidate::total_volume).sum();
    let mut weight: f64 = candidates.iter().map(CombinationCandidate::total_weight).sum();

    let seed_exceeds_budget = !budget.admits(volume, weight);
    if seed_exceeds_budget {
        tracing::warn!(
            seed_volume = volume,
            seed_weight = weight,
            max_volume = budget.max_volume,
            max_weight = budget.max_weight,
            "combination seed already exceeds the budget"
        );
    }

    let mut passes = 0;
    let mut converged = false;
    while passes < config.max_passes {
        passes += 1;
        let mut improved = false;

        for candidate in candidates.iter_mut() {
            let added = match config.fill_mode {
                FillMode::RoundRobin => {
                    if budget.admits(volume + candidate.unit_volume, weight + candidate.unit_weight)
                    {
                        1
                    } else {
                        0
                    }
                }
                FillMode::Saturate => units_that_fit(candidate, &budget, volume, weight),
            };
            if added > 0 {
                candidate.quantity += added;
                volume += candidate.unit_volume * added as f64;
                weight += candidate.unit_weight * added as f64;
                improved = true;
            }
        }

        if !improved {
            converged = true;
            break;
        }
    }
    if !converged {
        tracing::debug!(passes, "combination stopped at the pass limit");
    }

    // Report the running totals: they are exactly what `admits` accepted.
    let (total_volume, total_weight) = (volume, weight);
    tracing::debug!(
        types = candidates.len(),
        total_volume,
        total_weight,
        passes,
        fill_mode = %config.fill_mode,
        "combination finished"
    );

    Ok(CombinationResult {
        candidates,
        total_volume,
        total_weight,
        remaining_volume: budget.max_volume - total_volume,
        remaining_weight: budget.max_weight - total_weight,
        passes,
        seed_exceeds_budget,
    })
}

/// How many more units of `candidate` fit on top of the running totals.
fn units_that_fit(candidate: &CombinationCandidate, budget: &Budget, volume: f64, weight: f64) -> usize {
    let by_volume = (budget.max_volume - volume + EPSILON_GENERAL) / candidate.unit_volume;
    let by_weight = (budget.max_weight - weight + EPSILON_GENERAL) / candidate.unit_weight;
    let limit = by_volume.min(by_weight);
    if !(limit >= 1.0) {
        return 0;
    }
    let mut count = limit.floor() as usize;
    // Float division can land one unit past the ceiling.
    while count > 0
        && !budget.admits(
            volume + candidate.unit_volume * count as f64,
            weight + candidate.unit_weight * count as f64,
        )
    {
        count -= 1;
    }
    count
}
