//! Packing engine for loading one item type into one container.
//!
//! The engine is a small state machine:
//!
//! ```text
//! Initializing -> Selecting -> Placing -> Selecting -> ... -> Exhausted
//! ```
//!
//! `Selecting` asks the spatial index for its best candidate; `Placing`
//! re-checks bounds and commits it. The run ends when nothing fits, when the
//! theoretical maximum (container volume / item volume) is reached, or when
//! the iteration budget runs out. None of these is an error.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::geometry::within_bounds;
use crate::model::{Container, Dimension, Item, PlacedItem};
use crate::orientation::{Orientation, enumerate_orientations};
use crate::scoring::{PlacementScorer, ScoreWeights};
use crate::spatial::{
    Candidate, ExtremePointIndex, GuillotineIndex, PlacementStrategy, SpatialIndex,
};
use crate::types::{EPSILON_FIT, Vec3};
use crate::utilization::utilization_percent;

/// Tuning knobs for a packing run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Which spatial index to use
    pub strategy: PlacementStrategy,
    /// Enumerate all orientations, or keep items as given
    pub allow_item_rotation: bool,
    /// Tolerance for fit and bounds checks
    pub fit_epsilon: f64,
    /// Iteration budget as a multiple of the placement ceiling
    pub iteration_budget_factor: usize,
    /// Guillotine: commits between two prune passes (0 = never)
    pub prune_interval: usize,
    /// Hard ceiling on placements per run, applied on top of the theoretical maximum
    pub max_placements: usize,
    /// Extreme point: largest occupancy grid allowed
    pub max_grid_cells: u64,
    pub guillotine_weights: ScoreWeights,
    pub extreme_point_weights: ScoreWeights,
}

impl PackingConfig {
    pub const DEFAULT_STRATEGY: PlacementStrategy = PlacementStrategy::Guillotine;
    pub const DEFAULT_ALLOW_ITEM_ROTATION: bool = true;
    pub const DEFAULT_FIT_EPSILON: f64 = EPSILON_FIT;
    pub const DEFAULT_ITERATION_BUDGET_FACTOR: usize = 5;
    pub const DEFAULT_PRUNE_INTERVAL: usize = 10;
    pub const DEFAULT_MAX_PLACEMENTS: usize = 10_000;
    pub const DEFAULT_MAX_GRID_CELLS: u64 = 20_000_000;

    /// Creates a builder for custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }

    /// Score weights for the configured strategy.
    pub fn score_weights(&self) -> ScoreWeights {
        match self.strategy {
            PlacementStrategy::Guillotine => self.guillotine_weights,
            PlacementStrategy::ExtremePoint => self.extreme_point_weights,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.fit_epsilon.is_finite() && self.fit_epsilon >= 0.0) {
            return Err(ValidationError::InvalidConfiguration(format!(
                "fit epsilon must be finite and non-negative, got {}",
                self.fit_epsilon
            )));
        }
        if self.iteration_budget_factor == 0 {
            return Err(ValidationError::InvalidConfiguration(
                "iteration budget factor must be at least 1".to_string(),
            ));
        }
        self.guillotine_weights.validate()?;
        self.extreme_point_weights.validate()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            strategy: Self::DEFAULT_STRATEGY,
            allow_item_rotation: Self::DEFAULT_ALLOW_ITEM_ROTATION,
            fit_epsilon: Self::DEFAULT_FIT_EPSILON,
            iteration_budget_factor: Self::DEFAULT_ITERATION_BUDGET_FACTOR,
            prune_interval: Self::DEFAULT_PRUNE_INTERVAL,
            max_placements: Self::DEFAULT_MAX_PLACEMENTS,
            max_grid_cells: Self::DEFAULT_MAX_GRID_CELLS,
            guillotine_weights: ScoreWeights::GUILLOTINE,
            extreme_point_weights: ScoreWeights::EXTREME_POINT,
        }
    }
}

/// Builder for `PackingConfig`.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn allow_item_rotation(mut self, allow: bool) -> Self {
        self.config.allow_item_rotation = allow;
        self
    }

    pub fn fit_epsilon(mut self, epsilon: f64) -> Self {
        self.config.fit_epsilon = epsilon;
        self
    }

    pub fn iteration_budget_factor(mut self, factor: usize) -> Self {
        self.config.iteration_budget_factor = factor;
        self
    }

    pub fn prune_interval(mut self, interval: usize) -> Self {
        self.config.prune_interval = interval;
        self
    }

    pub fn max_placements(mut self, max: usize) -> Self {
        self.config.max_placements = max;
        self
    }

    pub fn max_grid_cells(mut self, max: u64) -> Self {
        self.config.max_grid_cells = max;
        self
    }

    pub fn guillotine_weights(mut self, weights: ScoreWeights) -> Self {
        self.config.guillotine_weights = weights;
        self
    }

    pub fn extreme_point_weights(mut self, weights: ScoreWeights) -> Self {
        self.config.extreme_point_weights = weights;
        self
    }

    /// Creates the final configuration.
    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No open slot admits any orientation.
    NoCandidate,
    /// Placed count reached the placement ceiling.
    TheoreticalMaximum,
    /// Iteration budget exhausted.
    IterationBudget,
}

impl Termination {
    pub fn code(&self) -> &'static str {
        match self {
            Termination::NoCandidate => "no_candidate",
            Termination::TheoreticalMaximum => "theoretical_maximum",
            Termination::IterationBudget => "iteration_budget",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::NoCandidate => write!(f, "No free space admits another item"),
            Termination::TheoreticalMaximum => {
                write!(f, "Container volume is fully accounted for")
            }
            Termination::IterationBudget => write!(f, "Iteration budget exhausted"),
        }
    }
}

/// Outcome of one packing run.
#[derive(Clone, Debug)]
pub struct PackingResult {
    /// Placements in commit order.
    pub placements: Vec<PlacedItem>,
    pub theoretical_max: usize,
    pub iterations: usize,
    pub termination: Termination,
    pub strategy: PlacementStrategy,
    /// Volumetric fill in percent, two decimals.
    pub utilization: f64,
}

impl PackingResult {
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Events emitted during a run, for live visualization.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// A run has been initialized.
    RunStarted {
        strategy: PlacementStrategy,
        container_dims: (f64, f64, f64),
        item_dims: (f64, f64, f64),
        theoretical_max: usize,
        orientations: usize,
    },
    /// An item was committed.
    ItemPlaced {
        sequence: usize,
        pos: (f64, f64, f64),
        dims: (f64, f64, f64),
        rotated: bool,
    },
    /// The run has ended.
    Finished {
        placed: usize,
        utilization: f64,
        termination: Termination,
    },
}

#[derive(Debug)]
enum EngineState {
    Initializing,
    Selecting,
    Placing(Candidate),
    Exhausted(Termination),
}

/// Drives one run over a spatial index.
struct PackingEngine<'a, I: SpatialIndex> {
    index: I,
    container: &'a Container,
    item: &'a Item,
    bounds: Vec3,
    orientations: Vec<Orientation>,
    scorer: PlacementScorer,
    config: PackingConfig,
    placements: Vec<PlacedItem>,
    theoretical_max: usize,
    ceiling: usize,
    iteration_budget: usize,
    iterations: usize,
}

impl<'a, I: SpatialIndex> PackingEngine<'a, I> {
    fn new(index: I, container: &'a Container, item: &'a Item, config: PackingConfig) -> Self {
        Self {
            index,
            container,
            item,
            bounds: container.loading_box(),
            orientations: enumerate_orientations(&item.dims, config.allow_item_rotation),
            scorer: PlacementScorer::new(config.score_weights()),
            config,
            placements: Vec::new(),
            theoretical_max: 0,
            ceiling: 0,
            iteration_budget: 0,
            iterations: 0,
        }
    }

    fn run(mut self, on_event: &mut impl FnMut(&PackEvent)) -> PackingResult {
        let mut state = EngineState::Initializing;
        let termination = loop {
            state = match state {
                EngineState::Initializing => self.initialize(on_event),
                EngineState::Selecting => self.select(),
                EngineState::Placing(candidate) => self.place(candidate, on_event),
                EngineState::Exhausted(reason) => break reason,
            };
        };

        let utilization = utilization_percent(
            self.container.total_volume(),
            self.item.dims.as_vec3().volume(),
            self.placements.len(),
        );
        tracing::debug!(
            strategy = %self.config.strategy,
            placed = self.placements.len(),
            theoretical_max = self.theoretical_max,
            iterations = self.iterations,
            termination = termination.code(),
            utilization,
            "packing run finished"
        );
        on_event(&PackEvent::Finished {
            placed: self.placements.len(),
            utilization,
            termination,
        });

        PackingResult {
            placements: self.placements,
            theoretical_max: self.theoretical_max,
            iterations: self.iterations,
            termination,
            strategy: self.config.strategy,
            utilization,
        }
    }

    fn initialize(&mut self, on_event: &mut impl FnMut(&PackEvent)) -> EngineState {
        self.theoretical_max =
            theoretical_max(self.container.total_volume(), self.item.dims.as_vec3().volume());
        self.ceiling = self.theoretical_max.min(self.config.max_placements);
        self.iteration_budget = self
            .ceiling
            .saturating_mul(self.config.iteration_budget_factor)
            .max(1);

        tracing::debug!(
            strategy = %self.config.strategy,
            container = ?self.bounds.as_tuple(),
            item = ?self.item.dims.as_tuple(),
            theoretical_max = self.theoretical_max,
            orientations = self.orientations.len(),
            "packing run started"
        );
        on_event(&PackEvent::RunStarted {
            strategy: self.config.strategy,
            container_dims: self.bounds.as_tuple(),
            item_dims: self.item.dims.as_tuple(),
            theoretical_max: self.theoretical_max,
            orientations: self.orientations.len(),
        });

        EngineState::Selecting
    }

    fn select(&mut self) -> EngineState {
        if self.placements.len() >= self.ceiling {
            return EngineState::Exhausted(Termination::TheoreticalMaximum);
        }
        if self.iterations >= self.iteration_budget {
            return EngineState::Exhausted(Termination::IterationBudget);
        }
        self.iterations += 1;

        match self.index.best_candidate(&self.orientations, &self.scorer) {
            Some(candidate) => EngineState::Placing(candidate),
            None => EngineState::Exhausted(Termination::NoCandidate),
        }
    }

    fn place(&mut self, candidate: Candidate, on_event: &mut impl FnMut(&PackEvent)) -> EngineState {
        if !within_bounds(
            candidate.position,
            candidate.orientation.dims,
            self.bounds,
            self.config.fit_epsilon,
        ) {
            tracing::error!(
                position = ?candidate.position.as_tuple(),
                dims = ?candidate.orientation.dims.as_tuple(),
                "spatial index proposed an out-of-bounds placement, discarding slot"
            );
            self.index.discard(&candidate);
            return EngineState::Selecting;
        }

        self.index.commit(&candidate);
        self.index.maintain(&self.orientations);

        let placed = PlacedItem {
            sequence: self.placements.len(),
            item_id: self.item.id,
            position: candidate.position.as_tuple(),
            orientation: candidate.orientation,
        };
        on_event(&PackEvent::ItemPlaced {
            sequence: placed.sequence,
            pos: placed.position,
            dims: placed.dims(),
            rotated: placed.rotated(),
        });
        self.placements.push(placed);

        EngineState::Selecting
    }
}

/// `floor(container_volume / item_volume)`, 0 for degenerate inputs.
pub fn theoretical_max(container_volume: f64, item_volume: f64) -> usize {
    if item_volume <= 0.0 || container_volume <= 0.0 {
        return 0;
    }
    // Guards against 119.99999999 for an exact fit.
    (container_volume / item_volume + 1e-9).floor() as usize
}

/// Packs as many copies of `item_dims` into `container_dims` as the
/// heuristic finds room for.
///
/// Both triples are normalized from their unit tags to centimeters first.
/// Unknown unit tags are treated as centimeters (see [`crate::units`]).
/// Returns placements in commit order; an item that fits nowhere yields an
/// empty list.
///
/// # Examples
/// ```
/// use load_it_now::optimizer::pack;
///
/// let placements = pack((50.0, 30.0, 40.0), "cm", (10.0, 10.0, 5.0), "cm").unwrap();
/// assert!(!placements.is_empty());
/// assert!(placements.len() <= 120);
/// ```
pub fn pack(
    container_dims: (f64, f64, f64),
    container_unit: &str,
    item_dims: (f64, f64, f64),
    item_unit: &str,
) -> Result<Vec<PlacedItem>, ValidationError> {
    let container = Container::from_units(container_dims, container_unit)?;
    let item = Item::new(0, Dimension::from_units(item_dims, item_unit)?);
    Ok(pack_with_config(&container, &item, PackingConfig::default())?.placements)
}

/// Packs with a custom configuration and returns the full result.
pub fn pack_with_config(
    container: &Container,
    item: &Item,
    config: PackingConfig,
) -> Result<PackingResult, ValidationError> {
    pack_with_progress(container, item, config, |_| {})
}

/// Packs with a custom configuration and a live progress callback.
///
/// The callback sees `RunStarted`, one `ItemPlaced` per placement and a
/// final `Finished` event.
pub fn pack_with_progress(
    container: &Container,
    item: &Item,
    config: PackingConfig,
    mut on_event: impl FnMut(&PackEvent),
) -> Result<PackingResult, ValidationError> {
    config.validate()?;
    container.shape.validate()?;
    let bounds = container.loading_box();

    let result = match config.strategy {
        PlacementStrategy::Guillotine => {
            let index = GuillotineIndex::new(bounds, config.fit_epsilon, config.prune_interval);
            PackingEngine::new(index, container, item, config).run(&mut on_event)
        }
        PlacementStrategy::ExtremePoint => {
            let index = ExtremePointIndex::new(bounds, config.fit_epsilon, config.max_grid_cells)?;
            PackingEngine::new(index, container, item, config).run(&mut on_event)
        }
    };
    Ok(result)
}
