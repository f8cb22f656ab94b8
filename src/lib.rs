//! Heuristic 3D load planning.
//!
//! Two computations share one geometry model:
//!
//! - [`optimizer::pack`]: how many copies of one item fit into one container,
//!   and where each goes
//! - [`combination::optimize_combination`]: how many units of several item
//!   types to load under a volume and weight budget
//!
//! All geometry is normalized to centimeters and all weights to kilograms
//! before any computation (see [`units`]). Runs are synchronous,
//! deterministic and own all of their state, so independent runs can execute
//! on separate threads without coordination.

pub mod combination;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod optimizer;
pub mod orientation;
pub mod scoring;
pub mod spatial;
pub mod types;
pub mod units;
pub mod utilization;
