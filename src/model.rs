//! Data models for a load planning run.
//!
//! - `Dimension`: a validated (length, width, height) triple in centimeters
//! - `Item`: the product or carton being loaded
//! - `ContainerShape` / `Container`: the loading volume
//! - `PlacedItem`: one committed placement, the engine's output record
//!
//! All values are created fresh per run and are immutable once built.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ValidationError, validate_dimension, validate_weight};
use crate::orientation::Orientation;
use crate::types::{BoundingBox, Dimensional, Positioned, Vec3};
use crate::units::normalize_dims;

/// A validated (length, width, height) triple in centimeters.
///
/// Every component is strictly positive and finite.
///
/// # Examples
/// ```
/// use load_it_now::model::Dimension;
///
/// let dims: Dimension = "30 x 20 x 10".parse().unwrap();
/// assert_eq!(dims.as_tuple(), (30.0, 20.0, 10.0));
/// assert!(Dimension::new(0.0, 1.0, 1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimension {
    length: f64,
    width: f64,
    height: f64,
}

impl Dimension {
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, ValidationError> {
        validate_dimension(length, "Length")?;
        validate_dimension(width, "Width")?;
        validate_dimension(height, "Height")?;
        Ok(Self {
            length,
            width,
            height,
        })
    }

    pub fn from_tuple(dims: (f64, f64, f64)) -> Result<Self, ValidationError> {
        Self::new(dims.0, dims.1, dims.2)
    }

    /// Normalizes `dims` from the unit named by `unit_tag` to centimeters,
    /// then validates. Unknown tags are treated as centimeters.
    pub fn from_units(dims: (f64, f64, f64), unit_tag: &str) -> Result<Self, ValidationError> {
        Self::from_tuple(normalize_dims(dims, unit_tag))
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.length, self.width, self.height)
    }

    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

impl Dimensional for Dimension {
    fn dimensions(&self) -> Vec3 {
        self.as_vec3()
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    /// Parses "LxWxH". Accepts `x`, `X`, `×` and `*` as separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ValidationError::MalformedDimension {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let normalized: String = s
            .chars()
            .map(|c| match c {
                'X' | '×' | '*' => 'x',
                other => other,
            })
            .collect();
        let parts: Vec<&str> = normalized.split('x').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(malformed("expected three values separated by 'x'"));
        }

        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            if part.is_empty() {
                return Err(malformed("empty component"));
            }
            *slot = part
                .parse::<f64>()
                .map_err(|err| malformed(&format!("'{}' is not a number: {}", part, err)))?;
        }

        Self::new(values[0], values[1], values[2])
    }
}

/// An item to be loaded. Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: usize,
    pub dims: Dimension,
    pub weight: Option<f64>,
}

impl Item {
    pub fn new(id: usize, dims: Dimension) -> Self {
        Self {
            id,
            dims,
            weight: None,
        }
    }

    /// Attaches a weight in kg after validating it.
    pub fn with_weight(mut self, weight: f64) -> Result<Self, ValidationError> {
        validate_weight(weight, "Item weight")?;
        self.weight = Some(weight);
        Ok(self)
    }

    /// Weight of `count` copies in kg, if the item has a weight.
    pub fn loaded_weight(&self, count: usize) -> Option<f64> {
        self.weight.map(|weight| weight * count as f64)
    }
}

impl Dimensional for Item {
    fn dimensions(&self) -> Vec3 {
        self.dims.as_vec3()
    }
}

/// Geometry of the loading volume.
///
/// Each variant carries only the measures its volume formula needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerShape {
    Rectangular { length: f64, width: f64, height: f64 },
    Cubic { edge: f64 },
    Cylindrical { radius: f64, height: f64 },
}

impl ContainerShape {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            ContainerShape::Rectangular {
                length,
                width,
                height,
            } => {
                validate_dimension(length, "Container length")?;
                validate_dimension(width, "Container width")?;
                validate_dimension(height, "Container height")
            }
            ContainerShape::Cubic { edge } => validate_dimension(edge, "Container edge"),
            ContainerShape::Cylindrical { radius, height } => {
                validate_dimension(radius, "Container radius")?;
                validate_dimension(height, "Container height")
            }
        }
    }

    /// True geometric volume of the shape.
    pub fn volume(&self) -> f64 {
        match *self {
            ContainerShape::Rectangular {
                length,
                width,
                height,
            } => length * width * height,
            ContainerShape::Cubic { edge } => edge * edge * edge,
            ContainerShape::Cylindrical { radius, height } => {
                std::f64::consts::PI * radius * radius * height
            }
        }
    }

    /// The axis-aligned box items are packed into.
    ///
    /// For a cylinder this is the inscribed square prism.
    pub fn loading_box(&self) -> Vec3 {
        match *self {
            ContainerShape::Rectangular {
                length,
                width,
                height,
            } => Vec3::new(length, width, height),
            ContainerShape::Cubic { edge } => Vec3::new(edge, edge, edge),
            ContainerShape::Cylindrical { radius, height } => {
                let side = radius * std::f64::consts::SQRT_2;
                Vec3::new(side, side, height)
            }
        }
    }

    /// Multiplies every measure by `factor` (used for unit conversion).
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            ContainerShape::Rectangular {
                length,
                width,
                height,
            } => ContainerShape::Rectangular {
                length: length * factor,
                width: width * factor,
                height: height * factor,
            },
            ContainerShape::Cubic { edge } => ContainerShape::Cubic {
                edge: edge * factor,
            },
            ContainerShape::Cylindrical { radius, height } => ContainerShape::Cylindrical {
                radius: radius * factor,
                height: height * factor,
            },
        }
    }
}

/// The loading volume for one run, in centimeters.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub shape: ContainerShape,
    pub label: Option<String>,
}

impl Container {
    /// Creates a container after validating its shape.
    pub fn new(shape: ContainerShape) -> Result<Self, ValidationError> {
        shape.validate()?;
        Ok(Self { shape, label: None })
    }

    /// Rectangular container from a (length, width, height) triple in cm.
    pub fn rectangular(dims: (f64, f64, f64)) -> Result<Self, ValidationError> {
        Self::new(ContainerShape::Rectangular {
            length: dims.0,
            width: dims.1,
            height: dims.2,
        })
    }

    /// Rectangular container from a triple in the unit named by `unit_tag`.
    pub fn from_units(dims: (f64, f64, f64), unit_tag: &str) -> Result<Self, ValidationError> {
        Self::rectangular(normalize_dims(dims, unit_tag))
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn total_volume(&self) -> f64 {
        self.shape.volume()
    }

    pub fn loading_box(&self) -> Vec3 {
        self.shape.loading_box()
    }
}

impl Dimensional for Container {
    fn dimensions(&self) -> Vec3 {
        self.loading_box()
    }

    fn volume(&self) -> f64 {
        self.total_volume()
    }
}

/// A committed placement. Created once per placed item, never mutated.
///
/// `position` is the minimum corner; `dims` are the extents after applying
/// `orientation`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedItem {
    /// Zero-based placement order within the run.
    pub sequence: usize,
    pub item_id: usize,
    pub position: (f64, f64, f64),
    pub orientation: Orientation,
}

impl PlacedItem {
    pub fn dims(&self) -> (f64, f64, f64) {
        self.orientation.dims.as_tuple()
    }

    /// Whether the item was turned away from its natural orientation.
    pub fn rotated(&self) -> bool {
        self.orientation.rotated
    }

    /// Center point, for renderers that position meshes by their center.
    pub fn center(&self) -> (f64, f64, f64) {
        self.bounding_box().center().as_tuple()
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(Vec3::from_tuple(self.position), self.orientation.dims)
    }
}

impl Positioned for PlacedItem {
    fn position(&self) -> Vec3 {
        Vec3::from_tuple(self.position)
    }
}

impl Dimensional for PlacedItem {
    fn dimensions(&self) -> Vec3 {
        self.orientation.dims
    }
}
