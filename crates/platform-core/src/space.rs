//! Coordinate spaces and the values expressed in them.

use std::fmt;
use std::str::FromStr;

use pathreplay_common::error::PathreplayError;
use serde::{Deserialize, Serialize};

/// Coordinate space a position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Units understood by the pointer I/O primitive.
    Logical,
    /// Pixels of a captured frame.
    Physical,
    /// `[0.0, 1.0]` relative to the display rectangle.
    Unit,
}

impl CoordinateSpace {
    pub const ALL: [CoordinateSpace; 3] = [Self::Logical, Self::Physical, Self::Unit];

    /// Stable tag persisted in log headers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Logical => "logical",
            Self::Physical => "physical",
            Self::Unit => "unit",
        }
    }

    /// Column names used for the x/y fields of a log in this space.
    pub fn column_names(&self) -> (&'static str, &'static str) {
        match self {
            Self::Logical => ("logical_x", "logical_y"),
            Self::Physical => ("pixel_x", "pixel_y"),
            Self::Unit => ("norm_x", "norm_y"),
        }
    }

    /// Fixed decimal precision values are written with.
    pub fn decimals(&self) -> usize {
        match self {
            Self::Unit => 8,
            Self::Logical | Self::Physical => 3,
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CoordinateSpace {
    type Err = PathreplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logical" => Ok(Self::Logical),
            "physical" | "pixel" => Ok(Self::Physical),
            "unit" | "normalized" => Ok(Self::Unit),
            other => Err(PathreplayError::config(format!(
                "unknown coordinate space '{other}' (expected logical, physical or unit)"
            ))),
        }
    }
}

/// Width and height of a coordinate extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A 2D position. The space it lives in is carried by its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point in the same space.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Round to the nearest integer pixel, for issuing pointer commands.
    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_tag_roundtrips_through_from_str() {
        for space in CoordinateSpace::ALL {
            assert_eq!(space.tag().parse::<CoordinateSpace>().unwrap(), space);
        }
        assert!("furlongs".parse::<CoordinateSpace>().is_err());
    }

    #[test]
    fn space_serializes_as_tag() {
        let json = serde_json::to_string(&CoordinateSpace::Unit).unwrap();
        assert_eq!(json, "\"unit\"");
    }

    #[test]
    fn unit_columns_match_legacy_names() {
        assert_eq!(CoordinateSpace::Unit.column_names(), ("norm_x", "norm_y"));
        assert_eq!(CoordinateSpace::Unit.decimals(), 8);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(Point::new(959.5, 539.4).rounded(), (960, 539));
    }
}
