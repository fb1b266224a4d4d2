//! Geographic coordinates and the navigation envelope.
//!
//! Coordinates travel as `[lat, lon]` arrays, matching what the mapping
//! capability reports and what marker files store.

use crate::error::{NonFiniteCoordinateSnafu, Result};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;

/// Fractional digits compared when deciding whether two centers differ.
pub const CENTER_PRECISION: i32 = 6;

/// A finite (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        ensure!(
            lat.is_finite() && lon.is_finite(),
            NonFiniteCoordinateSnafu { lat, lon }
        );
        Ok(Self { lat, lon })
    }

    /// For literals known to be finite.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Whether both components agree at [`CENTER_PRECISION`] fractional digits.
    ///
    /// This is the equality used to suppress redundant re-centering; plain
    /// `==` compares the raw floats.
    pub fn same_position(&self, other: &Coordinate) -> bool {
        fixed(self.lat) == fixed(other.lat) && fixed(self.lon) == fixed(other.lon)
    }
}

fn fixed(value: f64) -> i64 {
    (value * 10f64.powi(CENTER_PRECISION)).round() as i64
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = crate::Error;

    fn try_from([lat, lon]: [f64; 2]) -> Result<Self> {
        Coordinate::new(lat, lon)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lat, coord.lon]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Allowed-navigation envelope for the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Coordinate; 2]", into = "[Coordinate; 2]")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Build an envelope from any two opposite corners.
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        Self {
            south_west: Coordinate {
                lat: a.lat.min(b.lat),
                lon: a.lon.min(b.lon),
            },
            north_east: Coordinate {
                lat: a.lat.max(b.lat),
                lon: a.lon.max(b.lon),
            },
        }
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&coord.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&coord.lon)
    }
}

impl From<[Coordinate; 2]> for Bounds {
    fn from([a, b]: [Coordinate; 2]) -> Self {
        Bounds::new(a, b)
    }
}

impl From<Bounds> for [Coordinate; 2] {
    fn from(bounds: Bounds) -> Self {
        [bounds.south_west, bounds.north_east]
    }
}
