use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Valid longitude range in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
/// Valid latitude range in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Which half of a coordinate pair a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Longitude => write!(f, "longitude"),
            Axis::Latitude => write!(f, "latitude"),
        }
    }
}

/// Rejection reason for a coordinate pair
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCoordinate {
    #[error("{axis} {value:?} is not a number")]
    NotANumber { axis: Axis, value: String },

    #[error("{axis} {value} is not finite")]
    NonFinite { axis: Axis, value: f64 },

    #[error("{axis} {value} is outside [{min}, {max}]")]
    OutOfRange { axis: Axis, value: f64, min: f64, max: f64 },
}

/// A single stop on the simulated path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    /// Longitude in degrees
    lon: f64,
    /// Latitude in degrees
    lat: f64,
}

impl Waypoint {
    /// Create a waypoint, rejecting non-finite or out-of-range values
    pub fn new(lon: f64, lat: f64) -> Result<Self, InvalidCoordinate> {
        let lon = check_axis(Axis::Longitude, lon)?;
        let lat = check_axis(Axis::Latitude, lat)?;
        Ok(Self { lon, lat })
    }

    /// Parse a waypoint from textual longitude and latitude fields
    pub fn parse(lon: &str, lat: &str) -> Result<Self, InvalidCoordinate> {
        let lon = parse_axis(Axis::Longitude, lon)?;
        let lat = parse_axis(Axis::Latitude, lat)?;
        Self::new(lon, lat)
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// `[lon, lat]` in GeoJSON position order
    pub fn position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

fn parse_axis(axis: Axis, raw: &str) -> Result<f64, InvalidCoordinate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidCoordinate::NotANumber { axis, value: raw.to_string() });
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| InvalidCoordinate::NotANumber { axis, value: raw.to_string() })
}

fn check_axis(axis: Axis, value: f64) -> Result<f64, InvalidCoordinate> {
    if !value.is_finite() {
        return Err(InvalidCoordinate::NonFinite { axis, value });
    }

    let (min, max) = match axis {
        Axis::Longitude => LONGITUDE_RANGE,
        Axis::Latitude => LATITUDE_RANGE,
    };
    if value < min || value > max {
        return Err(InvalidCoordinate::OutOfRange { axis, value, min, max });
    }

    Ok(value)
}
