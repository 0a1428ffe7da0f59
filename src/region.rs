//! Circular query regions.

use crate::utils::format_float;
use geo_types::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Radius used when a region is given without one, in meters.
pub const DEFAULT_RADIUS: f64 = 100.0;

/// A circle on the Earth's surface: a center in degrees and a radius in
/// meters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Circle {
    pub origin: Point<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(lat: f64, lon: f64, radius: f64) -> Self {
        Self {
            origin: Point::new(lon, lat),
            radius,
        }
    }

    pub fn lat(&self) -> f64 {
        self.origin.y()
    }

    pub fn lon(&self) -> f64 {
        self.origin.x()
    }

    /// A circle with the same origin and `factor` times the radius.
    pub fn grow(self, factor: f64) -> Self {
        Self {
            radius: self.radius * factor,
            ..self
        }
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            format_float(self.lat()),
            format_float(self.lon()),
            format_float(self.radius)
        )
    }
}

impl FromStr for Circle {
    type Err = String;

    /// Parse `lat,lon` or `lat,lon,radius`, e.g. `-37.8,144.9,10km`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err("unexpected empty value".to_string());
        }

        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err("invalid number of parts".to_string());
        }

        let lat: f64 = parts[0]
            .parse()
            .map_err(|_| format!("latitude '{}' not recognized", parts[0]))?;
        let lon: f64 = parts[1]
            .parse()
            .map_err(|_| format!("longitude '{}' not recognized", parts[1]))?;
        if !(-85.0..=85.0).contains(&lat) {
            return Err(format!("latitude '{}' not within range", format_float(lat)));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude '{}' not within range", format_float(lon)));
        }

        let radius = match parts.get(2) {
            Some(distance) => parse_distance(distance).map_err(|e| format!("radius {e}"))?,
            None => DEFAULT_RADIUS,
        };

        Ok(Circle::new(lat, lon, radius))
    }
}

impl TryFrom<String> for Circle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Circle> for String {
    fn from(circle: Circle) -> Self {
        circle.to_string()
    }
}

/// Parse a distance such as `250`, `1.5km` or `2 mi` into meters.
pub fn parse_distance(value: &str) -> Result<f64, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number = number.trim();

    let amount: f64 = number
        .parse()
        .map_err(|_| format!("number '{}' not recognized", number))?;
    if amount < 0.0 {
        return Err("must be positive".to_string());
    }

    let meters_per_unit = match unit.to_ascii_lowercase().as_str() {
        "" | "m" => 1.0,
        "km" => 1000.0,
        "mi" => 1609.344,
        "ft" => 0.3048,
        other => return Err(format!("unit '{}' not recognized", other)),
    };

    Ok(amount * meters_per_unit)
}
