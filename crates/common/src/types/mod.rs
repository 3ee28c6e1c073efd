use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
}

/// WGS84 position in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const NORTH_POLE: GeoPoint = GeoPoint { longitude: 0.0, latitude: 90.0 };

    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        Ok(Self { longitude, latitude })
    }

    /// Fill omitted coordinates from the north pole (latitude 90, longitude 0).
    pub fn or_north_pole(longitude: Option<f64>, latitude: Option<f64>) -> Result<Self, CoordinateError> {
        Self::new(
            longitude.unwrap_or(Self::NORTH_POLE.longitude),
            latitude.unwrap_or(Self::NORTH_POLE.latitude),
        )
    }
}

impl Default for GeoPoint {
    fn default() -> Self { Self::NORTH_POLE }
}
