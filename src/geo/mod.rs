//! Distance lookup for a notice's postal code/city.

pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("no geocoding result for {0:?}")]
    NotFound(String),

    #[error("invalid coordinate {0:?}")]
    Coordinate(String),

    #[error("geocoding disabled")]
    Disabled,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Whole kilometres between `location` and the geocoder's origin.
    async fn distance_km(&self, location: &str) -> Result<u32, GeoError>;
}

/// Geocoder for runs without network lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn distance_km(&self, _location: &str) -> Result<u32, GeoError> {
        Err(GeoError::Disabled)
    }
}

/// A point in WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance using the mean Earth radius.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
