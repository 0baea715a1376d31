use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use url::Url;

use crate::geo::{Coordinates, GeoError, Geocoder, haversine_km};

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
// Nominatim's usage policy rejects anonymous clients
const USER_AGENT: &str = "edikt-watch/0.1 (distance lookup)";

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim lookup restricted to Austria.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
    origin: String,
    origin_coordinates: OnceCell<Coordinates>,
}

impl NominatimGeocoder {
    pub fn new(endpoint: Url, origin: impl Into<String>) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(8))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            origin: origin.into(),
            origin_coordinates: OnceCell::new(),
        })
    }

    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeoError> {
        let query = format!("{location}, Austria");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", query.as_str()),
                ("format", "jsonv2"),
                ("limit", "1"),
                ("addressdetails", "0"),
                ("countrycodes", "at"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::Status(response.status()));
        }

        let places: Vec<Place> = response.json().await?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::NotFound(query.clone()))?;

        let coordinates = Coordinates {
            lat: parse_degrees(&place.lat)?,
            lon: parse_degrees(&place.lon)?,
        };
        debug!(?coordinates, "geocoded");
        Ok(coordinates)
    }
}

fn parse_degrees(raw: &str) -> Result<f64, GeoError> {
    raw.trim()
        .parse()
        .map_err(|_| GeoError::Coordinate(raw.to_string()))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn distance_km(&self, location: &str) -> Result<u32, GeoError> {
        let origin = *self
            .origin_coordinates
            .get_or_try_init(|| self.geocode(&self.origin))
            .await?;
        let target = self.geocode(location).await?;

        Ok(haversine_km(target, origin) as u32)
    }
}
