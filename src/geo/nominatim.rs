//! Reverse geocoding against a Nominatim-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::models::order::GeoPoint;

/// Resolves a coordinate pair to a human-readable place name.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, point: GeoPoint) -> Result<String, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
}

impl ReverseResponse {
    fn place_name(self) -> Option<String> {
        let address = self.address.unwrap_or_default();
        [
            address.city,
            address.town,
            address.village,
            address.municipality,
            address.county,
            self.display_name,
        ]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
    }
}

pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn reverse(&self, point: GeoPoint) -> Result<String, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);

        tracing::debug!(lat = point.lat, lon = point.lng, "reverse geocoding");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lng.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::Timeout
            } else {
                GeocodeError::Malformed(e.to_string())
            }
        })?;

        body.place_name()
            .ok_or_else(|| GeocodeError::Malformed("no place name in response".to_string()))
    }
}

fn request_error(err: reqwest::Error) -> GeocodeError {
    if err.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ReverseResponse;

    fn parse(body: &str) -> Option<String> {
        serde_json::from_str::<ReverseResponse>(body)
            .unwrap()
            .place_name()
    }

    #[test]
    fn city_wins_over_smaller_units() {
        let body = r#"{"address": {"town": "Taytay", "city": "Pasig", "county": "Rizal"}, "display_name": "x"}"#;
        assert_eq!(parse(body).as_deref(), Some("Pasig"));
    }

    #[test]
    fn falls_through_address_levels_in_order() {
        assert_eq!(parse(r#"{"address": {"village": "Bagong Silang", "county": "Rizal"}}"#).as_deref(), Some("Bagong Silang"));
        assert_eq!(parse(r#"{"address": {"municipality": "Rodriguez", "county": "Rizal"}}"#).as_deref(), Some("Rodriguez"));
        assert_eq!(parse(r#"{"address": {"county": "Rizal"}}"#).as_deref(), Some("Rizal"));
    }

    #[test]
    fn display_name_is_the_last_resort() {
        assert_eq!(
            parse(r#"{"address": {"road": "EDSA"}, "display_name": "EDSA, Metro Manila"}"#).as_deref(),
            Some("EDSA, Metro Manila")
        );
        assert_eq!(parse(r#"{"error": "Unable to geocode"}"#), None);
    }
}
