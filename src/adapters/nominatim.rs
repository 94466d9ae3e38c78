use crate::config::toml_config::GeocoderConfig;
use crate::domain::model::{GeoCandidate, LatLon, ReverseAddress};
use crate::domain::ports::{ForwardGeocoder, ReverseGeocoder};
use crate::utils::error::{FenceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Nominatim search hit; coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddressFields>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddressFields {
    #[serde(default)]
    postcode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    country_codes: String,
    timeout: Option<Duration>,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
            timeout: config.timeout_seconds.map(Duration::from_secs),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(format!("{}/{}", self.base_url, path));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }
}

#[async_trait]
impl ForwardGeocoder for NominatimClient {
    async fn search_postcode(&self, postcode: &str) -> Result<Vec<GeoCandidate>> {
        tracing::debug!("Nominatim search for postcode '{}'", postcode);
        let response = self
            .get("search")
            .query(&[
                ("format", "json"),
                ("addressdetails", "1"),
                ("countrycodes", self.country_codes.as_str()),
                ("limit", "1"),
                ("postalcode", postcode),
            ])
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!("Nominatim search status: {}", response.status());

        let hits: Vec<SearchHit> = response.json().await?;
        hits.into_iter()
            .map(|hit| {
                let lat = parse_coordinate("lat", &hit.lat)?;
                let lon = parse_coordinate("lon", &hit.lon)?;
                Ok(GeoCandidate {
                    position: LatLon::new(lat, lon),
                    display_label: hit.display_name.unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, at: LatLon) -> Result<ReverseAddress> {
        tracing::debug!("Nominatim reverse lookup at {}", at);
        let response = self
            .get("reverse")
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", at.lat.to_string()),
                ("lon", at.lon.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ReverseResponse = response.json().await?;
        let postcode = body
            .address
            .and_then(|address| address.postcode)
            .map(|postcode| postcode.to_uppercase());
        Ok(ReverseAddress { postcode })
    }
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| FenceError::GeocodeError {
            message: format!("Invalid {} '{}' in geocoder response: {}", field, raw, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", "51.4613").unwrap(), 51.4613);
        assert_eq!(parse_coordinate("lon", " -0.1386 ").unwrap(), -0.1386);
        assert!(parse_coordinate("lat", "north").is_err());
    }

    #[test]
    fn test_reverse_response_without_address() {
        let body: ReverseResponse = serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(body.address.is_none());

        let body: ReverseResponse =
            serde_json::from_str(r#"{"address":{"road":"Clapham High St"}}"#).unwrap();
        assert!(body.address.unwrap().postcode.is_none());
    }
}
