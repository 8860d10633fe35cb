use crate::options::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::traits::{GeocodeRequest, Geocoder};
use crate::{Coordinate, GeocodeError, RawHit};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const MAPBOX_ENDPOINT: &str = "https://api.mapbox.com";
const PROVIDER: &str = "mapbox";

/// Mapbox place autocomplete (`mapbox.places`).
pub struct MapboxGeocoder {
    client: Client,
    endpoint: String,
    access_token: String,
    timeout: Duration,
}

impl MapboxGeocoder {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn places_url(&self, request: &GeocodeRequest) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&format!("{}/geocoding/v5/mapbox.places", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|()| GeocodeError::InvalidRequest(format!("{} cannot be a base", self.endpoint)))?
            .push(&format!("{}.json", request.query));
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("access_token", &self.access_token)
                .append_pair("autocomplete", "true")
                .append_pair("limit", &request.limit.to_string());
            if let Some(country) = &request.country_filter {
                pairs.append_pair("country", country);
            }
            if let Some(language) = &request.language {
                pairs.append_pair("language", language);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn fetch(&self, request: &GeocodeRequest) -> Result<Vec<RawHit>, GeocodeError> {
        let url = self.places_url(request)?;
        debug!(query = %request.query, "mapbox places search");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Network(format!(
                "{PROVIDER} responded with {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_features(&body)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    place_name: String,
    /// `[longitude, latitude]`
    center: [f64; 2],
    #[serde(default)]
    relevance: Option<f64>,
    #[serde(default)]
    place_type: Vec<String>,
}

/// Parses a Mapbox places body. A collection without `features` is empty.
pub fn parse_features(body: &str) -> Result<Vec<RawHit>, GeocodeError> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|error| GeocodeError::malformed(PROVIDER, error.to_string()))?;

    Ok(collection
        .features
        .into_iter()
        .map(|feature| RawHit {
            id: feature.id,
            display_name: feature.place_name,
            coordinate: Coordinate::new(feature.center[1], feature.center[0]),
            importance_score: feature.relevance,
            address: None,
            source_type: feature.place_type.into_iter().next().unwrap_or_default(),
        })
        .collect())
}
