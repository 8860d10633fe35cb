use crate::options::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::traits::{GeocodeRequest, Geocoder};
use crate::{AddressParts, Coordinate, GeocodeError, RawHit};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
const PROVIDER: &str = "nominatim";

pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    user_agent: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            user_agent: format!("nearby-search/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn search_url(&self, request: &GeocodeRequest) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&format!("{}/search", self.endpoint))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &request.query)
                .append_pair("format", "json")
                .append_pair("addressdetails", "1")
                .append_pair("limit", &request.limit.to_string());
            if let Some(country) = &request.country_filter {
                pairs.append_pair("countrycodes", country);
            }
            if let Some(language) = &request.language {
                pairs.append_pair("accept-language", language);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn fetch(&self, request: &GeocodeRequest) -> Result<Vec<RawHit>, GeocodeError> {
        let url = self.search_url(request)?;
        debug!(%url, "nominatim search");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
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
        parse_places(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: Value,
    display_name: String,
    lat: Value,
    lon: Value,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    importance: Option<f64>,
    #[serde(default)]
    address: Option<AddressParts>,
}

/// Parses a Nominatim `format=json` search body into raw hits.
pub fn parse_places(body: &str) -> Result<Vec<RawHit>, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|error| GeocodeError::malformed(PROVIDER, error.to_string()))?;

    places.into_iter().map(into_raw_hit).collect()
}

fn into_raw_hit(place: NominatimPlace) -> Result<RawHit, GeocodeError> {
    let id = match &place.place_id {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        other => {
            return Err(GeocodeError::malformed(
                PROVIDER,
                format!("unexpected place_id {other}"),
            ))
        }
    };

    let latitude = parse_degrees(&place.lat, "lat")?;
    let longitude = parse_degrees(&place.lon, "lon")?;

    Ok(RawHit {
        id,
        display_name: place.display_name,
        coordinate: Coordinate::new(latitude, longitude),
        importance_score: place.importance,
        address: place.address,
        source_type: place.kind.unwrap_or_default(),
    })
}

// Nominatim sends coordinates as strings; accept plain numbers too.
fn parse_degrees(value: &Value, field: &str) -> Result<f64, GeocodeError> {
    let parsed = match value {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };

    parsed
        .filter(|degrees| degrees.is_finite())
        .ok_or_else(|| GeocodeError::malformed(PROVIDER, format!("invalid {field}: {value}")))
}
