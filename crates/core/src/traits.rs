use crate::{Coordinate, GeocodeError, PositionError, RawHit};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GeocodeRequest {
    pub query: String,
    pub country_filter: Option<String>,
    pub limit: usize,
    pub language: Option<String>,
}

impl GeocodeRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            country_filter: None,
            limit,
            language: None,
        }
    }
}

/// One outbound lookup per call, no retries.
#[async_trait]
pub trait Geocoder {
    async fn fetch(&self, request: &GeocodeRequest) -> Result<Vec<RawHit>, GeocodeError>;
}

#[async_trait]
pub trait PositionProvider {
    async fn current_position(&self) -> Result<Coordinate, PositionError>;
}
