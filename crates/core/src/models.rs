use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Structured address components as reported by the geocoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressParts {
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
}

impl AddressParts {
    pub fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
            .filter(|value| !value.is_empty())
    }
}

/// A single geocoder hit before normalization, in provider order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawHit {
    pub id: String,
    pub display_name: String,
    pub coordinate: Coordinate,
    pub importance_score: Option<f64>,
    pub address: Option<AddressParts>,
    pub source_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchCandidate {
    pub id: String,
    pub display_name: String,
    pub coordinate: Coordinate,
    pub distance_km: Option<f64>,
    pub relevance: Option<f64>,
    pub source_type: String,
}

/// What the selection callback receives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedLocation {
    pub coordinate: Coordinate,
    pub label: String,
}

/// A geotagged item offered near a place. `distance_km` is derived and
/// recomputed by the radius filter; it is never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoItem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub coordinate: Coordinate,
    pub place_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl GeoItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        coordinate: Coordinate,
        place_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            coordinate,
            place_name: place_name.into(),
            distance_km: None,
        }
    }

    /// Builds a freshly published item located at a place picked from search.
    pub fn from_selection(
        title: impl Into<String>,
        author: impl Into<String>,
        location: &SelectedLocation,
    ) -> Self {
        Self::new(
            Uuid::new_v4().to_string(),
            title,
            author,
            location.coordinate,
            location.label.clone(),
        )
    }

    /// Distance rounded to one decimal for list display.
    pub fn display_distance_km(&self) -> Option<f64> {
        self.distance_km
            .map(|distance| (distance * 10.0).round() / 10.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Pending,
    Settled,
    Failed,
}

/// The seed catalogue shipped with the app before any item is published.
pub fn sample_items() -> Vec<GeoItem> {
    vec![
        GeoItem::new(
            "1",
            "הארי פוטר ואבן החכמים",
            "ג׳יי קיי רולינג",
            Coordinate::new(32.0853, 34.7818),
            "תל אביב",
        ),
        GeoItem::new(
            "2",
            "שמש קופחת",
            "שרה לוין",
            Coordinate::new(32.7940, 34.9896),
            "חיפה",
        ),
        GeoItem::new(
            "3",
            "אל תספר לאחיך",
            "מאיר שלו",
            Coordinate::new(31.781737, 34.690994),
            "גן יבנה",
        ),
    ]
}
