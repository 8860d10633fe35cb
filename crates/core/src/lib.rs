pub mod controller;
pub mod debounce;
pub mod distance;
pub mod error;
pub mod geocoders;
pub mod models;
pub mod normalize;
pub mod options;
pub mod position;
pub mod radius;
pub mod ranking;
pub mod traits;

pub use controller::{
    ControllerEvent, GeocodeResponse, ProximitySearchController, ResultsView, SearchSession,
    SearchSnapshot, SelectionHandler,
};
pub use debounce::{QueryDebouncer, SettledInput};
pub use distance::{format_distance, haversine_km, DistanceLocale, EARTH_RADIUS_KM};
pub use error::{GeocodeError, PositionError};
pub use geocoders::{MapboxGeocoder, NominatimGeocoder, MAPBOX_ENDPOINT, NOMINATIM_ENDPOINT};
pub use models::{
    sample_items, AddressParts, Coordinate, GeoItem, RawHit, SearchCandidate, SearchStatus,
    SelectedLocation,
};
pub use normalize::{normalize_hit, normalize_hits, synthesize_label};
pub use options::{RadiusSetting, SearchOptions};
pub use position::{resolve_reference_position, StaticPosition};
pub use radius::{NearbyFeed, RadiusFilterEngine};
pub use ranking::{rank, RankKey};
pub use traits::{GeocodeRequest, Geocoder, PositionProvider};
