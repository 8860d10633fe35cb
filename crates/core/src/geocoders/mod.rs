pub mod mapbox;
pub mod nominatim;

pub use mapbox::{MapboxGeocoder, MAPBOX_ENDPOINT};
pub use nominatim::{NominatimGeocoder, NOMINATIM_ENDPOINT};
