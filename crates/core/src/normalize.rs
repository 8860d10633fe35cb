use crate::distance::haversine_km;
use crate::{AddressParts, Coordinate, RawHit, SearchCandidate};

/// Short label built from address parts: "road house_number" or "road",
/// then the locality. Falls back to the provider's full display string.
pub fn synthesize_label(display_name: &str, address: Option<&AddressParts>) -> String {
    let Some(address) = address else {
        return display_name.to_string();
    };

    let mut parts = Vec::with_capacity(2);
    match (non_empty(&address.road), non_empty(&address.house_number)) {
        (Some(road), Some(number)) => parts.push(format!("{road} {number}")),
        (Some(road), None) => parts.push(road.to_string()),
        _ => {}
    }
    if let Some(locality) = address.locality() {
        parts.push(locality.to_string());
    }

    if parts.is_empty() {
        display_name.to_string()
    } else {
        parts.join(", ")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

pub fn normalize_hit(hit: RawHit, reference: Option<Coordinate>) -> SearchCandidate {
    let display_name = synthesize_label(&hit.display_name, hit.address.as_ref());
    SearchCandidate {
        distance_km: reference.map(|origin| haversine_km(origin, hit.coordinate)),
        id: hit.id,
        display_name,
        coordinate: hit.coordinate,
        relevance: hit.importance_score,
        source_type: hit.source_type,
    }
}

pub fn normalize_hits(hits: Vec<RawHit>, reference: Option<Coordinate>) -> Vec<SearchCandidate> {
    hits.into_iter()
        .map(|hit| normalize_hit(hit, reference))
        .collect()
}
