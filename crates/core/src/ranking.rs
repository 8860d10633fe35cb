use crate::{Coordinate, SearchCandidate};
use std::cmp::Ordering;

/// Which field orders the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    /// Nearest first; candidates without a distance sink to the end.
    Distance,
    /// Highest relevance first; missing relevance counts as 0.
    Relevance,
}

impl RankKey {
    pub fn for_reference(reference: Option<Coordinate>) -> Self {
        if reference.is_some() {
            Self::Distance
        } else {
            Self::Relevance
        }
    }

    pub fn compare(self, left: &SearchCandidate, right: &SearchCandidate) -> Ordering {
        match self {
            Self::Distance => left
                .distance_km
                .unwrap_or(f64::INFINITY)
                .total_cmp(&right.distance_km.unwrap_or(f64::INFINITY)),
            Self::Relevance => right
                .relevance
                .unwrap_or(0.0)
                .total_cmp(&left.relevance.unwrap_or(0.0)),
        }
    }
}

/// Orders candidates by distance when a reference position exists, else by
/// relevance. Stable: equal keys keep provider order.
pub fn rank(
    mut candidates: Vec<SearchCandidate>,
    reference: Option<Coordinate>,
) -> Vec<SearchCandidate> {
    let key = RankKey::for_reference(reference);
    candidates.sort_by(|left, right| key.compare(left, right));
    candidates
}
