use crate::distance::haversine_km;
use crate::options::RadiusSetting;
use crate::{Coordinate, GeoItem};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusFilterEngine;

impl RadiusFilterEngine {
    /// Annotates every item with its distance from `reference` and keeps the
    /// ones with `distance_km <= radius_km`. Without a reference position the
    /// items pass through unfiltered with no distance attached.
    pub fn apply(
        &self,
        items: &[GeoItem],
        reference: Option<Coordinate>,
        radius_km: f64,
    ) -> Vec<GeoItem> {
        let Some(origin) = reference else {
            return items
                .iter()
                .cloned()
                .map(|mut item| {
                    item.distance_km = None;
                    item
                })
                .collect();
        };

        items
            .iter()
            .filter_map(|item| {
                let distance = haversine_km(origin, item.coordinate);
                (distance <= radius_km).then(|| GeoItem {
                    distance_km: Some(distance),
                    ..item.clone()
                })
            })
            .collect()
    }
}

/// Item collection shown on the map and list. Any change to the items, the
/// reference position or the radius triggers a full recompute.
#[derive(Debug, Clone, Default)]
pub struct NearbyFeed {
    engine: RadiusFilterEngine,
    items: Vec<GeoItem>,
    reference: Option<Coordinate>,
    radius: RadiusSetting,
    visible: Vec<GeoItem>,
}

impl NearbyFeed {
    pub fn new(items: Vec<GeoItem>, radius: RadiusSetting) -> Self {
        let mut feed = Self {
            items,
            radius,
            ..Default::default()
        };
        feed.recompute();
        feed
    }

    pub fn set_reference(&mut self, reference: Option<Coordinate>) {
        self.reference = reference;
        self.recompute();
    }

    pub fn set_radius(&mut self, radius: RadiusSetting) {
        self.radius = radius;
        self.recompute();
    }

    pub fn set_items(&mut self, items: Vec<GeoItem>) {
        self.items = items;
        self.recompute();
    }

    /// Adds a newly published item ahead of the existing ones.
    pub fn publish(&mut self, item: GeoItem) {
        self.items.insert(0, item);
        self.recompute();
    }

    pub fn radius(&self) -> RadiusSetting {
        self.radius
    }

    pub fn reference(&self) -> Option<Coordinate> {
        self.reference
    }

    pub fn items(&self) -> &[GeoItem] {
        &self.items
    }

    pub fn visible(&self) -> &[GeoItem] {
        &self.visible
    }

    fn recompute(&mut self) {
        self.visible = self
            .engine
            .apply(&self.items, self.reference, self.radius.km());
        debug!(
            total = self.items.len(),
            visible = self.visible.len(),
            radius_km = self.radius.km(),
            has_reference = self.reference.is_some(),
            "recomputed nearby items"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_items;

    const REFERENCE: Coordinate = Coordinate::new(32.0, 34.0);

    /// Point due north of the reference at the given great-circle distance.
    fn north_of_reference(distance_km: f64) -> Coordinate {
        let degrees = (distance_km / crate::distance::EARTH_RADIUS_KM).to_degrees();
        Coordinate::new(REFERENCE.latitude + degrees, REFERENCE.longitude)
    }

    fn item_at(id: &str, distance_km: f64) -> GeoItem {
        GeoItem::new(id, "title", "author", north_of_reference(distance_km), "place")
    }

    #[test]
    fn boundary_is_inclusive() {
        let items = vec![
            item_at("2", 2.0),
            item_at("9.9", 9.9),
            // On the boundary, nudged inside the float error of the round trip.
            item_at("10.0", 10.0 - 1e-9),
            item_at("10.1", 10.1),
            item_at("50", 50.0),
        ];

        let kept = RadiusFilterEngine.apply(&items, Some(REFERENCE), 10.0);
        let ids: Vec<&str> = kept.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "9.9", "10.0"]);
        for item in &kept {
            let distance = item.distance_km.expect("distance attached");
            assert!((0.0..=10.0).contains(&distance));
        }
    }

    #[test]
    fn item_exactly_at_radius_is_kept() {
        let item = GeoItem::new("edge", "t", "a", Coordinate::new(32.4, 34.9), "edge");
        let radius_km = haversine_km(REFERENCE, item.coordinate);

        let kept = RadiusFilterEngine.apply(&[item], Some(REFERENCE), radius_km);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].distance_km, Some(radius_km));
    }

    #[test]
    fn zero_radius_keeps_items_at_the_reference() {
        let item = GeoItem::new("same", "t", "a", REFERENCE, "here");
        let kept = RadiusFilterEngine.apply(&[item], Some(REFERENCE), 0.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].distance_km, Some(0.0));
    }

    #[test]
    fn without_reference_everything_passes_unannotated() {
        let mut items = sample_items();
        items[0].distance_km = Some(3.0);

        let kept = RadiusFilterEngine.apply(&items, None, 1.0);
        assert_eq!(kept.len(), items.len());
        assert!(kept.iter().all(|item| item.distance_km.is_none()));
    }

    #[test]
    fn output_is_subset_in_input_order() {
        let items = sample_items();
        let tel_aviv = items[0].coordinate;
        let kept = RadiusFilterEngine.apply(&items, Some(tel_aviv), 60.0);

        let ids: Vec<&str> = kept.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn feed_recomputes_on_every_change() {
        let mut feed = NearbyFeed::new(sample_items(), RadiusSetting::new(10));
        assert_eq!(feed.visible().len(), 3);

        let tel_aviv = feed.items()[0].coordinate;
        feed.set_reference(Some(tel_aviv));
        assert_eq!(feed.visible().len(), 1);

        feed.set_radius(RadiusSetting::new(100));
        assert_eq!(feed.visible().len(), 3);

        let mut published = GeoItem::new(
            "new",
            "t",
            "a",
            Coordinate::new(31.2518, 34.7913),
            "Beersheba",
        );
        published.distance_km = Some(0.0);
        feed.publish(published);
        assert_eq!(feed.items()[0].id, "new");
        assert_eq!(feed.visible().len(), 4);
        assert_eq!(feed.visible()[0].id, "new");
        assert!(feed.visible()[0]
            .distance_km
            .is_some_and(|distance| distance > 80.0));

        feed.set_radius(RadiusSetting::new(50));
        let ids: Vec<&str> = feed.visible().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
