use crate::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers using the haversine formula.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceLocale {
    #[default]
    English,
    Hebrew,
}

impl DistanceLocale {
    fn meters_suffix(self) -> &'static str {
        match self {
            Self::English => "m",
            Self::Hebrew => "מ'",
        }
    }

    fn kilometers_suffix(self) -> &'static str {
        match self {
            Self::English => "km",
            Self::Hebrew => "ק\"מ",
        }
    }
}

/// Renders a distance for display: meters below 1 km, one decimal below
/// 10 km, whole kilometers above.
pub fn format_distance(distance_km: f64, locale: DistanceLocale) -> String {
    if distance_km < 1.0 {
        format!("{} {}", (distance_km * 1000.0).round(), locale.meters_suffix())
    } else if distance_km < 10.0 {
        format!("{distance_km:.1} {}", locale.kilometers_suffix())
    } else {
        format!("{} {}", distance_km.round(), locale.kilometers_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn distance_to_self_is_zero() {
        let points = [
            Coordinate::new(32.0853, 34.7818),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(89.9, -179.9),
            Coordinate::new(0.0, 0.0),
        ];
        for point in points {
            assert!(haversine_km(point, point).abs() < TOLERANCE);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (Coordinate::new(32.0853, 34.7818), Coordinate::new(32.7940, 34.9896)),
            (Coordinate::new(51.5074, -0.1278), Coordinate::new(40.7128, -74.0060)),
            (Coordinate::new(-45.0, 170.0), Coordinate::new(45.0, -170.0)),
        ];
        for (a, b) in pairs {
            assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < TOLERANCE);
        }
    }

    #[test]
    fn known_city_distance() {
        let tel_aviv = Coordinate::new(32.0853, 34.7818);
        let haifa = Coordinate::new(32.7940, 34.9896);
        let distance = haversine_km(tel_aviv, haifa);
        assert!((distance - 81.0).abs() < 2.0, "got {distance}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let distance = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((distance - 111.19).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn formatting_switches_units() {
        assert_eq!(format_distance(0.45, DistanceLocale::English), "450 m");
        assert_eq!(format_distance(3.2, DistanceLocale::English), "3.2 km");
        assert_eq!(format_distance(42.0, DistanceLocale::English), "42 km");
        assert_eq!(format_distance(1.0, DistanceLocale::English), "1.0 km");
        assert_eq!(format_distance(10.4, DistanceLocale::English), "10 km");
    }

    #[test]
    fn formatting_uses_locale_suffix() {
        assert_eq!(format_distance(0.45, DistanceLocale::Hebrew), "450 מ'");
        assert_eq!(format_distance(42.0, DistanceLocale::Hebrew), "42 ק\"מ");
    }
}
