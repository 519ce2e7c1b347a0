use crate::geo::geometry::GeometryIndex;
use crate::types::{LatLon, Neighbor};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Search radius used when none is given.
pub const DEFAULT_RADIUS_MILES: f64 = 5.0;

/// Great-circle distance between two points, in miles (haversine formula).
pub fn haversine_miles(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Every zip whose centroid lies within `radius_miles` of `zip`'s centroid,
/// nearest first. `zip` itself is always the first entry, even for a
/// negative or NaN radius.
///
/// Returns `None` when `zip` has no geometry.
pub fn neighboring_zips(index: &GeometryIndex, zip: &str, radius_miles: f64) -> Option<Vec<Neighbor>> {
    let origin = index.centroid(zip)?;

    let mut neighbors: Vec<Neighbor> = index
        .iter()
        .map(|g| Neighbor {
            zip: g.zip.clone(),
            distance_miles: if g.zip == zip {
                0.0
            } else {
                haversine_miles(origin, g.centroid)
            },
        })
        .filter(|n| n.zip == zip || n.distance_miles <= radius_miles)
        .collect();

    neighbors.sort_by(|a, b| {
        a.distance_miles
            .total_cmp(&b.distance_miles)
            .then_with(|| a.zip.cmp(&b.zip))
    });

    Some(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> GeometryIndex {
        let features: Vec<_> = [
            ("07305", -74.08, 40.70),
            ("07304", -74.07, 40.72),
            ("07002", -74.12, 40.67),
            ("10001", -73.99, 40.75),
            ("08540", -74.66, 40.35),
        ]
        .iter()
        .map(|(zip, lon, lat)| {
            json!({
                "type": "Feature",
                "properties": { "ZCTA5CE10": zip },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lon - 0.01, lat - 0.01],
                        [lon + 0.01, lat - 0.01],
                        [lon + 0.01, lat + 0.01],
                        [lon - 0.01, lat + 0.01],
                        [lon - 0.01, lat - 0.01],
                    ]]
                }
            })
        })
        .collect();
        let source = json!({ "type": "FeatureCollection", "features": features }).to_string();
        GeometryIndex::from_geojson([source.as_str()], "ZCTA5CE10").unwrap()
    }

    #[test]
    fn test_haversine_known_distance() {
        // JFK to LAX is about 2475 miles
        let jfk = LatLon::new(40.6413, -73.7781);
        let lax = LatLon::new(33.9416, -118.4085);
        let d = haversine_miles(jfk, lax);
        assert!((d - 2475.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let a = LatLon::new(40.70, -74.08);
        let b = LatLon::new(40.75, -73.99);
        assert_eq!(haversine_miles(a, b), haversine_miles(b, a));
        assert_eq!(haversine_miles(a, a), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_shrinks_with_latitude() {
        let equator = haversine_miles(LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0));
        let north = haversine_miles(LatLon::new(60.0, 0.0), LatLon::new(60.0, 1.0));
        assert!((north / equator - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_neighbors_within_radius() {
        let neighbors = neighboring_zips(&index(), "07305", DEFAULT_RADIUS_MILES).unwrap();
        let zips: Vec<_> = neighbors.iter().map(|n| n.zip.as_str()).collect();

        assert_eq!(zips, vec!["07305", "07304", "07002"]);
        assert_eq!(neighbors[0].distance_miles, 0.0);
        assert!(neighbors.iter().all(|n| n.distance_miles <= 5.0));
    }

    #[test]
    fn test_neighbors_excludes_distant_zips() {
        let index = index();
        let neighbors = neighboring_zips(&index, "07305", DEFAULT_RADIUS_MILES).unwrap();

        assert!(!neighbors.iter().any(|n| n.zip == "10001"));
        assert!(!neighbors.iter().any(|n| n.zip == "08540"));

        let far = haversine_miles(
            index.centroid("07305").unwrap(),
            index.centroid("10001").unwrap(),
        );
        assert!(far > 5.0);
    }

    #[test]
    fn test_unknown_zip() {
        assert!(neighboring_zips(&index(), "99999", DEFAULT_RADIUS_MILES).is_none());
    }

    #[test]
    fn test_zero_radius_returns_self() {
        let neighbors = neighboring_zips(&index(), "08540", 0.0).unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].zip, "08540");
    }

    #[test]
    fn test_invalid_radius_still_returns_self() {
        let index = index();
        for radius in [-1.0, f64::NAN] {
            let neighbors = neighboring_zips(&index, "07305", radius).unwrap();
            assert_eq!(neighbors.len(), 1, "radius {radius}");
            assert_eq!(neighbors[0].zip, "07305");
            assert_eq!(neighbors[0].distance_miles, 0.0);
        }
    }
}
