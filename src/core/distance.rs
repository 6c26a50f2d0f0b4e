use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two points in kilometers
#[inline]
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Smallest box containing every point, `None` when there are no points
pub fn bounding_box<'a, I>(points: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    points.into_iter().fold(None, |bbox, p| {
        Some(match bbox {
            None => BoundingBox {
                min_lat: p.latitude,
                max_lat: p.latitude,
                min_lon: p.longitude,
                max_lon: p.longitude,
            },
            Some(b) => BoundingBox {
                min_lat: b.min_lat.min(p.latitude),
                max_lat: b.max_lat.max(p.latitude),
                min_lon: b.min_lon.min(p.longitude),
                max_lon: b.max_lon.max(p.longitude),
            },
        })
    })
}

/// Mean latitude/longitude of the points
///
/// Plain coordinate averaging. Good enough at city scale, wrong across the
/// antimeridian.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let (count, lat_sum, lon_sum) = points
        .into_iter()
        .fold((0usize, 0.0, 0.0), |(n, lat, lon), p| {
            (n + 1, lat + p.latitude, lon + p.longitude)
        });

    if count == 0 {
        return None;
    }

    Some(GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Dhaka to Sylhet, roughly 190 km in a straight line
        let (dhaka_lat, dhaka_lon) = (23.8103, 90.4125);
        let (sylhet_lat, sylhet_lon) = (24.8949, 91.8687);

        let distance = haversine_distance(dhaka_lat, dhaka_lon, sylhet_lat, sylhet_lon);
        assert!((distance - 190.0).abs() < 8.0, "expected ~190 km, got {}", distance);
    }

    #[test]
    fn test_distance_within_dhaka() {
        // Mirpur 10 to Dhanmondi 27 is roughly 6 km
        let mirpur = GeoPoint::new(23.8069, 90.3687);
        let dhanmondi = GeoPoint::new(23.7561, 90.3742);

        let distance = distance_km(&mirpur, &dhanmondi);
        assert!(distance > 5.0 && distance < 7.0, "got {}", distance);
        assert!(distance_km(&mirpur, &mirpur) < 1e-9);
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            GeoPoint::new(23.80, 90.36),
            GeoPoint::new(23.75, 90.41),
            GeoPoint::new(23.87, 90.39),
        ];

        let bbox = bounding_box(&points).unwrap();
        assert_eq!(bbox.min_lat, 23.75);
        assert_eq!(bbox.max_lat, 23.87);
        assert_eq!(bbox.min_lon, 90.36);
        assert_eq!(bbox.max_lon, 90.41);

        let empty: [GeoPoint; 0] = [];
        assert!(bounding_box(&empty).is_none());
    }

    #[test]
    fn test_centroid() {
        let points = [GeoPoint::new(10.0, 20.0), GeoPoint::new(20.0, 40.0)];

        let center = centroid(&points).unwrap();
        assert!((center.latitude - 15.0).abs() < 1e-9);
        assert!((center.longitude - 30.0).abs() < 1e-9);

        let empty: [GeoPoint; 0] = [];
        assert!(centroid(&empty).is_none());
    }
}
