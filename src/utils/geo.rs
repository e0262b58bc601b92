/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_bree_to_pretoria() {
        // Bree Street taxi rank, Johannesburg
        let bree = (-26.2005, 28.0383);
        // Bloed Street taxi rank, Pretoria
        let bloed = (-25.7410, 28.1880);

        let distance = haversine_distance(bree.0, bree.1, bloed.0, bloed.1);
        // Should be roughly 50-55 km
        assert!(distance > 45.0 && distance < 60.0);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert!(haversine_distance(-26.2, 28.0, -26.2, 28.0) < 1e-9);
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(is_valid_coordinate(-26.2, 28.0));
        assert!(!is_valid_coordinate(-91.0, 28.0));
        assert!(!is_valid_coordinate(0.0, 181.0));
    }
}
