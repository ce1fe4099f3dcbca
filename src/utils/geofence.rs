use crate::model::geofence::GeoFence;
use sqlx::MySqlPool;
use tracing::warn;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two lat/lon points (degrees).
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// True if the point falls inside at least one fence. An empty fence set
/// means no geofencing is configured, which never blocks attendance.
pub fn within_any_fence(fences: &[GeoFence], latitude: f64, longitude: f64) -> bool {
    if fences.is_empty() {
        return true;
    }
    fences.iter().any(|fence| {
        haversine_distance_m(
            latitude,
            longitude,
            fence.center_latitude,
            fence.center_longitude,
        ) <= fence.radius
    })
}

/// Evaluate a location against the active fence set. Callers that can fall
/// back to a previously stored result (check-out) use this directly and
/// handle the error case themselves.
pub async fn evaluate(
    pool: &MySqlPool,
    latitude: f64,
    longitude: f64,
) -> Result<bool, sqlx::Error> {
    let fences = sqlx::query_as::<_, GeoFence>("SELECT * FROM geofences WHERE active = 1")
        .fetch_all(pool)
        .await?;

    Ok(within_any_fence(&fences, latitude, longitude))
}

/// Fence check with the configured error policy applied: a store read
/// failure resolves to `fail_open` instead of surfacing.
pub async fn is_within(pool: &MySqlPool, latitude: f64, longitude: f64, fail_open: bool) -> bool {
    match evaluate(pool, latitude, longitude).await {
        Ok(within) => within,
        Err(e) => {
            warn!(error = %e, "geofence lookup failed, applying fail-open policy");
            fail_open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence(lat: f64, lon: f64, radius: f64) -> GeoFence {
        GeoFence {
            id: "test-fence".to_string(),
            name: "test".to_string(),
            center_latitude: lat,
            center_longitude: lon,
            radius,
            active: true,
            created_at: None,
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let d = haversine_distance_m(23.8103, 90.4125, 23.8103, 90.4125);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn known_distance_dhaka_to_chittagong() {
        // Roughly 214 km apart
        let d = haversine_distance_m(23.8103, 90.4125, 22.3569, 91.7832);
        assert!((200_000.0..230_000.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn fence_center_is_within_for_any_nonnegative_radius() {
        let f = fence(23.8103, 90.4125, 0.0);
        assert!(within_any_fence(&[f], 23.8103, 90.4125));
    }

    #[test]
    fn no_active_fences_means_everywhere_is_within() {
        assert!(within_any_fence(&[], 0.0, 0.0));
        assert!(within_any_fence(&[], 89.9, 179.9));
    }

    #[test]
    fn point_outside_radius_is_rejected() {
        // ~111 m per 0.001 degree of latitude
        let f = fence(23.8103, 90.4125, 50.0);
        assert!(!within_any_fence(&[f], 23.8113, 90.4125));
    }

    #[test]
    fn any_single_matching_fence_is_enough() {
        let far = fence(0.0, 0.0, 10.0);
        let near = fence(23.8103, 90.4125, 500.0);
        assert!(within_any_fence(&[far, near], 23.8104, 90.4126));
    }
}
