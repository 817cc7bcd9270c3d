// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Point-to-point geodesic distance.
//!
//! Distances are great-circle (haversine) kilometres on a spherical earth,
//! not road-network distances.

use crate::types::GeoPoint;

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the haversine distance between two points in kilometres.
#[must_use]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let sin_dlat: f64 = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon: f64 = ((lon2 - lon1) * 0.5).sin();
    let h: f64 = sin_dlon.mul_add(sin_dlon * lat1.cos() * lat2.cos(), sin_dlat * sin_dlat);
    let c: f64 = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_KM * c
}

/// Returns the summed leg distance over an ordered route in kilometres.
///
/// Routes with fewer than two points have zero length.
#[must_use]
pub fn route_distance_km(route: &[&GeoPoint]) -> f64 {
    route
        .windows(2)
        .map(|leg| distance_km(leg[0], leg[1]))
        .sum()
}
