// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fare arithmetic shared by estimate-time and settle-time pricing.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Base fare and per-kilometre price, as captured or looked up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base_fare: f64,
    pub price_per_km: f64,
}

impl RateSnapshot {
    /// Creates a new rate snapshot.
    #[must_use]
    pub const fn new(base_fare: f64, price_per_km: f64) -> Self {
        Self {
            base_fare,
            price_per_km,
        }
    }
}

/// Rounds a monetary amount to two decimal places.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Computes `base_fare + distance × price_per_km`, rounded to cents.
///
/// Negative distances are treated as zero.
#[must_use]
pub fn fare_for_distance(rates: RateSnapshot, distance_km: f64) -> f64 {
    let distance: f64 = distance_km.max(0.0);
    round_to_cents(distance.mul_add(rates.price_per_km, rates.base_fare))
}

/// Estimates travel time in whole minutes at a constant average speed.
///
/// Partial minutes round up; non-positive distances or speeds yield zero.
#[must_use]
pub fn estimate_duration_minutes(distance_km: f64, average_speed_kmh: f64) -> u32 {
    if distance_km <= 0.0 || average_speed_kmh <= 0.0 {
        return 0;
    }
    (distance_km / average_speed_kmh * 60.0)
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}
