// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fare calculation against a live pricing source.
//!
//! Live prices are consulted only when a ride has no rate snapshot yet: when a
//! ride is estimated or created, and when settling a ride that predates
//! snapshots. Everything else settles against the ride's own snapshot.

use std::collections::HashMap;

use ride_dispatch_domain::{RateSnapshot, Ride, RideRequirements, VehicleType, fare_for_distance};

use crate::error::CoreError;

/// A source of current prices per vehicle type.
pub trait PricingSource {
    /// Returns the current base fare, if priced.
    fn base_fare(&self, vehicle_type: VehicleType) -> Option<f64>;

    /// Returns the current price per kilometre, if priced.
    fn price_per_km(&self, vehicle_type: VehicleType) -> Option<f64>;
}

/// In-memory price list keyed by vehicle type.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    rates: HashMap<VehicleType, RateSnapshot>,
}

impl Default for PriceTable {
    fn default() -> Self {
        let rates: HashMap<VehicleType, RateSnapshot> = HashMap::from([
            (VehicleType::Standard, RateSnapshot::new(3.0, 1.2)),
            (VehicleType::Luxury, RateSnapshot::new(6.0, 2.5)),
            (VehicleType::Van, RateSnapshot::new(4.5, 1.8)),
        ]);
        Self { rates }
    }
}

impl PriceTable {
    /// Creates a price table with no prices.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Parses a JSON object keyed by vehicle type and merges it over the defaults.
    ///
    /// ```json
    /// { "LUXURY": { "base_fare": 7.0, "price_per_km": 3.1 } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the expected shape.
    pub fn from_json_overrides(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: HashMap<VehicleType, RateSnapshot> = serde_json::from_str(json)?;
        let mut table: Self = Self::default();
        table.rates.extend(overrides);
        Ok(table)
    }

    /// Sets the live rates for a vehicle type.
    pub fn set_rates(&mut self, vehicle_type: VehicleType, rates: RateSnapshot) {
        self.rates.insert(vehicle_type, rates);
    }
}

impl PricingSource for PriceTable {
    fn base_fare(&self, vehicle_type: VehicleType) -> Option<f64> {
        self.rates.get(&vehicle_type).map(|r| r.base_fare)
    }

    fn price_per_km(&self, vehicle_type: VehicleType) -> Option<f64> {
        self.rates.get(&vehicle_type).map(|r| r.price_per_km)
    }
}

/// Reads both live rates for a vehicle type.
///
/// # Errors
///
/// Returns `CoreError::PricingUnavailable` if either rate is missing.
pub fn live_rates<P: PricingSource + ?Sized>(
    pricing: &P,
    vehicle_type: VehicleType,
) -> Result<RateSnapshot, CoreError> {
    match (
        pricing.base_fare(vehicle_type),
        pricing.price_per_km(vehicle_type),
    ) {
        (Some(base_fare), Some(price_per_km)) => Ok(RateSnapshot::new(base_fare, price_per_km)),
        _ => Err(CoreError::PricingUnavailable(vehicle_type)),
    }
}

/// Estimates the cost of a ride before any snapshot exists.
///
/// # Errors
///
/// Returns `CoreError::PricingUnavailable` if the vehicle type is not priced.
pub fn estimate_cost<P: PricingSource + ?Sized>(
    pricing: &P,
    requirements: &RideRequirements,
    distance_km: f64,
) -> Result<f64, CoreError> {
    let rates: RateSnapshot = live_rates(pricing, requirements.vehicle_type)?;
    Ok(fare_for_distance(rates, distance_km))
}

/// Computes a ride's final cost for the settled distance.
///
/// Uses the ride's rate snapshot, falling back to live pricing for the ride's
/// requested vehicle type when no snapshot was captured.
///
/// # Errors
///
/// Returns `CoreError::PricingUnavailable` if the fallback lookup fails.
pub fn settle_cost<P: PricingSource + ?Sized>(
    pricing: &P,
    ride: &Ride,
    distance_km: f64,
) -> Result<f64, CoreError> {
    let rates: RateSnapshot = match ride.rates() {
        Some(rates) => rates,
        None => live_rates(pricing, ride.requirements.vehicle_type)?,
    };
    Ok(fare_for_distance(rates, distance_km))
}
