// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod fare;
mod geo;
mod ride_status;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use fare::{RateSnapshot, estimate_duration_minutes, fare_for_distance, round_to_cents};
pub use geo::{distance_km, route_distance_km};
pub use ride_status::RideStatus;
pub use types::{
    ActivitySession, Driver, GeoPoint, Passenger, Ride, RideId, RideRequirements, SessionId,
    UserId, UserRole, Vehicle, VehicleId, VehicleStatus, VehicleType,
};
pub use validation::{
    RequirementsDraft, RideRequestDraft, ValidatedRideRequest, normalize_email,
    validate_distance_increment, validate_geo_point, validate_ride_request,
    validate_scheduled_time,
};
