// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{GeoPoint, RideRequirements, VehicleType};
use time::{Duration, OffsetDateTime};

/// Requirements as supplied by the caller, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequirementsDraft {
    pub vehicle_type: Option<VehicleType>,
    pub baby_transport: bool,
    pub pet_transport: bool,
}

/// A ride request as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RideRequestDraft {
    pub start: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
    pub stops: Vec<GeoPoint>,
    pub requirements: Option<RequirementsDraft>,
    pub scheduled_time: Option<OffsetDateTime>,
    pub passenger_emails: Vec<String>,
}

/// A ride request whose structure and ranges have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRideRequest {
    pub start: GeoPoint,
    pub destination: GeoPoint,
    pub stops: Vec<GeoPoint>,
    pub requirements: RideRequirements,
    pub scheduled_time: Option<OffsetDateTime>,
    pub passenger_emails: Vec<String>,
}

/// Validates a geographic point.
///
/// # Arguments
///
/// * `field` - The request field name, used in the error
/// * `point` - The point to validate
///
/// # Errors
///
/// Returns an error if:
/// - The address is blank
/// - The latitude is not within `[-90, 90]`
/// - The longitude is not within `[-180, 180]`
pub fn validate_geo_point(field: &str, point: &GeoPoint) -> Result<(), DomainError> {
    if point.address.trim().is_empty() {
        return Err(DomainError::InvalidLocation {
            field: field.to_string(),
            reason: String::from("address cannot be blank"),
        });
    }

    if !(-90.0..=90.0).contains(&point.latitude) {
        return Err(DomainError::InvalidLocation {
            field: field.to_string(),
            reason: format!(
                "latitude must be between -90 and 90, got {}",
                point.latitude
            ),
        });
    }

    if !(-180.0..=180.0).contains(&point.longitude) {
        return Err(DomainError::InvalidLocation {
            field: field.to_string(),
            reason: format!(
                "longitude must be between -180 and 180, got {}",
                point.longitude
            ),
        });
    }

    Ok(())
}

/// Validates that a scheduled pickup is in the future and within the horizon.
///
/// # Errors
///
/// Returns `DomainError::InvalidScheduledTime` if the time is not strictly
/// after `now` or is more than `max_horizon` ahead.
pub fn validate_scheduled_time(
    scheduled_time: OffsetDateTime,
    now: OffsetDateTime,
    max_horizon: Duration,
) -> Result<(), DomainError> {
    if scheduled_time <= now {
        return Err(DomainError::InvalidScheduledTime {
            reason: String::from("scheduled time must be in the future"),
        });
    }

    if scheduled_time > now + max_horizon {
        return Err(DomainError::InvalidScheduledTime {
            reason: format!(
                "scheduled time cannot be more than {} hours ahead",
                max_horizon.whole_hours()
            ),
        });
    }

    Ok(())
}

/// Validates a ride request, producing the request the dispatcher works with.
///
/// # Arguments
///
/// * `draft` - The caller-supplied request
/// * `now` - The current time
/// * `max_horizon` - How far ahead a ride may be scheduled
///
/// # Errors
///
/// Returns an error if:
/// - `start`, `destination`, `requirements` or `requirements.vehicle_type` is absent
/// - Any location (including stops) fails `validate_geo_point`
/// - The scheduled time fails `validate_scheduled_time`
pub fn validate_ride_request(
    draft: RideRequestDraft,
    now: OffsetDateTime,
    max_horizon: Duration,
) -> Result<ValidatedRideRequest, DomainError> {
    let start: GeoPoint = require(draft.start, "start")?;
    let destination: GeoPoint = require(draft.destination, "destination")?;
    let requirements: RequirementsDraft = require(draft.requirements, "requirements")?;
    let vehicle_type: VehicleType =
        require(requirements.vehicle_type, "requirements.vehicle_type")?;

    validate_geo_point("start", &start)?;
    validate_geo_point("destination", &destination)?;
    for (index, stop) in draft.stops.iter().enumerate() {
        validate_geo_point(&format!("stops[{index}]"), stop)?;
    }

    if let Some(scheduled_time) = draft.scheduled_time {
        validate_scheduled_time(scheduled_time, now, max_horizon)?;
    }

    Ok(ValidatedRideRequest {
        start,
        destination,
        stops: draft.stops,
        requirements: RideRequirements {
            vehicle_type,
            baby_transport: requirements.baby_transport,
            pet_transport: requirements.pet_transport,
        },
        scheduled_time: draft.scheduled_time,
        passenger_emails: draft.passenger_emails,
    })
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, DomainError> {
    value.ok_or(DomainError::MissingField { field })
}

/// Validates a telemetry distance increment.
///
/// # Errors
///
/// Returns `DomainError::InvalidDistance` if `km` is negative or not finite.
pub fn validate_distance_increment(km: f64) -> Result<(), DomainError> {
    if !km.is_finite() || km < 0.0 {
        return Err(DomainError::InvalidDistance(km.to_string()));
    }
    Ok(())
}

/// Normalizes an email address for lookup: trimmed and lowercased.
///
/// Returns `None` for blank input.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed: &str = email.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
