// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response data transfer objects.

use ride_dispatch::{InactivationOutcome, RideEstimate};
use ride_dispatch_domain::{
    Driver, GeoPoint, RequirementsDraft, Ride, RideRequestDraft, VehicleType,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;

/// A location as exchanged over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDto {
    /// Street address or place label.
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<LocationDto> for GeoPoint {
    fn from(dto: LocationDto) -> Self {
        Self {
            address: dto.address,
            latitude: dto.latitude,
            longitude: dto.longitude,
        }
    }
}

impl From<&GeoPoint> for LocationDto {
    fn from(point: &GeoPoint) -> Self {
        Self {
            address: point.address.clone(),
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Vehicle requirements of a ride request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsDto {
    /// `STANDARD`, `LUXURY` or `VAN` (case-insensitive).
    pub vehicle_type: Option<String>,
    /// Whether a baby seat is required.
    #[serde(default)]
    pub baby_transport: bool,
    /// Whether pets will ride along.
    #[serde(default)]
    pub pet_transport: bool,
}

/// API request to create or estimate a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRideRequest {
    /// Pickup location.
    pub start: Option<LocationDto>,
    /// Requested destination.
    pub destination: Option<LocationDto>,
    /// Intermediate stops in travel order.
    #[serde(default)]
    pub stops: Vec<LocationDto>,
    /// Vehicle requirements.
    pub requirements: Option<RequirementsDto>,
    /// Requested pickup time (RFC 3339); absent for an immediate ride.
    pub scheduled_time: Option<String>,
    /// Emails of registered passengers to link to the ride.
    #[serde(default)]
    pub passenger_emails: Vec<String>,
}

impl CreateRideRequest {
    /// Converts the wire request into the draft the dispatcher validates.
    ///
    /// Only wire-level parsing happens here: the vehicle type string and the
    /// scheduled time. Presence and range checks belong to domain validation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the vehicle type or the scheduled
    /// time does not parse.
    pub fn into_draft(self) -> Result<RideRequestDraft, ApiError> {
        let requirements: Option<RequirementsDraft> = self
            .requirements
            .map(|requirements| {
                let vehicle_type: Option<VehicleType> = requirements
                    .vehicle_type
                    .as_deref()
                    .map(str::parse::<VehicleType>)
                    .transpose()
                    .map_err(|_| ApiError::InvalidInput {
                        field: String::from("requirements.vehicle_type"),
                        message: format!(
                            "unknown vehicle type '{}'",
                            requirements.vehicle_type.as_deref().unwrap_or_default()
                        ),
                    })?;
                Ok::<RequirementsDraft, ApiError>(RequirementsDraft {
                    vehicle_type,
                    baby_transport: requirements.baby_transport,
                    pet_transport: requirements.pet_transport,
                })
            })
            .transpose()?;

        let scheduled_time: Option<OffsetDateTime> = self
            .scheduled_time
            .as_deref()
            .map(|raw| {
                OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| ApiError::InvalidInput {
                    field: String::from("scheduled_time"),
                    message: format!("expected an RFC 3339 timestamp: {err}"),
                })
            })
            .transpose()?;

        Ok(RideRequestDraft {
            start: self.start.map(GeoPoint::from),
            destination: self.destination.map(GeoPoint::from),
            stops: self.stops.into_iter().map(GeoPoint::from).collect(),
            requirements,
            scheduled_time,
            passenger_emails: self.passenger_emails,
        })
    }
}

/// API request to end an underway ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EndRideRequest {
    /// Whether the fare was paid.
    #[serde(default)]
    pub paid: bool,
    /// Whether every passenger has left the vehicle.
    #[serde(default)]
    pub passengers_exited: bool,
}

/// API request for a driver to stop a ride at their current location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRideRequest {
    /// Where the ride actually ended.
    pub stop_location: Option<LocationDto>,
    /// Whether the fare was paid.
    #[serde(default)]
    pub paid: bool,
    /// Whether every passenger has left the vehicle.
    #[serde(default)]
    pub passengers_exited: bool,
}

/// API request to cancel a ride.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelRideRequest {
    /// Free-text reason recorded on the ride.
    pub reason: Option<String>,
}

/// API request carrying a telemetry distance increment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordDistanceRequest {
    /// Kilometres travelled since the previous report.
    pub km: f64,
}

/// A user attached to a ride, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// The user's id.
    pub user_id: i64,
    /// Display name, if the account has one.
    pub name: Option<String>,
    /// Contact email, if the account has one.
    pub email: Option<String>,
}

impl ParticipantInfo {
    /// Creates an entry carrying only the id.
    #[must_use]
    pub const fn bare(user_id: i64) -> Self {
        Self {
            user_id,
            name: None,
            email: None,
        }
    }
}

/// Full projection of a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideResponse {
    /// The ride's id.
    pub ride_id: Option<i64>,
    /// Lifecycle status, e.g. `PENDING`.
    pub status: String,
    /// The assigned driver.
    pub driver: Option<ParticipantInfo>,
    /// The assigned vehicle's id.
    pub vehicle_id: Option<i64>,
    /// The account that requested the ride.
    pub created_by: Option<i64>,
    /// Linked passengers, ordered by id.
    pub passengers: Vec<ParticipantInfo>,
    /// Emails supplied at creation.
    pub invited_emails: Vec<String>,
    /// Pickup location.
    pub start_location: LocationDto,
    /// Destination, or the stop location once stopped early.
    pub end_location: LocationDto,
    /// Intermediate stops.
    pub stops: Vec<LocationDto>,
    /// Requested vehicle type.
    pub vehicle_type: String,
    /// Whether a baby seat was requested.
    pub baby_transport: bool,
    /// Whether pet transport was requested.
    pub pet_transport: bool,
    /// Base fare captured at creation.
    pub rate_base_fare: Option<f64>,
    /// Per-kilometre price captured at creation.
    pub rate_price_per_km: Option<f64>,
    /// Route distance in kilometres.
    pub distance: f64,
    /// Accumulated telemetry distance.
    pub distance_traveled: Option<f64>,
    /// Cost quoted at creation.
    pub estimated_cost: f64,
    /// Settled cost, once finished.
    pub total_cost: Option<f64>,
    /// Expected duration quoted at creation.
    pub estimated_duration_minutes: u32,
    /// When the ride was requested (RFC 3339).
    pub requested_at: String,
    /// Requested pickup time (RFC 3339).
    pub scheduled_time: Option<String>,
    /// When the ride started (RFC 3339).
    pub start_time: Option<String>,
    /// When the ride ended (RFC 3339).
    pub end_time: Option<String>,
    /// Whether the fare was paid.
    pub paid: bool,
    /// Whether every passenger has left the vehicle.
    pub passengers_exited: bool,
    /// Why dispatch rejected the ride.
    pub rejection_reason: Option<String>,
    /// Why the ride was cancelled.
    pub cancellation_reason: Option<String>,
}

impl RideResponse {
    /// Builds the projection from a ride and its resolved participants.
    ///
    /// # Arguments
    ///
    /// * `ride` - The ride to project
    /// * `driver` - The assigned driver's details, if resolved
    /// * `passengers` - Linked passengers' details, in ride order
    #[must_use]
    pub fn from_ride(
        ride: &Ride,
        driver: Option<ParticipantInfo>,
        passengers: Vec<ParticipantInfo>,
    ) -> Self {
        Self {
            ride_id: ride.ride_id.map(|id| id.value()),
            status: ride.status.as_str().to_string(),
            driver,
            vehicle_id: ride.vehicle_id.map(|id| id.value()),
            created_by: ride.created_by.map(|id| id.value()),
            passengers,
            invited_emails: ride.invited_emails.clone(),
            start_location: LocationDto::from(&ride.start_location),
            end_location: LocationDto::from(&ride.end_location),
            stops: ride.stops.iter().map(LocationDto::from).collect(),
            vehicle_type: ride.requirements.vehicle_type.as_str().to_string(),
            baby_transport: ride.requirements.baby_transport,
            pet_transport: ride.requirements.pet_transport,
            rate_base_fare: ride.rates().map(|rates| rates.base_fare),
            rate_price_per_km: ride.rates().map(|rates| rates.price_per_km),
            distance: ride.distance,
            distance_traveled: ride.distance_traveled,
            estimated_cost: ride.estimated_cost,
            total_cost: ride.total_cost,
            estimated_duration_minutes: ride.estimated_duration_minutes,
            requested_at: format_instant(ride.requested_at),
            scheduled_time: ride.scheduled_time.map(format_instant),
            start_time: ride.start_time.map(format_instant),
            end_time: ride.end_time.map(format_instant),
            paid: ride.paid,
            passengers_exited: ride.passengers_exited,
            rejection_reason: ride.rejection_reason.clone(),
            cancellation_reason: ride.cancellation_reason.clone(),
        }
    }
}

/// API response for a ride estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRideResponse {
    /// Route distance in kilometres.
    pub distance_km: f64,
    /// Quoted cost at current rates.
    pub estimated_cost: f64,
    /// Expected duration in minutes.
    pub estimated_duration_minutes: u32,
}

impl From<RideEstimate> for EstimateRideResponse {
    fn from(estimate: RideEstimate) -> Self {
        Self {
            distance_km: estimate.distance_km,
            estimated_cost: estimate.estimated_cost,
            estimated_duration_minutes: estimate.estimated_duration_minutes,
        }
    }
}

/// API response for a driver deactivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivationResponse {
    /// The driver's id.
    pub driver_id: i64,
    /// Whether the driver is still on duty.
    pub active: bool,
    /// Whether deactivation is waiting for engaged rides to end.
    pub inactive_requested: bool,
    /// `deactivated`, `deferred` or `already_inactive`.
    pub outcome: String,
}

impl InactivationResponse {
    /// Builds the response from the updated driver and the outcome.
    #[must_use]
    pub fn new(driver: &Driver, outcome: InactivationOutcome) -> Self {
        let outcome: &str = match outcome {
            InactivationOutcome::Deactivated => "deactivated",
            InactivationOutcome::Deferred => "deferred",
            InactivationOutcome::AlreadyInactive => "already_inactive",
        };
        Self {
            driver_id: driver.user_id.value(),
            active: driver.active,
            inactive_requested: driver.inactive_requested,
            outcome: outcome.to_string(),
        }
    }
}

/// Formats an instant as RFC 3339, falling back to its display form for
/// instants RFC 3339 cannot represent.
#[must_use]
pub fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.to_string())
}
