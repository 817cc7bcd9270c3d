// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::fare::RateSnapshot;
use crate::ride_status::RideStatus;
use crate::validation::ValidatedRideRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw numeric identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a persisted ride.
    RideId
);
id_type!(
    /// Identifier of a user account (passenger, driver or admin).
    UserId
);
id_type!(
    /// Identifier of a vehicle.
    VehicleId
);
id_type!(
    /// Identifier of a driver activity session.
    SessionId
);

/// A geographic point with a human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Street address or place label.
    pub address: String,
    /// Latitude in degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, within `[-180, 180]`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new geographic point.
    #[must_use]
    pub fn new(address: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Vehicle class offered to passengers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Standard,
    Luxury,
    Van,
}

impl VehicleType {
    /// Every vehicle type, in a stable order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Luxury, Self::Van];

    /// Returns the string representation of the vehicle type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Luxury => "LUXURY",
            Self::Van => "VAN",
        }
    }
}

impl FromStr for VehicleType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "LUXURY" => Ok(Self::Luxury),
            "VAN" => Ok(Self::Van),
            _ => Err(DomainError::InvalidVehicleType(s.to_string())),
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a vehicle is currently committed to a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Free,
    Busy,
}

impl VehicleStatus {
    /// Returns the string representation of the vehicle status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Busy => "BUSY",
        }
    }
}

impl FromStr for VehicleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(Self::Free),
            "BUSY" => Ok(Self::Busy),
            _ => Err(DomainError::InvalidVehicleStatus(s.to_string())),
        }
    }
}

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Passenger,
    Driver,
    Admin,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Driver => "driver",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passenger" => Ok(Self::Passenger),
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidUserRole(s.to_string())),
        }
    }
}

/// Vehicle requirements frozen into a ride at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRequirements {
    /// The requested vehicle class.
    pub vehicle_type: VehicleType,
    /// Whether a baby seat is required.
    pub baby_transport: bool,
    /// Whether pets must be allowed.
    pub pet_transport: bool,
}

/// A vehicle and its static capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    /// The owning driver (1:1).
    pub driver_id: UserId,
    pub vehicle_type: VehicleType,
    pub pet_transport: bool,
    pub baby_transport: bool,
    pub status: VehicleStatus,
    /// Latest known position, maintained by the telemetry feed.
    pub current_location: GeoPoint,
    pub current_panic: bool,
}

impl Vehicle {
    /// Returns true if this vehicle satisfies every requested capability.
    ///
    /// Capabilities the ride does not request are ignored.
    #[must_use]
    pub fn supports(&self, requirements: &RideRequirements) -> bool {
        self.vehicle_type == requirements.vehicle_type
            && (!requirements.pet_transport || self.pet_transport)
            && (!requirements.baby_transport || self.baby_transport)
    }
}

/// A user account with the driver role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Whether the driver is on duty and accepting dispatch.
    pub active: bool,
    /// A deferred deactivation waiting for the driver's engaged rides to end.
    pub inactive_requested: bool,
    /// Account-level switch; disabled accounts never receive dispatch.
    pub enabled: bool,
}

impl Driver {
    /// Returns true if the driver may receive new rides.
    ///
    /// A driver with a pending deactivation finishes current work but gets
    /// nothing new.
    #[must_use]
    pub const fn is_dispatchable(&self) -> bool {
        self.active && self.enabled && !self.inactive_requested
    }
}

/// A user account with the passenger role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// One continuous on-duty interval of a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySession {
    /// `None` until the session is persisted.
    pub session_id: Option<SessionId>,
    pub driver_id: UserId,
    pub start_time: OffsetDateTime,
    /// `None` while the session is still open.
    pub end_time: Option<OffsetDateTime>,
}

impl ActivitySession {
    /// Returns the session length, measuring open sessions up to `now`.
    ///
    /// Sessions that end before they start contribute nothing.
    #[must_use]
    pub fn duration_until(&self, now: OffsetDateTime) -> Duration {
        let end: OffsetDateTime = self.end_time.unwrap_or(now);
        let duration: Duration = end - self.start_time;
        if duration.is_negative() {
            Duration::ZERO
        } else {
            duration
        }
    }

    /// Returns true if the session has not been closed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// The central ride entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// `None` until the ride is persisted.
    pub ride_id: Option<RideId>,
    pub status: RideStatus,
    pub driver_id: Option<UserId>,
    pub vehicle_id: Option<VehicleId>,
    pub passengers: BTreeSet<UserId>,
    pub created_by: Option<UserId>,
    /// Emails invited to the ride that did not match a passenger account.
    pub invited_emails: Vec<String>,
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    /// Intermediate stops, in ride order.
    pub stops: Vec<GeoPoint>,
    pub requirements: RideRequirements,
    rates: Option<RateSnapshot>,
    /// Geodesic route distance in km.
    pub distance: f64,
    /// Distance accumulated by telemetry while the ride is underway.
    pub distance_traveled: Option<f64>,
    pub estimated_cost: f64,
    pub total_cost: Option<f64>,
    pub estimated_duration_minutes: u32,
    pub requested_at: OffsetDateTime,
    pub scheduled_time: Option<OffsetDateTime>,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
    pub paid: bool,
    pub passengers_exited: bool,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl Ride {
    /// Creates an unassigned ride from a validated request.
    ///
    /// The requester is recorded as creator and first passenger. Status starts
    /// as `Pending`; dispatch decides the final status.
    #[must_use]
    pub fn new(
        request: &ValidatedRideRequest,
        created_by: UserId,
        requested_at: OffsetDateTime,
    ) -> Self {
        let mut passengers: BTreeSet<UserId> = BTreeSet::new();
        passengers.insert(created_by);

        Self {
            ride_id: None,
            status: RideStatus::Pending,
            driver_id: None,
            vehicle_id: None,
            passengers,
            created_by: Some(created_by),
            invited_emails: Vec::new(),
            start_location: request.start.clone(),
            end_location: request.destination.clone(),
            stops: request.stops.clone(),
            requirements: request.requirements,
            rates: None,
            distance: 0.0,
            distance_traveled: None,
            estimated_cost: 0.0,
            total_cost: None,
            estimated_duration_minutes: 0,
            requested_at,
            scheduled_time: request.scheduled_time,
            start_time: None,
            end_time: None,
            paid: false,
            passengers_exited: false,
            rejection_reason: None,
            cancellation_reason: None,
        }
    }

    /// Returns the rate snapshot captured at creation, if any.
    #[must_use]
    pub const fn rates(&self) -> Option<RateSnapshot> {
        self.rates
    }

    /// Captures the ride's rate snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RateSnapshotAlreadySet` if a snapshot already exists.
    pub fn snapshot_rates(&mut self, rates: RateSnapshot) -> Result<(), DomainError> {
        if self.rates.is_some() {
            return Err(DomainError::RateSnapshotAlreadySet);
        }
        self.rates = Some(rates);
        Ok(())
    }

    /// Returns the route in ride order: start, stops, end.
    #[must_use]
    pub fn route(&self) -> Vec<&GeoPoint> {
        std::iter::once(&self.start_location)
            .chain(self.stops.iter())
            .chain(std::iter::once(&self.end_location))
            .collect()
    }

    /// Returns the instant the ride's timeline is anchored to.
    ///
    /// This is the actual start if the ride has started, else the scheduled
    /// pickup, else the request time.
    #[must_use]
    pub fn anchor_time(&self) -> OffsetDateTime {
        self.start_time
            .or(self.scheduled_time)
            .unwrap_or(self.requested_at)
    }

    /// Returns when the ride is expected to end.
    #[must_use]
    pub fn expected_end(&self) -> OffsetDateTime {
        self.anchor_time() + Duration::minutes(i64::from(self.estimated_duration_minutes))
    }

    /// Returns true if `user_id` is the ride's assigned driver.
    #[must_use]
    pub fn is_driven_by(&self, user_id: UserId) -> bool {
        self.driver_id == Some(user_id)
    }

    /// Returns true if `user_id` is one of the ride's passengers.
    #[must_use]
    pub fn has_passenger(&self, user_id: UserId) -> bool {
        self.passengers.contains(&user_id)
    }
}
