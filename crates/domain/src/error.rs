// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required request field was absent.
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },
    /// A geographic point failed validation.
    InvalidLocation {
        /// The request field holding the point (e.g. `start`, `stops[2]`).
        field: String,
        /// Why the point was rejected.
        reason: String,
    },
    /// The requested scheduled time is outside the permitted window.
    InvalidScheduledTime {
        /// Why the scheduled time was rejected.
        reason: String,
    },
    /// A telemetry distance increment was negative or not finite.
    InvalidDistance(String),
    /// Vehicle type string did not parse.
    InvalidVehicleType(String),
    /// Vehicle status string did not parse.
    InvalidVehicleStatus(String),
    /// Ride status string did not parse.
    InvalidRideStatus(String),
    /// User role string did not parse.
    InvalidUserRole(String),
    /// A ride status transition was attempted that the lifecycle does not permit.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// The ride's rate snapshot was already captured and cannot be replaced.
    RateSnapshotAlreadySet,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "Missing required field '{field}'"),
            Self::InvalidLocation { field, reason } => {
                write!(f, "Invalid location for '{field}': {reason}")
            }
            Self::InvalidScheduledTime { reason } => {
                write!(f, "Invalid scheduled time: {reason}")
            }
            Self::InvalidDistance(value) => {
                write!(
                    f,
                    "Invalid distance increment: {value}. Must be a finite, non-negative number"
                )
            }
            Self::InvalidVehicleType(value) => write!(f, "Invalid vehicle type: {value}"),
            Self::InvalidVehicleStatus(value) => write!(f, "Invalid vehicle status: {value}"),
            Self::InvalidRideStatus(value) => write!(f, "Invalid ride status: {value}"),
            Self::InvalidUserRole(value) => write!(f, "Invalid user role: {value}"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition ride from {from} to {to}: {reason}")
            }
            Self::RateSnapshotAlreadySet => {
                write!(f, "Ride rate snapshot is already set and cannot be changed")
            }
        }
    }
}

impl std::error::Error for DomainError {}
