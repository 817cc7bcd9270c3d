// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride status tracking and transition logic.
//!
//! This module defines the ride lifecycle states and the transitions between
//! them. `Finished`, `Rejected` and the cancellation variants are terminal.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    /// Driver assigned, ride requested for immediate pickup.
    Pending,
    /// Driver assigned, pickup deferred to the scheduled time.
    Scheduled,
    /// Driver acknowledged the ride.
    Accepted,
    /// Ride is underway.
    Active,
    /// Ride is underway (driver-started).
    InProgress,
    /// Ride completed and settled.
    Finished,
    /// No eligible driver was found at creation.
    Rejected,
    /// Cancelled by an administrator or the system.
    Cancelled,
    /// Cancelled by the assigned driver.
    CancelledByDriver,
    /// Cancelled by a passenger on the ride.
    CancelledByPassenger,
    /// Panic raised during the ride.
    Panic,
}

impl RideStatus {
    /// Statuses in which a driver's vehicle is occupied now or committed for later.
    pub const ACTIVE_OR_QUEUED: [Self; 5] = [
        Self::Accepted,
        Self::Active,
        Self::InProgress,
        Self::Scheduled,
        Self::Pending,
    ];

    /// Statuses that keep a vehicle busy once the driver's current ride ends.
    pub const QUEUED: [Self; 2] = [Self::Scheduled, Self::Pending];

    /// Statuses that block a pending driver deactivation.
    pub const ENGAGED: [Self; 3] = [Self::Accepted, Self::Active, Self::InProgress];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Scheduled => "SCHEDULED",
            Self::Accepted => "ACCEPTED",
            Self::Active => "ACTIVE",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::CancelledByDriver => "CANCELLED_BY_DRIVER",
            Self::CancelledByPassenger => "CANCELLED_BY_PASSENGER",
            Self::Panic => "PANIC",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SCHEDULED" => Ok(Self::Scheduled),
            "ACCEPTED" => Ok(Self::Accepted),
            "ACTIVE" => Ok(Self::Active),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "FINISHED" => Ok(Self::Finished),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            "CANCELLED_BY_DRIVER" => Ok(Self::CancelledByDriver),
            "CANCELLED_BY_PASSENGER" => Ok(Self::CancelledByPassenger),
            "PANIC" => Ok(Self::Panic),
            _ => Err(DomainError::InvalidRideStatus(s.to_string())),
        }
    }

    /// Returns true if no further transitions are accepted from this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished
                | Self::Rejected
                | Self::Cancelled
                | Self::CancelledByDriver
                | Self::CancelledByPassenger
        )
    }

    /// Returns true if the ride is underway and may be stopped or ended.
    #[must_use]
    pub const fn is_underway(&self) -> bool {
        matches!(self, Self::Active | Self::InProgress)
    }

    /// Returns true if this is one of the cancellation variants.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::CancelledByDriver | Self::CancelledByPassenger
        )
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        // Cancellation is reachable from every non-terminal state.
        if new_status.is_cancellation() {
            return Ok(());
        }

        let valid: bool = match self {
            Self::Pending | Self::Scheduled => matches!(
                new_status,
                Self::Accepted | Self::Active | Self::InProgress | Self::Rejected
            ),
            Self::Accepted => matches!(new_status, Self::Active | Self::InProgress),
            Self::Active | Self::InProgress => {
                matches!(new_status, Self::Finished | Self::Panic)
            }
            Self::Panic => matches!(new_status, Self::Active | Self::InProgress),
            Self::Finished
            | Self::Rejected
            | Self::Cancelled
            | Self::CancelledByDriver
            | Self::CancelledByPassenger => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by ride lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for RideStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
