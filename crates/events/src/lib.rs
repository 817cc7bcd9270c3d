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
    clippy::all
)]

//! Caller identity and the events emitted by ride transitions.
//!
//! Core operations never talk to delivery channels directly. Each successful
//! transition returns the events it produced; the caller delivers them only
//! after the transition has been committed.

use ride_dispatch_domain::{Ride, RideId, UserId, UserRole};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Represents the authenticated entity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The account performing the operation.
    pub user_id: UserId,
    /// The account's role at the time of the call.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The account performing the operation
    /// * `role` - The account's role
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns true if the actor is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// A single review request addressed to one passenger of a finished ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub ride_id: RideId,
    pub driver_id: Option<UserId>,
    pub passenger_id: UserId,
    /// Recipient address, already checked against excluded domains.
    pub email: String,
    /// Display name, never blank.
    pub name: String,
}

/// An event produced by a committed ride transition.
///
/// Ride payloads are boxed snapshots of the ride as it was committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RideEvent {
    /// A driver and vehicle were assigned at creation.
    RideAssigned { ride: Box<Ride> },
    /// The ride reached `FINISHED`.
    RideFinished { ride: Box<Ride> },
    /// Passengers linked to the ride should be told it finished.
    LinkedPassengersNotified { ride: Box<Ride> },
    /// A review email should be sent.
    ReviewRequested(ReviewRequest),
    /// Real-time subscribers should receive the new ride state.
    RideUpdated { ride: Box<Ride> },
}

impl RideEvent {
    /// Returns a stable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RideAssigned { .. } => "ride_assigned",
            Self::RideFinished { .. } => "ride_finished",
            Self::LinkedPassengersNotified { .. } => "linked_passengers_notified",
            Self::ReviewRequested(_) => "review_requested",
            Self::RideUpdated { .. } => "ride_updated",
        }
    }

    /// Returns the ride the event refers to, if it has been persisted.
    #[must_use]
    pub const fn ride_id(&self) -> Option<RideId> {
        match self {
            Self::RideAssigned { ride }
            | Self::RideFinished { ride }
            | Self::LinkedPassengersNotified { ride }
            | Self::RideUpdated { ride } => ride.ride_id,
            Self::ReviewRequested(request) => Some(request.ride_id),
        }
    }
}
