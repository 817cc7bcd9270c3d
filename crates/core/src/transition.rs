// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::Ride;
use ride_dispatch_events::RideEvent;

/// The result of a successful ride operation.
///
/// `events` must only be delivered once the store changes are committed.
#[derive(Debug, Clone, PartialEq)]
pub struct RideTransition {
    /// The ride as persisted.
    pub ride: Ride,
    /// Events to deliver after commit, in emission order.
    pub events: Vec<RideEvent>,
}

impl RideTransition {
    /// Creates a transition result carrying only a ride update broadcast.
    #[must_use]
    pub fn updated(ride: Ride) -> Self {
        let events: Vec<RideEvent> = vec![RideEvent::RideUpdated {
            ride: Box::new(ride.clone()),
        }];
        Self { ride, events }
    }
}

/// A cost and time estimate that creates nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideEstimate {
    /// Geodesic distance over start, stops and destination.
    pub distance_km: f64,
    pub estimated_cost: f64,
    pub estimated_duration_minutes: u32,
}
