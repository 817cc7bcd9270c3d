// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{Passenger, Ride, RideId, UserId, normalize_email};
use ride_dispatch_events::ReviewRequest;
use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::ports::UserRepository;

/// Display name used when a recipient has no usable stored name.
pub const FALLBACK_RECIPIENT_NAME: &str = "Valued Customer";

/// Picks the single recipient of a finished ride's review request.
///
/// The ride's creator is preferred; otherwise the lowest passenger id is used.
/// Returns `None` when there is no candidate, the candidate has no email, or
/// the email is in an excluded domain. Lookup failures are logged and also
/// yield `None`; a missing review email never fails a ride.
pub fn review_request_for<S: UserRepository + ?Sized>(
    store: &mut S,
    config: &DispatchConfig,
    ride: &Ride,
) -> Option<ReviewRequest> {
    let ride_id: RideId = ride.ride_id?;
    let passenger_id: UserId = ride
        .created_by
        .or_else(|| ride.passengers.iter().next().copied())?;

    let passenger: Passenger = match store.find_passenger(passenger_id) {
        Ok(Some(passenger)) => passenger,
        Ok(None) => {
            debug!(ride_id = %ride_id, passenger_id = %passenger_id, "Review recipient no longer exists");
            return None;
        }
        Err(e) => {
            warn!(ride_id = %ride_id, passenger_id = %passenger_id, error = %e, "Failed to load review recipient");
            return None;
        }
    };

    let email: String = passenger.email.as_deref().and_then(normalize_email)?;
    if config.is_excluded_email(&email) {
        debug!(ride_id = %ride_id, "Skipping review request to excluded domain");
        return None;
    }

    let name: String = passenger
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| String::from(FALLBACK_RECIPIENT_NAME));

    Some(ReviewRequest {
        ride_id,
        driver_id: ride.driver_id,
        passenger_id,
        email,
        name,
    })
}
