// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride lifecycle manager.
//!
//! Every operation checks, in order:
//! 1. The ride exists (`NotFound`)
//! 2. The current status permits the transition (`Conflict`)
//! 3. The caller may perform it (`Conflict`)
//!
//! Nothing is written until all three pass.

use ride_dispatch_domain::{
    DomainError, Driver, GeoPoint, Ride, RideId, RideStatus, UserId, VehicleStatus, distance_km,
    route_distance_km, validate_distance_increment, validate_geo_point,
};
use ride_dispatch_events::{Actor, RideEvent};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::DispatchConfig;
use crate::error::CoreError;
use crate::ports::{ActivityRepository, DispatchStore, RideRepository, UserRepository};
use crate::pricing::{PricingSource, settle_cost};
use crate::review::review_request_for;
use crate::transition::RideTransition;

/// Caller-supplied flags recorded when a ride ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndRideRequest {
    pub paid: bool,
    pub passengers_exited: bool,
}

/// A driver-initiated stop at a location other than the requested destination.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRideRequest {
    /// Replaces the ride's end location before distance and cost are settled.
    pub stop_location: GeoPoint,
    pub paid: bool,
    pub passengers_exited: bool,
}

/// What happened to a driver's deactivation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactivationOutcome {
    /// The driver went off duty immediately.
    Deactivated,
    /// The driver has engaged rides; deactivation waits for them to end.
    Deferred,
    /// The driver was already off duty.
    AlreadyInactive,
}

/// Ends an underway ride using accumulated telemetry distance.
///
/// # Errors
///
/// Returns an error if:
/// - The ride does not exist
/// - The ride is not `ACTIVE` or `IN_PROGRESS`
/// - Settle-time pricing is unavailable
/// - The store fails
pub fn end_ride<S, P>(
    store: &mut S,
    pricing: &P,
    config: &DispatchConfig,
    ride_id: RideId,
    request: EndRideRequest,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError>
where
    S: DispatchStore + ?Sized,
    P: PricingSource + ?Sized,
{
    let ride: Ride = load_ride(store, ride_id)?;
    ensure_transition(&ride, RideStatus::Finished)?;

    let route_km: f64 = route_distance_km(&ride.route());
    finish_ride(store, pricing, config, ride, route_km, request, now)
}

/// Stops an underway ride at the driver's current location.
///
/// # Errors
///
/// Returns an error if:
/// - The stop location is invalid
/// - The ride does not exist
/// - The ride is not `ACTIVE` or `IN_PROGRESS`
/// - The caller is absent or is not the ride's driver
/// - Settle-time pricing is unavailable
/// - The store fails
pub fn stop_ride<S, P>(
    store: &mut S,
    pricing: &P,
    config: &DispatchConfig,
    actor: Option<&Actor>,
    ride_id: RideId,
    request: StopRideRequest,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError>
where
    S: DispatchStore + ?Sized,
    P: PricingSource + ?Sized,
{
    validate_geo_point("stop_location", &request.stop_location)?;

    let mut ride: Ride = load_ride(store, ride_id)?;
    ensure_transition(&ride, RideStatus::Finished)?;
    ensure_driver(&ride, actor)?;

    // Stops past the stop location were never reached.
    let route_km: f64 = distance_km(&ride.start_location, &request.stop_location);
    ride.end_location = request.stop_location;
    let flags: EndRideRequest = EndRideRequest {
        paid: request.paid,
        passengers_exited: request.passengers_exited,
    };
    finish_ride(store, pricing, config, ride, route_km, flags, now)
}

/// Driver acknowledges an assigned ride.
///
/// # Errors
///
/// Returns an error if the ride does not exist, is not `PENDING` or
/// `SCHEDULED`, the caller is not its driver, or the store fails.
pub fn accept_ride<S: RideRepository + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    ride_id: RideId,
) -> Result<RideTransition, CoreError> {
    let mut ride: Ride = load_ride(store, ride_id)?;
    ensure_transition(&ride, RideStatus::Accepted)?;
    ensure_driver(&ride, actor)?;

    ride.status = RideStatus::Accepted;
    store.update_ride(&ride)?;

    info!(ride_id = %ride_id, "Ride accepted");
    Ok(RideTransition::updated(ride))
}

/// Driver picks up the passengers and starts the ride.
///
/// Telemetry distance starts from zero.
///
/// # Errors
///
/// Returns an error if the ride does not exist, is not `PENDING`,
/// `SCHEDULED` or `ACCEPTED`, the caller is not its driver, or the store fails.
pub fn start_ride<S: RideRepository + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    ride_id: RideId,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError> {
    let mut ride: Ride = load_ride(store, ride_id)?;
    if !matches!(
        ride.status,
        RideStatus::Pending | RideStatus::Scheduled | RideStatus::Accepted
    ) {
        return Err(CoreError::Conflict(format!(
            "ride {ride_id} cannot be started from {}",
            ride.status
        )));
    }
    ensure_driver(&ride, actor)?;

    ride.status = RideStatus::InProgress;
    ride.start_time = Some(now);
    ride.distance_traveled = Some(0.0);
    store.update_ride(&ride)?;

    info!(ride_id = %ride_id, "Ride started");
    Ok(RideTransition::updated(ride))
}

/// Adds a telemetry distance increment to an underway ride.
///
/// The ride's driver or an administrator may report distance.
///
/// # Errors
///
/// Returns an error if the increment is negative or not finite, the
/// accumulated distance would overflow, the ride does not exist or is not
/// underway, the caller may not report for it, or the store fails.
pub fn record_distance<S: RideRepository + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    ride_id: RideId,
    km: f64,
) -> Result<Ride, CoreError> {
    validate_distance_increment(km)?;

    let mut ride: Ride = load_ride(store, ride_id)?;
    if !ride.status.is_underway() {
        return Err(CoreError::Conflict(format!(
            "ride {ride_id} is {} and is not accumulating distance",
            ride.status
        )));
    }
    let actor: &Actor = actor.ok_or(CoreError::Unauthenticated)?;
    if !actor.is_admin() && !ride.is_driven_by(actor.user_id) {
        return Err(CoreError::Conflict(format!(
            "user {} cannot report distance for ride {ride_id}",
            actor.user_id
        )));
    }

    let total: f64 = ride.distance_traveled.unwrap_or(0.0) + km;
    if !total.is_finite() {
        return Err(DomainError::InvalidDistance(total.to_string()).into());
    }
    ride.distance_traveled = Some(total);
    store.update_ride(&ride)?;

    debug!(ride_id = %ride_id, km, "Distance recorded");
    Ok(ride)
}

/// Cancels a ride that has not finished.
///
/// The resulting status depends on who cancels: the ride's driver, one of its
/// passengers, or an administrator, checked in that order.
///
/// # Errors
///
/// Returns an error if the ride does not exist or is terminal, the caller has
/// no relation to the ride, or the store fails.
pub fn cancel_ride<S: DispatchStore + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    ride_id: RideId,
    reason: Option<String>,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError> {
    let mut ride: Ride = load_ride(store, ride_id)?;
    ensure_transition(&ride, RideStatus::Cancelled)?;

    let actor: &Actor = actor.ok_or(CoreError::Unauthenticated)?;
    let status: RideStatus = if ride.is_driven_by(actor.user_id) {
        RideStatus::CancelledByDriver
    } else if ride.has_passenger(actor.user_id) {
        RideStatus::CancelledByPassenger
    } else if actor.is_admin() {
        RideStatus::Cancelled
    } else {
        return Err(CoreError::Conflict(format!(
            "user {} cannot cancel ride {ride_id}",
            actor.user_id
        )));
    };

    ride.status = status;
    ride.end_time = Some(now);
    ride.cancellation_reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    store.update_ride(&ride)?;

    if let Some(driver_id) = ride.driver_id {
        release_vehicle(store, driver_id, &RideStatus::ACTIVE_OR_QUEUED, false)?;
        honour_pending_inactivation(store, driver_id, now)?;
    }

    info!(ride_id = %ride_id, status = %status, "Ride cancelled");
    Ok(RideTransition::updated(ride))
}

/// Loads a ride for a caller who is its driver, one of its passengers, or an administrator.
///
/// # Errors
///
/// Returns an error if the ride does not exist, the caller has no relation to
/// it, or the store fails.
pub fn get_ride<S: RideRepository + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    ride_id: RideId,
) -> Result<Ride, CoreError> {
    let ride: Ride = load_ride(store, ride_id)?;
    let actor: &Actor = actor.ok_or(CoreError::Unauthenticated)?;
    if actor.is_admin() || ride.is_driven_by(actor.user_id) || ride.has_passenger(actor.user_id) {
        Ok(ride)
    } else {
        Err(CoreError::Conflict(format!(
            "user {} cannot view ride {ride_id}",
            actor.user_id
        )))
    }
}

/// Takes a driver off duty, now or once their engaged rides end.
///
/// # Errors
///
/// Returns an error if the driver does not exist, the caller is neither that
/// driver nor an administrator, or the store fails.
pub fn request_driver_inactivation<S: DispatchStore + ?Sized>(
    store: &mut S,
    actor: Option<&Actor>,
    driver_id: UserId,
    now: OffsetDateTime,
) -> Result<(Driver, InactivationOutcome), CoreError> {
    let mut driver: Driver = store
        .find_driver(driver_id)?
        .ok_or_else(|| CoreError::NotFound(format!("driver {driver_id}")))?;

    let actor: &Actor = actor.ok_or(CoreError::Unauthenticated)?;
    if actor.user_id != driver_id && !actor.is_admin() {
        return Err(CoreError::Conflict(format!(
            "user {} cannot deactivate driver {driver_id}",
            actor.user_id
        )));
    }

    if !driver.active {
        return Ok((driver, InactivationOutcome::AlreadyInactive));
    }

    if store.driver_has_ride_in(driver_id, &RideStatus::ENGAGED)? {
        driver.inactive_requested = true;
        store.update_driver(&driver)?;
        info!(driver_id = %driver_id, "Driver deactivation deferred until engaged rides end");
        return Ok((driver, InactivationOutcome::Deferred));
    }

    let driver: Driver = deactivate(store, driver, now)?;
    Ok((driver, InactivationOutcome::Deactivated))
}

fn load_ride<S: RideRepository + ?Sized>(store: &mut S, ride_id: RideId) -> Result<Ride, CoreError> {
    store
        .find_ride(ride_id)?
        .ok_or_else(|| CoreError::NotFound(format!("ride {ride_id}")))
}

fn ensure_transition(ride: &Ride, to: RideStatus) -> Result<(), CoreError> {
    ride.status
        .validate_transition(to)
        .map_err(|e| CoreError::Conflict(e.to_string()))
}

fn ensure_driver(ride: &Ride, actor: Option<&Actor>) -> Result<(), CoreError> {
    match actor {
        Some(actor) if ride.is_driven_by(actor.user_id) => Ok(()),
        Some(actor) => Err(CoreError::Conflict(format!(
            "user {} is not the driver of this ride",
            actor.user_id
        ))),
        None => Err(CoreError::Conflict(String::from(
            "no authenticated driver for this ride",
        ))),
    }
}

fn finish_ride<S, P>(
    store: &mut S,
    pricing: &P,
    config: &DispatchConfig,
    mut ride: Ride,
    route_km: f64,
    flags: EndRideRequest,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError>
where
    S: DispatchStore + ?Sized,
    P: PricingSource + ?Sized,
{
    let distance: f64 = match ride.distance_traveled {
        Some(km) if km > 0.0 => km,
        _ => route_km,
    };

    ride.status = RideStatus::Finished;
    ride.end_time = Some(now);
    ride.distance = distance;
    ride.total_cost = Some(settle_cost(pricing, &ride, distance)?);
    ride.paid = flags.paid;
    ride.passengers_exited = flags.passengers_exited;
    store.update_ride(&ride)?;

    match ride.driver_id {
        Some(driver_id) => {
            release_vehicle(store, driver_id, &RideStatus::QUEUED, true)?;
            honour_pending_inactivation(store, driver_id, now)?;
        }
        None => warn!(ride = ?ride.ride_id, "Finished ride has no driver"),
    }

    info!(
        ride = ?ride.ride_id,
        distance = ride.distance,
        total_cost = ?ride.total_cost,
        "Ride finished"
    );

    let mut events: Vec<RideEvent> = vec![
        RideEvent::RideFinished {
            ride: Box::new(ride.clone()),
        },
        RideEvent::LinkedPassengersNotified {
            ride: Box::new(ride.clone()),
        },
    ];
    if let Some(review) = review_request_for(store, config, &ride) {
        events.push(RideEvent::ReviewRequested(review));
    }
    events.push(RideEvent::RideUpdated {
        ride: Box::new(ride.clone()),
    });

    Ok(RideTransition { ride, events })
}

/// Resets the driver's vehicle after one of their rides leaves the queue.
///
/// The vehicle stays busy while the driver has any ride in `busy_while`.
/// A driver without a vehicle is skipped.
fn release_vehicle<S: DispatchStore + ?Sized>(
    store: &mut S,
    driver_id: UserId,
    busy_while: &[RideStatus],
    clear_panic: bool,
) -> Result<(), CoreError> {
    let Some(mut vehicle) = store.vehicle_for_driver(driver_id)? else {
        warn!(driver_id = %driver_id, "No vehicle found for driver");
        return Ok(());
    };

    if clear_panic {
        vehicle.current_panic = false;
    }
    vehicle.status = if store.driver_has_ride_in(driver_id, busy_while)? {
        VehicleStatus::Busy
    } else {
        VehicleStatus::Free
    };
    store.update_vehicle(&vehicle)?;

    debug!(vehicle_id = %vehicle.vehicle_id, status = vehicle.status.as_str(), "Vehicle released");
    Ok(())
}

/// Completes a pending deactivation once the driver has no engaged ride.
fn honour_pending_inactivation<S: DispatchStore + ?Sized>(
    store: &mut S,
    driver_id: UserId,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    let Some(driver) = store.find_driver(driver_id)? else {
        return Ok(());
    };
    if !driver.inactive_requested {
        return Ok(());
    }
    if store.driver_has_ride_in(driver_id, &RideStatus::ENGAGED)? {
        debug!(driver_id = %driver_id, "Deactivation still pending");
        return Ok(());
    }
    deactivate(store, driver, now)?;
    Ok(())
}

fn deactivate<S: UserRepository + ActivityRepository + ?Sized>(
    store: &mut S,
    mut driver: Driver,
    now: OffsetDateTime,
) -> Result<Driver, CoreError> {
    driver.active = false;
    driver.inactive_requested = false;
    store.update_driver(&driver)?;

    if let Some(session_id) = store
        .open_session(driver.user_id)?
        .and_then(|session| session.session_id)
    {
        store.close_session(session_id, now)?;
    }

    info!(driver_id = %driver.user_id, "Driver deactivated");
    Ok(driver)
}

