// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dispatch engine: validates ride requests and assigns a driver and vehicle.
//!
//! Candidate selection runs in four stages:
//! 1. Capability filter (vehicle type, pet and baby transport).
//! 2. Near-term availability: free vehicles, or busy vehicles whose earliest
//!    committed ride is expected to end within the configured window.
//! 3. Labor limit over the trailing lookback.
//! 4. Proximity to the pickup point, ties broken by the lowest vehicle id.
//!
//! Finding no candidate is not an error: the ride is stored as `REJECTED`.

use ride_dispatch_domain::{
    GeoPoint, Passenger, RateSnapshot, Ride, RideId, RideRequestDraft, RideRequirements,
    RideStatus, ValidatedRideRequest, Vehicle, VehicleStatus, distance_km,
    estimate_duration_minutes, fare_for_distance, normalize_email, route_distance_km,
    validate_ride_request,
};
use ride_dispatch_events::{Actor, RideEvent};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::DispatchConfig;
use crate::error::CoreError;
use crate::ledger::labor_limit_reached;
use crate::ports::{DispatchStore, RideRepository, UserRepository};
use crate::pricing::{PricingSource, estimate_cost, live_rates};
use crate::transition::{RideEstimate, RideTransition};

/// Reason recorded when no active vehicle has the requested type and options.
pub const REASON_NO_CAPABLE_VEHICLE: &str = "no vehicle supports the requested type and options";
/// Reason recorded when capable vehicles exist but none can take the ride.
pub const REASON_NO_AVAILABLE_DRIVER: &str = "no available driver";

/// The outcome of candidate selection.
enum Selection {
    Assigned(Vehicle),
    Rejected(&'static str),
}

/// Creates a ride and attempts to assign a driver to it.
///
/// # Arguments
///
/// * `store` - The store for this unit of work
/// * `pricing` - Live pricing, used for the rate snapshot
/// * `config` - Dispatch parameters
/// * `actor` - The authenticated requester
/// * `draft` - The unvalidated request
/// * `now` - The current time
///
/// # Returns
///
/// The persisted ride (assigned or `REJECTED`) and the events to deliver.
///
/// # Errors
///
/// Returns an error if:
/// - No caller is authenticated
/// - The request fails validation
/// - The caller is not a passenger
/// - The assigned vehicle type is not priced
/// - The store fails
pub fn create_ride<S, P>(
    store: &mut S,
    pricing: &P,
    config: &DispatchConfig,
    actor: Option<&Actor>,
    draft: RideRequestDraft,
    now: OffsetDateTime,
) -> Result<RideTransition, CoreError>
where
    S: DispatchStore + ?Sized,
    P: PricingSource + ?Sized,
{
    let actor: &Actor = actor.ok_or(CoreError::Unauthenticated)?;
    let request: ValidatedRideRequest =
        validate_ride_request(draft, now, config.max_schedule_horizon)?;

    let requester: Passenger = store.find_passenger(actor.user_id)?.ok_or_else(|| {
        CoreError::Conflict(format!(
            "user {} is not a passenger and cannot request rides",
            actor.user_id
        ))
    })?;

    let mut ride: Ride = Ride::new(&request, requester.user_id, now);
    ride.distance = route_distance_km(&ride.route());
    ride.estimated_duration_minutes =
        estimate_duration_minutes(ride.distance, config.average_speed_kmh);
    link_passengers(store, &mut ride, &request.passenger_emails)?;

    let selection: Selection = select_vehicle(
        store,
        &request.requirements,
        &ride.start_location,
        config,
        now,
    )?;

    match selection {
        Selection::Assigned(mut vehicle) => {
            let rates: RateSnapshot = live_rates(pricing, request.requirements.vehicle_type)?;
            ride.snapshot_rates(rates)?;
            ride.estimated_cost = fare_for_distance(rates, ride.distance);
            ride.driver_id = Some(vehicle.driver_id);
            ride.vehicle_id = Some(vehicle.vehicle_id);
            ride.status = if ride.scheduled_time.is_some() {
                RideStatus::Scheduled
            } else {
                RideStatus::Pending
            };

            let ride_id: RideId = store.insert_ride(&ride)?;
            ride.ride_id = Some(ride_id);

            vehicle.status = VehicleStatus::Busy;
            store.update_vehicle(&vehicle)?;

            info!(
                ride_id = %ride_id,
                driver_id = %vehicle.driver_id,
                vehicle_id = %vehicle.vehicle_id,
                status = %ride.status,
                "Ride assigned"
            );

            let events: Vec<RideEvent> = vec![
                RideEvent::RideAssigned {
                    ride: Box::new(ride.clone()),
                },
                RideEvent::RideUpdated {
                    ride: Box::new(ride.clone()),
                },
            ];
            Ok(RideTransition { ride, events })
        }
        Selection::Rejected(reason) => {
            ride.status = RideStatus::Rejected;
            ride.rejection_reason = Some(String::from(reason));

            let ride_id: RideId = store.insert_ride(&ride)?;
            ride.ride_id = Some(ride_id);

            info!(ride_id = %ride_id, reason, "Ride rejected");
            Ok(RideTransition::updated(ride))
        }
    }
}

/// Estimates distance, cost and duration for a request without persisting or matching.
///
/// # Errors
///
/// Returns an error if the request fails validation or its vehicle type is not priced.
pub fn estimate_ride<P: PricingSource + ?Sized>(
    pricing: &P,
    config: &DispatchConfig,
    draft: RideRequestDraft,
    now: OffsetDateTime,
) -> Result<RideEstimate, CoreError> {
    let request: ValidatedRideRequest =
        validate_ride_request(draft, now, config.max_schedule_horizon)?;

    let route: Vec<&GeoPoint> = std::iter::once(&request.start)
        .chain(request.stops.iter())
        .chain(std::iter::once(&request.destination))
        .collect();
    let distance: f64 = route_distance_km(&route);

    Ok(RideEstimate {
        distance_km: distance,
        estimated_cost: estimate_cost(pricing, &request.requirements, distance)?,
        estimated_duration_minutes: estimate_duration_minutes(distance, config.average_speed_kmh),
    })
}

/// Resolves invited emails to passenger accounts.
///
/// Matched accounts join the ride's passenger set; anything else is kept in
/// `invited_emails`, in request order and without duplicates. Blank entries
/// are dropped.
fn link_passengers<S: UserRepository + ?Sized>(
    store: &mut S,
    ride: &mut Ride,
    emails: &[String],
) -> Result<(), CoreError> {
    for raw in emails {
        let Some(email) = normalize_email(raw) else {
            continue;
        };
        match store.find_passenger_by_email(&email)? {
            Some(passenger) => {
                ride.passengers.insert(passenger.user_id);
            }
            None => {
                if !ride.invited_emails.contains(&email) {
                    ride.invited_emails.push(email);
                }
            }
        }
    }
    Ok(())
}

fn select_vehicle<S: DispatchStore + ?Sized>(
    store: &mut S,
    requirements: &RideRequirements,
    pickup: &GeoPoint,
    config: &DispatchConfig,
    now: OffsetDateTime,
) -> Result<Selection, CoreError> {
    let capable: Vec<Vehicle> = store
        .active_vehicles_matching(requirements)?
        .into_iter()
        .filter(|vehicle| vehicle.supports(requirements))
        .collect();

    if capable.is_empty() {
        return Ok(Selection::Rejected(REASON_NO_CAPABLE_VEHICLE));
    }

    let mut candidates: Vec<(f64, Vehicle)> = Vec::with_capacity(capable.len());
    for vehicle in capable {
        if !is_available_soon(store, &vehicle, config, now)? {
            debug!(vehicle_id = %vehicle.vehicle_id, "Excluded: busy beyond near-term window");
            continue;
        }
        if labor_limit_reached(store, vehicle.driver_id, config, now)? {
            debug!(driver_id = %vehicle.driver_id, "Excluded: labor limit reached");
            continue;
        }
        let distance: f64 = distance_km(&vehicle.current_location, pickup);
        candidates.push((distance, vehicle));
    }

    Ok(candidates
        .into_iter()
        .min_by(|(a_km, a), (b_km, b)| {
            a_km.total_cmp(b_km)
                .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
        })
        .map_or(Selection::Rejected(REASON_NO_AVAILABLE_DRIVER), |(_, vehicle)| {
            Selection::Assigned(vehicle)
        }))
}

/// Returns true if the vehicle is free, or busy with an earliest committed
/// ride that is expected to end no later than `now + near_term_window`.
fn is_available_soon<S: RideRepository + ?Sized>(
    store: &mut S,
    vehicle: &Vehicle,
    config: &DispatchConfig,
    now: OffsetDateTime,
) -> Result<bool, CoreError> {
    match vehicle.status {
        VehicleStatus::Free => Ok(true),
        VehicleStatus::Busy => {
            let rides: Vec<Ride> =
                store.rides_for_driver(vehicle.driver_id, &RideStatus::ACTIVE_OR_QUEUED)?;
            Ok(rides
                .first()
                .is_none_or(|earliest| earliest.expected_end() <= now + config.near_term_window))
        }
    }
}
