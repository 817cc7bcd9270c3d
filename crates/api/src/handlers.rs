// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride operations exposed at the API boundary.
//!
//! Each handler runs its core operation inside one store transaction, maps
//! the outcome to the API error taxonomy and, once committed, hands the
//! emitted events to the delivery channels.

use std::sync::Arc;

use ride_dispatch::{
    CoreError, DispatchConfig, InactivationOutcome, PricingSource, RideEstimate, RideTransition,
};
use ride_dispatch_domain::{Driver, GeoPoint, Ride, RideId, RideRequestDraft, UserId};
use ride_dispatch_events::Actor;
use ride_dispatch_persistence::{Persistence, SqliteStore};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::AuthenticatedActor;
use crate::collaborators::DeliverySinks;
use crate::delivery::{DeliveryReport, deliver_events, project_ride};
use crate::error::{ApiError, translate_core_error};
use crate::request_response::{
    CancelRideRequest, CreateRideRequest, EndRideRequest, EstimateRideResponse,
    InactivationResponse, RecordDistanceRequest, RideResponse, StopRideRequest,
};

/// Pricing, tuning and delivery channels shared by every request.
#[derive(Clone)]
pub struct DispatchEnvironment {
    pub pricing: Arc<dyn PricingSource + Send + Sync>,
    pub config: DispatchConfig,
    pub sinks: DeliverySinks,
}

impl std::fmt::Debug for DispatchEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Requests a ride for the calling passenger.
///
/// A ride that no driver can take is still created, in `REJECTED` status
/// with a rejection reason; that is a successful response.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `env` - Pricing, configuration and delivery channels
/// * `actor` - The authenticated caller, if any
/// * `request` - The ride request
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - No caller is authenticated
/// - The request is malformed or fails validation
/// - The caller is not a passenger
/// - The database operation fails
pub fn create_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: Option<&AuthenticatedActor>,
    request: CreateRideRequest,
    now: OffsetDateTime,
) -> Result<RideResponse, ApiError> {
    let draft: RideRequestDraft = request.into_draft()?;
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);

    let response: RideResponse = commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::create_ride(
            store,
            env.pricing.as_ref(),
            &env.config,
            actor.as_ref(),
            draft,
            now,
        )
    })?;

    info!(
        ride_id = ?response.ride_id,
        status = %response.status,
        rejection_reason = ?response.rejection_reason,
        "Ride requested"
    );
    Ok(response)
}

/// Quotes distance, cost and duration without creating anything.
///
/// # Errors
///
/// Returns an error if the request is malformed, fails validation, or its
/// vehicle type is not priced.
pub fn estimate_ride(
    env: &DispatchEnvironment,
    request: CreateRideRequest,
    now: OffsetDateTime,
) -> Result<EstimateRideResponse, ApiError> {
    let draft: RideRequestDraft = request.into_draft()?;
    let estimate: RideEstimate =
        ride_dispatch::estimate_ride(env.pricing.as_ref(), &env.config, draft, now)
            .map_err(translate_core_error)?;
    Ok(EstimateRideResponse::from(estimate))
}

/// Driver acknowledges an assigned ride.
///
/// # Errors
///
/// Returns an error if the ride does not exist, cannot be accepted in its
/// current status, or the caller is not its driver.
pub fn accept_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
) -> Result<RideResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::accept_ride(store, actor.as_ref(), ride_id)
    })
}

/// Driver picks the passengers up.
///
/// # Errors
///
/// Returns an error if the ride does not exist, cannot be started in its
/// current status, or the caller is not its driver.
pub fn start_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
    now: OffsetDateTime,
) -> Result<RideResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::start_ride(store, actor.as_ref(), ride_id, now)
    })
}

/// Adds a telemetry distance increment to an underway ride.
///
/// # Errors
///
/// Returns an error if the increment is invalid, the ride does not exist or
/// is not underway, or the caller is not its driver.
pub fn record_distance(
    persistence: &mut Persistence,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
    request: RecordDistanceRequest,
) -> Result<RideResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    let ride: Ride = persistence
        .transaction(|store| {
            ride_dispatch::record_distance(store, actor.as_ref(), ride_id, request.km)
        })
        .map_err(translate_core_error)?;
    Ok(project_ride(persistence, &ride))
}

/// Cancels a ride that has not finished.
///
/// # Errors
///
/// Returns an error if the ride does not exist or is already terminal, or
/// the caller has no right to cancel it.
pub fn cancel_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
    request: CancelRideRequest,
    now: OffsetDateTime,
) -> Result<RideResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::cancel_ride(store, actor.as_ref(), ride_id, request.reason, now)
    })
}

/// Ends an underway ride at its recorded destination.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `env` - Pricing, configuration and delivery channels
/// * `actor` - The authenticated caller
/// * `ride_id` - The ride to end
/// * `request` - Payment and exit flags
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - The ride does not exist
/// - The ride is not `ACTIVE` or `IN_PROGRESS`
/// - The database operation fails
pub fn end_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: &AuthenticatedActor,
    ride_id: RideId,
    request: EndRideRequest,
    now: OffsetDateTime,
) -> Result<RideResponse, ApiError> {
    info!(ride_id = %ride_id, user_id = %actor.user_id, "Ending ride");
    let flags: ride_dispatch::EndRideRequest = ride_dispatch::EndRideRequest {
        paid: request.paid,
        passengers_exited: request.passengers_exited,
    };
    commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::end_ride(
            store,
            env.pricing.as_ref(),
            &env.config,
            ride_id,
            flags,
            now,
        )
    })
}

/// Driver ends an underway ride early at their current location.
///
/// # Errors
///
/// Returns an error if:
/// - The stop location is absent or invalid
/// - The ride does not exist
/// - The ride is not `ACTIVE` or `IN_PROGRESS`
/// - The caller is absent or is not the ride's driver
/// - The database operation fails
pub fn stop_ride(
    persistence: &mut Persistence,
    env: &DispatchEnvironment,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
    request: StopRideRequest,
    now: OffsetDateTime,
) -> Result<RideResponse, ApiError> {
    let stop_location: GeoPoint =
        request
            .stop_location
            .map(GeoPoint::from)
            .ok_or_else(|| ApiError::InvalidInput {
                field: String::from("stop_location"),
                message: String::from("'stop_location' is required"),
            })?;
    let stop: ride_dispatch::StopRideRequest = ride_dispatch::StopRideRequest {
        stop_location,
        paid: request.paid,
        passengers_exited: request.passengers_exited,
    };
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);

    commit_transition(persistence, &env.sinks, |store| {
        ride_dispatch::stop_ride(
            store,
            env.pricing.as_ref(),
            &env.config,
            actor.as_ref(),
            ride_id,
            stop,
            now,
        )
    })
}

/// Takes a driver off duty, now or once their engaged rides end.
///
/// # Errors
///
/// Returns an error if the driver does not exist, the caller is neither that
/// driver nor an administrator, or the database operation fails.
pub fn request_driver_inactivation(
    persistence: &mut Persistence,
    actor: Option<&AuthenticatedActor>,
    driver_id: UserId,
    now: OffsetDateTime,
) -> Result<InactivationResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    let (driver, outcome): (Driver, InactivationOutcome) = persistence
        .transaction(|store| {
            ride_dispatch::request_driver_inactivation(store, actor.as_ref(), driver_id, now)
        })
        .map_err(translate_core_error)?;

    info!(driver_id = %driver_id, ?outcome, "Driver inactivation requested");
    Ok(InactivationResponse::new(&driver, outcome))
}

/// Returns the projection of a ride the caller is related to.
///
/// # Errors
///
/// Returns an error if the ride does not exist or the caller is neither an
/// administrator, its driver, nor one of its passengers.
pub fn get_ride(
    persistence: &mut Persistence,
    actor: Option<&AuthenticatedActor>,
    ride_id: RideId,
) -> Result<RideResponse, ApiError> {
    let actor: Option<Actor> = actor.map(AuthenticatedActor::to_actor);
    let ride: Ride = persistence
        .transaction(|store| ride_dispatch::get_ride(store, actor.as_ref(), ride_id))
        .map_err(translate_core_error)?;
    Ok(project_ride(persistence, &ride))
}

/// Commits a transition, then projects the ride and delivers its events.
fn commit_transition<F>(
    persistence: &mut Persistence,
    sinks: &DeliverySinks,
    operation: F,
) -> Result<RideResponse, ApiError>
where
    F: FnOnce(&mut SqliteStore<'_>) -> Result<RideTransition, CoreError>,
{
    let transition: RideTransition = persistence
        .transaction(operation)
        .map_err(translate_core_error)?;

    let response: RideResponse = project_ride(persistence, &transition.ride);
    let report: DeliveryReport = deliver_events(persistence, sinks, transition.events);
    debug!(
        ride_id = ?response.ride_id,
        delivered = report.delivered,
        failed = report.failed,
        "Transition committed"
    );
    Ok(response)
}
