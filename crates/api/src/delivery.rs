// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-commit event delivery.
//!
//! Events are delivered only after the transition that produced them has been
//! committed. A failing channel never affects the committed ride or the other
//! events: the failure is logged and counted.

use ride_dispatch_domain::{Ride, RideId, UserId};
use ride_dispatch_events::{ReviewRequest, RideEvent};
use ride_dispatch_persistence::Persistence;
use tracing::{debug, error, warn};

use crate::collaborators::DeliverySinks;
use crate::error::DeliveryError;
use crate::request_response::{ParticipantInfo, RideResponse};

/// Outcome counts of one delivery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers committed events in order.
///
/// # Arguments
///
/// * `persistence` - Used to resolve participant details for projections
/// * `sinks` - The delivery channels
/// * `events` - Events in emission order
pub fn deliver_events(
    persistence: &mut Persistence,
    sinks: &DeliverySinks,
    events: Vec<RideEvent>,
) -> DeliveryReport {
    let mut report: DeliveryReport = DeliveryReport::default();

    for event in events {
        let name: &'static str = event.name();
        let ride_id: String = event
            .ride_id()
            .map_or_else(|| String::from("unsaved"), |id| id.to_string());

        match deliver_one(persistence, sinks, event) {
            Ok(()) => {
                debug!(event = name, ride_id = %ride_id, "Delivered ride event");
                report.delivered += 1;
            }
            Err(err) => {
                warn!(event = name, ride_id = %ride_id, error = %err, "Ride event delivery failed");
                report.failed += 1;
            }
        }
    }

    if report.failed > 0 {
        error!(
            delivered = report.delivered,
            failed = report.failed,
            "Some ride events could not be delivered"
        );
    }

    report
}

fn deliver_one(
    persistence: &mut Persistence,
    sinks: &DeliverySinks,
    event: RideEvent,
) -> Result<(), DeliveryError> {
    match event {
        RideEvent::RideAssigned { ride } => {
            sinks.notifications.ride_assigned(&project_ride(persistence, &ride))
        }
        RideEvent::RideFinished { ride } => {
            sinks.notifications.ride_finished(&project_ride(persistence, &ride))
        }
        RideEvent::LinkedPassengersNotified { ride } => sinks
            .notifications
            .notify_linked_passengers(&project_ride(persistence, &ride)),
        RideEvent::ReviewRequested(request) => send_review(sinks, &request),
        RideEvent::RideUpdated { ride } => {
            let ride_id: RideId = ride.ride_id.ok_or_else(|| {
                DeliveryError(String::from("cannot broadcast a ride without an id"))
            })?;
            sinks
                .broadcast
                .broadcast_ride_update(ride_id, &project_ride(persistence, &ride))
        }
    }
}

fn send_review(sinks: &DeliverySinks, request: &ReviewRequest) -> Result<(), DeliveryError> {
    let token: String =
        sinks
            .tokens
            .generate_token(request.ride_id, request.driver_id, request.passenger_id)?;
    sinks
        .email
        .send_review_request(&request.email, &request.name, &token)
}

/// Builds the client projection of a ride, resolving participant details.
///
/// Participants whose accounts cannot be read are included by id only.
pub fn project_ride(persistence: &mut Persistence, ride: &Ride) -> RideResponse {
    let driver: Option<ParticipantInfo> = ride
        .driver_id
        .map(|driver_id| participant(persistence, driver_id));
    let passengers: Vec<ParticipantInfo> = ride
        .passengers
        .iter()
        .map(|passenger_id| participant(persistence, *passenger_id))
        .collect();

    RideResponse::from_ride(ride, driver, passengers)
}

fn participant(persistence: &mut Persistence, user_id: UserId) -> ParticipantInfo {
    match persistence.find_user(user_id) {
        Ok(Some(user)) => ParticipantInfo {
            user_id: user.user_id.value(),
            name: user.name,
            email: user.email,
        },
        Ok(None) => ParticipantInfo::bare(user_id.value()),
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "Could not resolve ride participant");
            ParticipantInfo::bare(user_id.value())
        }
    }
}
