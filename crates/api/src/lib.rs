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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! API boundary for the ride dispatch service.
//!
//! Translates wire requests into core operations, runs each one inside a
//! single persistence transaction, maps core failures to [`ApiError`] and
//! delivers the resulting events once the transaction has committed.

mod auth;
mod collaborators;
mod delivery;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService};
pub use collaborators::{
    BroadcastSink, DeliverySinks, EmailSink, NotificationSink, ReviewTokenIssuer,
};
pub use delivery::{DeliveryReport, deliver_events, project_ride};
pub use error::{
    ApiError, AuthError, DeliveryError, translate_core_error, translate_domain_error,
};
pub use handlers::{
    DispatchEnvironment, accept_ride, cancel_ride, create_ride, end_ride, estimate_ride,
    get_ride, record_distance, request_driver_inactivation, start_ride, stop_ride,
};
pub use request_response::{
    CancelRideRequest, CreateRideRequest, EndRideRequest, EstimateRideResponse,
    InactivationResponse, LocationDto, ParticipantInfo, RecordDistanceRequest,
    RequirementsDto, RideResponse, StopRideRequest, format_instant,
};
