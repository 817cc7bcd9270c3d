// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound delivery channels.
//!
//! Implementations live with the transport (the server crate provides logging
//! and WebSocket-backed ones). Every method may fail; failures are reported to
//! the caller of `deliver_events`, which logs them and carries on.

use std::sync::Arc;

use ride_dispatch_domain::{RideId, UserId};

use crate::error::DeliveryError;
use crate::request_response::RideResponse;

/// In-app notifications to drivers and passengers.
pub trait NotificationSink: Send + Sync {
    /// A driver and vehicle were assigned to a new ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be sent.
    fn ride_assigned(&self, ride: &RideResponse) -> Result<(), DeliveryError>;

    /// The ride reached `FINISHED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be sent.
    fn ride_finished(&self, ride: &RideResponse) -> Result<(), DeliveryError>;

    /// Tells the ride's linked passengers it has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be sent.
    fn notify_linked_passengers(&self, ride: &RideResponse) -> Result<(), DeliveryError>;
}

/// Outbound email.
pub trait EmailSink: Send + Sync {
    /// Sends a review invitation carrying a single-use token.
    ///
    /// # Errors
    ///
    /// Returns an error if the email could not be handed off.
    fn send_review_request(&self, email: &str, name: &str, token: &str)
    -> Result<(), DeliveryError>;
}

/// Issues the tokens embedded in review links.
pub trait ReviewTokenIssuer: Send + Sync {
    /// Generates a token binding a passenger to a finished ride.
    ///
    /// # Errors
    ///
    /// Returns an error if no token could be issued.
    fn generate_token(
        &self,
        ride_id: RideId,
        driver_id: Option<UserId>,
        passenger_id: UserId,
    ) -> Result<String, DeliveryError>;
}

/// Real-time ride state fan-out.
pub trait BroadcastSink: Send + Sync {
    /// Publishes the latest state of a ride to its subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the update could not be published.
    fn broadcast_ride_update(&self, ride_id: RideId, ride: &RideResponse)
    -> Result<(), DeliveryError>;
}

/// The set of delivery channels events are routed to.
#[derive(Clone)]
pub struct DeliverySinks {
    pub notifications: Arc<dyn NotificationSink>,
    pub email: Arc<dyn EmailSink>,
    pub tokens: Arc<dyn ReviewTokenIssuer>,
    pub broadcast: Arc<dyn BroadcastSink>,
}

impl std::fmt::Debug for DeliverySinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySinks").finish_non_exhaustive()
    }
}
