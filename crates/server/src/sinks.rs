// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Delivery channels for notifications, review email and review tokens.
//!
//! Notification and email delivery are logged rather than sent; a deployment
//! swaps these for real providers behind the same traits.

use ride_dispatch_api::{
    DeliveryError, EmailSink, NotificationSink, ReviewTokenIssuer, RideResponse,
};
use ride_dispatch_domain::{RideId, UserId};
use tracing::info;

/// Writes in-app notifications to the log.
#[derive(Debug, Default)]
pub struct LoggingNotificationSink;

impl NotificationSink for LoggingNotificationSink {
    fn ride_assigned(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        info!(
            ride_id = ?ride.ride_id,
            driver_id = ?ride.driver.as_ref().map(|d| d.user_id),
            status = %ride.status,
            "Notify driver of assigned ride"
        );
        Ok(())
    }

    fn ride_finished(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        info!(
            ride_id = ?ride.ride_id,
            total_cost = ?ride.total_cost,
            "Notify ride finished"
        );
        Ok(())
    }

    fn notify_linked_passengers(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        for passenger in &ride.passengers {
            info!(
                ride_id = ?ride.ride_id,
                passenger_id = passenger.user_id,
                "Notify linked passenger"
            );
        }
        Ok(())
    }
}

/// Writes outgoing review emails to the log.
#[derive(Debug, Default)]
pub struct LoggingEmailSink;

impl EmailSink for LoggingEmailSink {
    fn send_review_request(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), DeliveryError> {
        if email.trim().is_empty() {
            return Err(DeliveryError(String::from("empty recipient address")));
        }
        info!(email, name, token_len = token.len(), "Review request email queued");
        Ok(())
    }
}

/// Issues random, unguessable review tokens.
#[derive(Debug, Default)]
pub struct RandomTokenIssuer;

impl ReviewTokenIssuer for RandomTokenIssuer {
    fn generate_token(
        &self,
        ride_id: RideId,
        _driver_id: Option<UserId>,
        passenger_id: UserId,
    ) -> Result<String, DeliveryError> {
        Ok(format!(
            "review_{ride_id}_{passenger_id}_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_bound_to_ride_and_passenger_and_unique() {
        let issuer = RandomTokenIssuer;
        let first = issuer
            .generate_token(RideId(7), Some(UserId(2)), UserId(3))
            .unwrap();
        let second = issuer
            .generate_token(RideId(7), Some(UserId(2)), UserId(3))
            .unwrap();

        assert!(first.starts_with("review_7_3_"));
        assert_eq!(first.len(), "review_7_3_".len() + 32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_blank_recipient_is_rejected() {
        let sink = LoggingEmailSink;
        assert!(sink.send_review_request("  ", "Rider", "tok").is_err());
        assert!(sink.send_review_request("r@rides.test", "Rider", "tok").is_ok());
    }
}
