// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};

use ride_dispatch::{DispatchConfig, PriceTable};
use ride_dispatch_domain::{GeoPoint, RideId, UserId, VehicleId, VehicleType};
use ride_dispatch_persistence::{NewVehicle, Persistence};
use time::{OffsetDateTime, macros::datetime};

use crate::{
    AuthenticatedActor, AuthenticationService, BroadcastSink, CreateRideRequest, DeliveryError,
    DeliverySinks, DispatchEnvironment, EmailSink, LocationDto, NotificationSink,
    RequirementsDto, ReviewTokenIssuer, RideResponse,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

/// Kilometres per degree of latitude on the haversine sphere.
const KM_PER_DEGREE: f64 = 111.194_926_644_558_74;

/// Records every delivery call; individual channels can be told to fail.
#[derive(Default)]
pub struct RecordingSinks {
    pub calls: Mutex<Vec<String>>,
    pub fail_notifications: bool,
    pub fail_email: bool,
    pub fail_tokens: bool,
    pub fail_broadcast: bool,
}

impl RecordingSinks {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, fail: bool) -> Result<(), DeliveryError> {
        self.calls.lock().unwrap().push(call);
        if fail {
            Err(DeliveryError(String::from("channel down")))
        } else {
            Ok(())
        }
    }
}

impl NotificationSink for RecordingSinks {
    fn ride_assigned(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        self.record(
            format!("assigned:{}", ride.ride_id.unwrap()),
            self.fail_notifications,
        )
    }

    fn ride_finished(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        self.record(
            format!("finished:{}", ride.ride_id.unwrap()),
            self.fail_notifications,
        )
    }

    fn notify_linked_passengers(&self, ride: &RideResponse) -> Result<(), DeliveryError> {
        self.record(
            format!("linked:{}", ride.ride_id.unwrap()),
            self.fail_notifications,
        )
    }
}

impl EmailSink for RecordingSinks {
    fn send_review_request(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), DeliveryError> {
        self.record(format!("email:{email}:{name}:{token}"), self.fail_email)
    }
}

impl ReviewTokenIssuer for RecordingSinks {
    fn generate_token(
        &self,
        ride_id: RideId,
        _driver_id: Option<UserId>,
        passenger_id: UserId,
    ) -> Result<String, DeliveryError> {
        self.record(format!("token:{ride_id}"), self.fail_tokens)?;
        Ok(format!("tok-{ride_id}-{passenger_id}"))
    }
}

impl BroadcastSink for RecordingSinks {
    fn broadcast_ride_update(
        &self,
        ride_id: RideId,
        ride: &RideResponse,
    ) -> Result<(), DeliveryError> {
        self.record(
            format!("broadcast:{ride_id}:{}", ride.status),
            self.fail_broadcast,
        )
    }
}

pub fn sinks_from(recorder: &Arc<RecordingSinks>) -> DeliverySinks {
    DeliverySinks {
        notifications: recorder.clone(),
        email: recorder.clone(),
        tokens: recorder.clone(),
        broadcast: recorder.clone(),
    }
}

pub fn environment(recorder: &Arc<RecordingSinks>) -> DispatchEnvironment {
    DispatchEnvironment {
        pricing: Arc::new(PriceTable::default()),
        config: DispatchConfig::default(),
        sinks: sinks_from(recorder),
    }
}

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn pickup() -> LocationDto {
    LocationDto {
        address: String::from("Bulevar oslobodjenja 1"),
        latitude: 45.2550,
        longitude: 19.8450,
    }
}

pub fn destination() -> LocationDto {
    LocationDto {
        address: String::from("Trg slobode 3"),
        latitude: 45.2640,
        longitude: 19.8450,
    }
}

pub fn north_of_pickup(km: f64) -> GeoPoint {
    let origin: LocationDto = pickup();
    GeoPoint::new(
        "On the road",
        origin.latitude + km / KM_PER_DEGREE,
        origin.longitude,
    )
}

pub fn create_valid_request() -> CreateRideRequest {
    CreateRideRequest {
        start: Some(pickup()),
        destination: Some(destination()),
        stops: Vec::new(),
        requirements: Some(RequirementsDto {
            vehicle_type: Some(String::from("standard")),
            baby_transport: false,
            pet_transport: false,
        }),
        scheduled_time: None,
        passenger_emails: Vec::new(),
    }
}

pub fn create_test_passenger(persistence: &mut Persistence, email: &str) -> AuthenticatedActor {
    let user_id: UserId = persistence
        .create_passenger(email, Some("Rider"))
        .expect("passenger");
    AuthenticationService::require(persistence, Some(user_id)).expect("passenger actor")
}

/// Seeds an active driver with a standard vehicle `km_north` of the pickup.
pub fn create_test_driver(
    persistence: &mut Persistence,
    email: &str,
    km_north: f64,
) -> (AuthenticatedActor, VehicleId) {
    let user_id: UserId = persistence
        .create_driver(email, Some("Driver"), true)
        .expect("driver");
    let vehicle_id: VehicleId = persistence
        .create_vehicle(&NewVehicle::new(
            user_id,
            VehicleType::Standard,
            north_of_pickup(km_north),
        ))
        .expect("vehicle");
    let actor: AuthenticatedActor =
        AuthenticationService::require(persistence, Some(user_id)).expect("driver actor");
    (actor, vehicle_id)
}

pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    let user_id: UserId = persistence
        .create_admin("admin@rides.test", Some("Admin"))
        .expect("admin");
    AuthenticationService::require(persistence, Some(user_id)).expect("admin actor")
}
