// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{
    GeoPoint, RequirementsDraft, Ride, RideRequestDraft, RideRequirements, UserId,
    ValidatedRideRequest, VehicleId, VehicleType,
};
use time::{OffsetDateTime, macros::datetime};

use crate::{NewVehicle, Persistence};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

/// Kilometres per degree of latitude on the haversine sphere.
pub const KM_PER_DEGREE: f64 = 111.194_926_644_558_74;

pub fn pickup() -> GeoPoint {
    GeoPoint::new("Bulevar oslobodjenja 1", 45.2550, 19.8450)
}

pub fn destination() -> GeoPoint {
    GeoPoint::new("Trg slobode 3", 45.2640, 19.8450)
}

pub fn north_of_pickup(km: f64) -> GeoPoint {
    let origin: GeoPoint = pickup();
    GeoPoint::new(
        "On the road",
        origin.latitude + km / KM_PER_DEGREE,
        origin.longitude,
    )
}

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn seed_passenger(persistence: &mut Persistence, email: &str) -> UserId {
    persistence
        .create_passenger(email, Some("Rider"))
        .expect("passenger")
}

/// Seeds an active driver with a vehicle `km_north` of the pickup.
pub fn seed_driver(
    persistence: &mut Persistence,
    email: &str,
    km_north: f64,
    vehicle_type: VehicleType,
) -> (UserId, VehicleId) {
    let driver_id: UserId = persistence
        .create_driver(email, Some("Driver"), true)
        .expect("driver");
    let vehicle_id: VehicleId = persistence
        .create_vehicle(&NewVehicle::new(
            driver_id,
            vehicle_type,
            north_of_pickup(km_north),
        ))
        .expect("vehicle");
    (driver_id, vehicle_id)
}

pub fn draft() -> RideRequestDraft {
    RideRequestDraft {
        start: Some(pickup()),
        destination: Some(destination()),
        stops: Vec::new(),
        requirements: Some(RequirementsDraft {
            vehicle_type: Some(VehicleType::Standard),
            baby_transport: false,
            pet_transport: false,
        }),
        scheduled_time: None,
        passenger_emails: Vec::new(),
    }
}

/// Builds an unpersisted ride created by `passenger`.
pub fn ride_for(passenger: UserId) -> Ride {
    let request = ValidatedRideRequest {
        start: pickup(),
        destination: destination(),
        stops: vec![
            GeoPoint::new("First stop", 45.2580, 19.8460),
            GeoPoint::new("Second stop", 45.2600, 19.8440),
        ],
        requirements: RideRequirements {
            vehicle_type: VehicleType::Standard,
            baby_transport: true,
            pet_transport: false,
        },
        scheduled_time: None,
        passenger_emails: Vec::new(),
    };
    Ride::new(&request, passenger, NOW)
}
