// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    ActivitySession, DomainError, Driver, GeoPoint, RateSnapshot, Ride, RideRequirements, UserId,
    ValidatedRideRequest, Vehicle, VehicleId, VehicleStatus, VehicleType,
};

const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

fn create_test_vehicle(pet: bool, baby: bool) -> Vehicle {
    Vehicle {
        vehicle_id: VehicleId(1),
        driver_id: UserId(10),
        vehicle_type: VehicleType::Standard,
        pet_transport: pet,
        baby_transport: baby,
        status: VehicleStatus::Free,
        current_location: GeoPoint::new("Depot", 45.25, 19.84),
        current_panic: false,
    }
}

fn create_test_request() -> ValidatedRideRequest {
    ValidatedRideRequest {
        start: GeoPoint::new("Start", 45.25, 19.84),
        destination: GeoPoint::new("End", 45.26, 19.85),
        stops: vec![
            GeoPoint::new("First", 45.251, 19.841),
            GeoPoint::new("Second", 45.252, 19.842),
        ],
        requirements: RideRequirements {
            vehicle_type: VehicleType::Standard,
            baby_transport: false,
            pet_transport: false,
        },
        scheduled_time: None,
        passenger_emails: Vec::new(),
    }
}

#[test]
fn test_vehicle_supports_matching_type_without_options() {
    let vehicle = create_test_vehicle(false, false);
    let requirements = RideRequirements {
        vehicle_type: VehicleType::Standard,
        baby_transport: false,
        pet_transport: false,
    };
    assert!(vehicle.supports(&requirements));
}

#[test]
fn test_vehicle_rejects_other_type() {
    let vehicle = create_test_vehicle(true, true);
    let requirements = RideRequirements {
        vehicle_type: VehicleType::Van,
        baby_transport: false,
        pet_transport: false,
    };
    assert!(!vehicle.supports(&requirements));
}

#[test]
fn test_vehicle_rejects_missing_capability() {
    let vehicle = create_test_vehicle(false, true);
    let requirements = RideRequirements {
        vehicle_type: VehicleType::Standard,
        baby_transport: true,
        pet_transport: true,
    };
    assert!(!vehicle.supports(&requirements));
}

#[test]
fn test_vehicle_type_parsing() {
    assert_eq!(VehicleType::from_str("luxury"), Ok(VehicleType::Luxury));
    assert_eq!(VehicleType::from_str(" VAN "), Ok(VehicleType::Van));
    assert!(matches!(
        VehicleType::from_str("bicycle"),
        Err(DomainError::InvalidVehicleType(_))
    ));
}

#[test]
fn test_new_ride_records_requester_as_passenger() {
    let ride = Ride::new(&create_test_request(), UserId(7), NOW);
    assert_eq!(ride.created_by, Some(UserId(7)));
    assert!(ride.has_passenger(UserId(7)));
    assert_eq!(ride.driver_id, None);
    assert_eq!(ride.rates(), None);
}

#[test]
fn test_route_preserves_stop_order() {
    let ride = Ride::new(&create_test_request(), UserId(7), NOW);
    let addresses: Vec<&str> = ride.route().iter().map(|p| p.address.as_str()).collect();
    assert_eq!(addresses, vec!["Start", "First", "Second", "End"]);
}

#[test]
fn test_rate_snapshot_is_write_once() {
    let mut ride = Ride::new(&create_test_request(), UserId(7), NOW);
    ride.snapshot_rates(RateSnapshot::new(2.0, 1.0)).unwrap();

    let second = ride.snapshot_rates(RateSnapshot::new(9.0, 9.0));
    assert_eq!(second, Err(DomainError::RateSnapshotAlreadySet));
    assert_eq!(ride.rates(), Some(RateSnapshot::new(2.0, 1.0)));
}

#[test]
fn test_expected_end_uses_start_time_first() {
    let mut ride = Ride::new(&create_test_request(), UserId(7), NOW);
    ride.estimated_duration_minutes = 20;
    assert_eq!(ride.expected_end(), NOW + Duration::minutes(20));

    ride.scheduled_time = Some(NOW + Duration::hours(1));
    assert_eq!(ride.expected_end(), NOW + Duration::minutes(80));

    ride.start_time = Some(NOW - Duration::minutes(15));
    assert_eq!(ride.expected_end(), NOW + Duration::minutes(5));
}

#[test]
fn test_open_session_measures_until_now() {
    let session = ActivitySession {
        session_id: None,
        driver_id: UserId(10),
        start_time: NOW - Duration::hours(2),
        end_time: None,
    };
    assert!(session.is_open());
    assert_eq!(session.duration_until(NOW), Duration::hours(2));
}

#[test]
fn test_closed_session_ignores_now() {
    let session = ActivitySession {
        session_id: None,
        driver_id: UserId(10),
        start_time: NOW - Duration::hours(5),
        end_time: Some(NOW - Duration::hours(4)),
    };
    assert_eq!(session.duration_until(NOW), Duration::hours(1));
}

#[test]
fn test_driver_with_pending_deactivation_is_not_dispatchable() {
    let mut driver = Driver {
        user_id: UserId(10),
        email: None,
        name: None,
        active: true,
        inactive_requested: false,
        enabled: true,
    };
    assert!(driver.is_dispatchable());

    driver.inactive_requested = true;
    assert!(!driver.is_dispatchable());

    driver.inactive_requested = false;
    driver.enabled = false;
    assert!(!driver.is_dispatchable());
}
