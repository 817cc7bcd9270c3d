// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    DomainError, GeoPoint, RequirementsDraft, RideRequestDraft, ValidatedRideRequest,
    VehicleType, normalize_email, validate_distance_increment, validate_geo_point,
    validate_ride_request,
};

const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

fn horizon() -> Duration {
    Duration::hours(5)
}

fn create_valid_draft() -> RideRequestDraft {
    RideRequestDraft {
        start: Some(GeoPoint::new("Bulevar oslobodjenja 1", 45.2550, 19.8450)),
        destination: Some(GeoPoint::new("Zmaj Jovina 10", 45.2570, 19.8460)),
        stops: vec![GeoPoint::new("Trg slobode", 45.2555, 19.8452)],
        requirements: Some(RequirementsDraft {
            vehicle_type: Some(VehicleType::Standard),
            baby_transport: true,
            pet_transport: false,
        }),
        scheduled_time: None,
        passenger_emails: vec![String::from("friend@rides.test")],
    }
}

#[test]
fn test_valid_request_is_accepted() {
    let validated: ValidatedRideRequest =
        validate_ride_request(create_valid_draft(), NOW, horizon()).unwrap();

    assert_eq!(validated.requirements.vehicle_type, VehicleType::Standard);
    assert!(validated.requirements.baby_transport);
    assert_eq!(validated.stops.len(), 1);
    assert_eq!(validated.passenger_emails.len(), 1);
}

#[test]
fn test_missing_start_is_rejected() {
    let mut draft = create_valid_draft();
    draft.start = None;
    let result = validate_ride_request(draft, NOW, horizon());
    assert_eq!(result, Err(DomainError::MissingField { field: "start" }));
}

#[test]
fn test_missing_destination_is_rejected() {
    let mut draft = create_valid_draft();
    draft.destination = None;
    let result = validate_ride_request(draft, NOW, horizon());
    assert_eq!(
        result,
        Err(DomainError::MissingField {
            field: "destination"
        })
    );
}

#[test]
fn test_missing_requirements_is_rejected() {
    let mut draft = create_valid_draft();
    draft.requirements = None;
    let result = validate_ride_request(draft, NOW, horizon());
    assert_eq!(
        result,
        Err(DomainError::MissingField {
            field: "requirements"
        })
    );
}

#[test]
fn test_missing_vehicle_type_is_rejected() {
    let mut draft = create_valid_draft();
    draft.requirements = Some(RequirementsDraft::default());
    let result = validate_ride_request(draft, NOW, horizon());
    assert_eq!(
        result,
        Err(DomainError::MissingField {
            field: "requirements.vehicle_type"
        })
    );
}

#[test]
fn test_blank_address_is_rejected() {
    let point = GeoPoint::new("   ", 45.0, 19.0);
    assert!(matches!(
        validate_geo_point("start", &point),
        Err(DomainError::InvalidLocation { .. })
    ));
}

#[test]
fn test_out_of_range_coordinates_are_rejected() {
    assert!(validate_geo_point("start", &GeoPoint::new("A", 90.5, 0.0)).is_err());
    assert!(validate_geo_point("start", &GeoPoint::new("A", -90.5, 0.0)).is_err());
    assert!(validate_geo_point("start", &GeoPoint::new("A", 0.0, 180.5)).is_err());
    assert!(validate_geo_point("start", &GeoPoint::new("A", 0.0, f64::NAN)).is_err());
    assert!(validate_geo_point("start", &GeoPoint::new("A", 90.0, -180.0)).is_ok());
}

#[test]
fn test_invalid_stop_names_its_index() {
    let mut draft = create_valid_draft();
    draft.stops.push(GeoPoint::new("Bad", 200.0, 0.0));
    match validate_ride_request(draft, NOW, horizon()) {
        Err(DomainError::InvalidLocation { field, .. }) => assert_eq!(field, "stops[1]"),
        other => panic!("Expected InvalidLocation, got {other:?}"),
    }
}

#[test]
fn test_scheduled_time_in_past_is_rejected() {
    let mut draft = create_valid_draft();
    draft.scheduled_time = Some(NOW - Duration::minutes(1));
    assert!(matches!(
        validate_ride_request(draft, NOW, horizon()),
        Err(DomainError::InvalidScheduledTime { .. })
    ));
}

#[test]
fn test_scheduled_time_equal_to_now_is_rejected() {
    let mut draft = create_valid_draft();
    draft.scheduled_time = Some(NOW);
    assert!(validate_ride_request(draft, NOW, horizon()).is_err());
}

#[test]
fn test_scheduled_time_beyond_horizon_is_rejected() {
    let mut draft = create_valid_draft();
    draft.scheduled_time = Some(NOW + Duration::hours(6));
    assert!(matches!(
        validate_ride_request(draft, NOW, horizon()),
        Err(DomainError::InvalidScheduledTime { .. })
    ));
}

#[test]
fn test_scheduled_time_within_horizon_is_preserved() {
    let scheduled: OffsetDateTime = NOW + Duration::hours(3);
    let mut draft = create_valid_draft();
    draft.scheduled_time = Some(scheduled);
    let validated = validate_ride_request(draft, NOW, horizon()).unwrap();
    assert_eq!(validated.scheduled_time, Some(scheduled));
}

#[test]
fn test_scheduled_time_at_horizon_is_accepted() {
    let mut draft = create_valid_draft();
    draft.scheduled_time = Some(NOW + horizon());
    assert!(validate_ride_request(draft, NOW, horizon()).is_ok());
}

#[test]
fn test_distance_increment_validation() {
    assert!(validate_distance_increment(0.0).is_ok());
    assert!(validate_distance_increment(1.25).is_ok());
    assert!(validate_distance_increment(-0.1).is_err());
    assert!(validate_distance_increment(f64::INFINITY).is_err());
}

#[test]
fn test_normalize_email() {
    assert_eq!(
        normalize_email("  Ana@Rides.Test "),
        Some(String::from("ana@rides.test"))
    );
    assert_eq!(normalize_email("   "), None);
}
