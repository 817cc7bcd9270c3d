// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use ride_dispatch_domain::{
    ActivitySession, Driver, GeoPoint, Passenger, RateSnapshot, Ride, RideId, RideRequestDraft,
    RideRequirements, RideStatus, RequirementsDraft, SessionId, UserId, UserRole,
    ValidatedRideRequest, Vehicle, VehicleId, VehicleStatus, VehicleType,
};
use ride_dispatch_events::Actor;
use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    ActivityRepository, PriceTable, RideRepository, StoreError, UserRepository,
    VehicleRepository,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

pub const PASSENGER: UserId = UserId(1);
pub const ADMIN: UserId = UserId(99);

/// Kilometres per degree of latitude on the haversine sphere.
pub const KM_PER_DEGREE: f64 = 111.194_926_644_558_74;

/// In-memory implementation of every store port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub rides: BTreeMap<RideId, Ride>,
    pub vehicles: BTreeMap<VehicleId, Vehicle>,
    pub drivers: BTreeMap<UserId, Driver>,
    pub passengers: BTreeMap<UserId, Passenger>,
    pub sessions: Vec<ActivitySession>,
    next_ride_id: i64,
}

impl MemoryStore {
    pub fn with_passenger() -> Self {
        let mut store = Self::default();
        store.add_passenger(PASSENGER, Some("rider@rides.test"), Some("Rider"));
        store
    }

    pub fn add_passenger(&mut self, user_id: UserId, email: Option<&str>, name: Option<&str>) {
        self.passengers.insert(
            user_id,
            Passenger {
                user_id,
                email: email.map(str::to_string),
                name: name.map(str::to_string),
            },
        );
    }

    /// Adds an active driver with a free standard vehicle `km_north` of the pickup.
    ///
    /// The vehicle id equals the driver id.
    pub fn add_driver(&mut self, driver_id: i64, km_north: f64) -> VehicleId {
        self.add_driver_with(driver_id, km_north, VehicleType::Standard, false, false)
    }

    pub fn add_driver_with(
        &mut self,
        driver_id: i64,
        km_north: f64,
        vehicle_type: VehicleType,
        pet_transport: bool,
        baby_transport: bool,
    ) -> VehicleId {
        let user_id: UserId = UserId(driver_id);
        let vehicle_id: VehicleId = VehicleId(driver_id);
        self.drivers.insert(
            user_id,
            Driver {
                user_id,
                email: Some(format!("driver{driver_id}@rides.test")),
                name: Some(format!("Driver {driver_id}")),
                active: true,
                inactive_requested: false,
                enabled: true,
            },
        );
        let pickup: GeoPoint = pickup();
        self.vehicles.insert(
            vehicle_id,
            Vehicle {
                vehicle_id,
                driver_id: user_id,
                vehicle_type,
                pet_transport,
                baby_transport,
                status: VehicleStatus::Free,
                current_location: GeoPoint::new(
                    "Somewhere",
                    pickup.latitude + km_north / KM_PER_DEGREE,
                    pickup.longitude,
                ),
                current_panic: false,
            },
        );
        vehicle_id
    }

    pub fn add_session(
        &mut self,
        driver_id: UserId,
        start_time: OffsetDateTime,
        end_time: Option<OffsetDateTime>,
    ) {
        let session_id: SessionId =
            SessionId(i64::try_from(self.sessions.len()).unwrap_or(0) + 1);
        self.sessions.push(ActivitySession {
            session_id: Some(session_id),
            driver_id,
            start_time,
            end_time,
        });
    }

    /// Stores a ride already assigned to `driver_id` in `status` and marks the
    /// vehicle busy.
    pub fn add_assigned_ride(
        &mut self,
        driver_id: i64,
        status: RideStatus,
        rates: Option<RateSnapshot>,
    ) -> RideId {
        let mut ride: Ride = Ride::new(&request_to(destination()), PASSENGER, NOW);
        ride.status = status;
        ride.driver_id = Some(UserId(driver_id));
        ride.vehicle_id = Some(VehicleId(driver_id));
        if let Some(rates) = rates {
            ride.snapshot_rates(rates).unwrap();
        }
        if let Some(vehicle) = self.vehicles.get_mut(&VehicleId(driver_id)) {
            vehicle.status = VehicleStatus::Busy;
        }
        self.insert_ride(&ride).unwrap()
    }

    pub fn ride(&self, ride_id: RideId) -> &Ride {
        self.rides.get(&ride_id).unwrap()
    }

    pub fn vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        self.vehicles.get(&vehicle_id).unwrap()
    }
}

impl RideRepository for MemoryStore {
    fn find_ride(&mut self, ride_id: RideId) -> Result<Option<Ride>, StoreError> {
        Ok(self.rides.get(&ride_id).cloned())
    }

    fn insert_ride(&mut self, ride: &Ride) -> Result<RideId, StoreError> {
        self.next_ride_id += 1;
        let ride_id: RideId = RideId(self.next_ride_id);
        let mut stored: Ride = ride.clone();
        stored.ride_id = Some(ride_id);
        self.rides.insert(ride_id, stored);
        Ok(ride_id)
    }

    fn update_ride(&mut self, ride: &Ride) -> Result<(), StoreError> {
        let ride_id: RideId = ride
            .ride_id
            .ok_or_else(|| StoreError::Backend(String::from("ride has no id")))?;
        self.rides.insert(ride_id, ride.clone());
        Ok(())
    }

    fn rides_for_driver(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<Vec<Ride>, StoreError> {
        let mut rides: Vec<Ride> = self
            .rides
            .values()
            .filter(|r| r.is_driven_by(driver_id) && statuses.contains(&r.status))
            .cloned()
            .collect();
        rides.sort_by_key(|r| (r.anchor_time(), r.ride_id));
        Ok(rides)
    }

    fn driver_has_ride_in(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<bool, StoreError> {
        Ok(self
            .rides
            .values()
            .any(|r| r.is_driven_by(driver_id) && statuses.contains(&r.status)))
    }
}

impl VehicleRepository for MemoryStore {
    fn active_vehicles_matching(
        &mut self,
        requirements: &RideRequirements,
    ) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self
            .vehicles
            .values()
            .filter(|v| {
                self.drivers
                    .get(&v.driver_id)
                    .is_some_and(Driver::is_dispatchable)
                    && v.supports(requirements)
            })
            .cloned()
            .collect())
    }

    fn vehicle_for_driver(&mut self, driver_id: UserId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .vehicles
            .values()
            .find(|v| v.driver_id == driver_id)
            .cloned())
    }

    fn update_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.vehicles.insert(vehicle.vehicle_id, vehicle.clone());
        Ok(())
    }
}

impl UserRepository for MemoryStore {
    fn find_driver(&mut self, user_id: UserId) -> Result<Option<Driver>, StoreError> {
        Ok(self.drivers.get(&user_id).cloned())
    }

    fn update_driver(&mut self, driver: &Driver) -> Result<(), StoreError> {
        self.drivers.insert(driver.user_id, driver.clone());
        Ok(())
    }

    fn find_passenger(&mut self, user_id: UserId) -> Result<Option<Passenger>, StoreError> {
        Ok(self.passengers.get(&user_id).cloned())
    }

    fn find_passenger_by_email(&mut self, email: &str) -> Result<Option<Passenger>, StoreError> {
        Ok(self
            .passengers
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }
}

impl ActivityRepository for MemoryStore {
    fn sessions_since(
        &mut self,
        driver_id: UserId,
        since: OffsetDateTime,
    ) -> Result<Vec<ActivitySession>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.driver_id == driver_id && s.start_time >= since)
            .cloned()
            .collect())
    }

    fn open_session(&mut self, driver_id: UserId) -> Result<Option<ActivitySession>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .find(|s| s.driver_id == driver_id && s.is_open())
            .cloned())
    }

    fn close_session(
        &mut self,
        session_id: SessionId,
        end_time: OffsetDateTime,
    ) -> Result<(), StoreError> {
        if let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.session_id == Some(session_id))
        {
            session.end_time = Some(end_time);
        }
        Ok(())
    }
}

pub fn pickup() -> GeoPoint {
    GeoPoint::new("Bulevar oslobodjenja 1", 45.2550, 19.8450)
}

pub fn destination() -> GeoPoint {
    GeoPoint::new("Zmaj Jovina 10", 45.2640, 19.8450)
}

pub fn passenger_actor() -> Actor {
    Actor::new(PASSENGER, UserRole::Passenger)
}

pub fn driver_actor(driver_id: i64) -> Actor {
    Actor::new(UserId(driver_id), UserRole::Driver)
}

pub fn admin_actor() -> Actor {
    Actor::new(ADMIN, UserRole::Admin)
}

pub fn standard_prices() -> PriceTable {
    let mut prices: PriceTable = PriceTable::empty();
    prices.set_rates(VehicleType::Standard, RateSnapshot::new(2.0, 1.5));
    prices.set_rates(VehicleType::Van, RateSnapshot::new(4.0, 2.0));
    prices
}

pub fn create_draft() -> RideRequestDraft {
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

pub fn request_to(destination: GeoPoint) -> ValidatedRideRequest {
    ValidatedRideRequest {
        start: pickup(),
        destination,
        stops: Vec::new(),
        requirements: RideRequirements {
            vehicle_type: VehicleType::Standard,
            baby_transport: false,
            pet_transport: false,
        },
        scheduled_time: None,
        passenger_emails: Vec::new(),
    }
}

/// Puts the driver's only committed ride in progress, expected to end `minutes_left` from now.
pub fn add_ride_ending_in(store: &mut MemoryStore, driver_id: i64, minutes_left: i64) -> RideId {
    let ride_id: RideId = store.add_assigned_ride(driver_id, RideStatus::InProgress, None);
    let ride: &mut Ride = store.rides.get_mut(&ride_id).unwrap();
    ride.estimated_duration_minutes = 30;
    ride.start_time = Some(NOW + Duration::minutes(minutes_left - 30));
    ride_id
}
