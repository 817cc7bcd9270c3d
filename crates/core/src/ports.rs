// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store ports used by the dispatch engine and lifecycle manager.
//!
//! Every operation runs against one store value for its whole unit of work.
//! Implementations are expected to provide read-then-write atomicity for
//! that unit (the persistence crate does so with an immediate transaction).

use ride_dispatch_domain::{
    ActivitySession, Driver, Passenger, Ride, RideId, RideRequirements, RideStatus, SessionId,
    UserId, Vehicle,
};
use time::OffsetDateTime;

use crate::error::StoreError;

/// Ride storage.
pub trait RideRepository {
    /// Loads a ride by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_ride(&mut self, ride_id: RideId) -> Result<Option<Ride>, StoreError>;

    /// Persists a new ride and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_ride(&mut self, ride: &Ride) -> Result<RideId, StoreError>;

    /// Overwrites a persisted ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the ride has no id or the store fails.
    fn update_ride(&mut self, ride: &Ride) -> Result<(), StoreError>;

    /// Returns the driver's rides in any of `statuses`, ordered by
    /// `Ride::anchor_time` ascending, then by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn rides_for_driver(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<Vec<Ride>, StoreError>;

    /// Returns true if the driver has at least one ride in any of `statuses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn driver_has_ride_in(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<bool, StoreError>;
}

/// Vehicle storage.
pub trait VehicleRepository {
    /// Returns vehicles whose driver is dispatchable and whose type and
    /// capability flags satisfy `requirements`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn active_vehicles_matching(
        &mut self,
        requirements: &RideRequirements,
    ) -> Result<Vec<Vehicle>, StoreError>;

    /// Returns the vehicle owned by a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn vehicle_for_driver(&mut self, driver_id: UserId) -> Result<Option<Vehicle>, StoreError>;

    /// Overwrites a vehicle's availability fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn update_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError>;
}

/// Account storage.
pub trait UserRepository {
    /// Loads a driver account.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_driver(&mut self, user_id: UserId) -> Result<Option<Driver>, StoreError>;

    /// Persists a driver's availability flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn update_driver(&mut self, driver: &Driver) -> Result<(), StoreError>;

    /// Loads a passenger account.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_passenger(&mut self, user_id: UserId) -> Result<Option<Passenger>, StoreError>;

    /// Looks up a passenger account by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_passenger_by_email(&mut self, email: &str) -> Result<Option<Passenger>, StoreError>;
}

/// Driver activity session storage.
pub trait ActivityRepository {
    /// Returns the driver's sessions that started at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn sessions_since(
        &mut self,
        driver_id: UserId,
        since: OffsetDateTime,
    ) -> Result<Vec<ActivitySession>, StoreError>;

    /// Returns the driver's open session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn open_session(&mut self, driver_id: UserId) -> Result<Option<ActivitySession>, StoreError>;

    /// Sets the end time of an open session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn close_session(
        &mut self,
        session_id: SessionId,
        end_time: OffsetDateTime,
    ) -> Result<(), StoreError>;
}

/// Everything a dispatch or lifecycle operation needs from storage.
pub trait DispatchStore:
    RideRepository + VehicleRepository + UserRepository + ActivityRepository
{
}

impl<T> DispatchStore for T where
    T: RideRepository + VehicleRepository + UserRepository + ActivityRepository + ?Sized
{
}
