// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store port implementation over a borrowed `SQLite` connection.

use diesel::SqliteConnection;
use ride_dispatch::{
    ActivityRepository, RideRepository, StoreError, UserRepository, VehicleRepository,
};
use ride_dispatch_domain::{
    ActivitySession, Driver, Passenger, Ride, RideId, RideRequirements, RideStatus, SessionId,
    UserId, Vehicle,
};
use time::OffsetDateTime;

use crate::{mutations, queries};

/// The dispatch store for one unit of work.
///
/// Obtained from `Persistence::transaction`; every call runs inside that
/// transaction.
pub struct SqliteStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteStore<'a> {
    pub(crate) const fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl RideRepository for SqliteStore<'_> {
    fn find_ride(&mut self, ride_id: RideId) -> Result<Option<Ride>, StoreError> {
        Ok(queries::rides::find_ride(self.conn, ride_id)?)
    }

    fn insert_ride(&mut self, ride: &Ride) -> Result<RideId, StoreError> {
        Ok(mutations::rides::insert_ride(self.conn, ride)?)
    }

    fn update_ride(&mut self, ride: &Ride) -> Result<(), StoreError> {
        Ok(mutations::rides::update_ride(self.conn, ride)?)
    }

    fn rides_for_driver(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<Vec<Ride>, StoreError> {
        Ok(queries::rides::rides_for_driver(
            self.conn, driver_id, statuses,
        )?)
    }

    fn driver_has_ride_in(
        &mut self,
        driver_id: UserId,
        statuses: &[RideStatus],
    ) -> Result<bool, StoreError> {
        Ok(queries::rides::driver_has_ride_in(
            self.conn, driver_id, statuses,
        )?)
    }
}

impl VehicleRepository for SqliteStore<'_> {
    fn active_vehicles_matching(
        &mut self,
        requirements: &RideRequirements,
    ) -> Result<Vec<Vehicle>, StoreError> {
        Ok(queries::vehicles::active_vehicles_matching(
            self.conn,
            requirements,
        )?)
    }

    fn vehicle_for_driver(&mut self, driver_id: UserId) -> Result<Option<Vehicle>, StoreError> {
        Ok(queries::vehicles::vehicle_for_driver(self.conn, driver_id)?)
    }

    fn update_vehicle(&mut self, vehicle: &Vehicle) -> Result<(), StoreError> {
        Ok(mutations::vehicles::update_vehicle(self.conn, vehicle)?)
    }
}

impl UserRepository for SqliteStore<'_> {
    fn find_driver(&mut self, user_id: UserId) -> Result<Option<Driver>, StoreError> {
        Ok(queries::users::find_driver(self.conn, user_id)?)
    }

    fn update_driver(&mut self, driver: &Driver) -> Result<(), StoreError> {
        Ok(mutations::users::update_driver(self.conn, driver)?)
    }

    fn find_passenger(&mut self, user_id: UserId) -> Result<Option<Passenger>, StoreError> {
        Ok(queries::users::find_passenger(self.conn, user_id)?)
    }

    fn find_passenger_by_email(&mut self, email: &str) -> Result<Option<Passenger>, StoreError> {
        Ok(queries::users::find_passenger_by_email(self.conn, email)?)
    }
}

impl ActivityRepository for SqliteStore<'_> {
    fn sessions_since(
        &mut self,
        driver_id: UserId,
        since: OffsetDateTime,
    ) -> Result<Vec<ActivitySession>, StoreError> {
        Ok(queries::activity::sessions_since(self.conn, driver_id, since)?)
    }

    fn open_session(&mut self, driver_id: UserId) -> Result<Option<ActivitySession>, StoreError> {
        Ok(queries::activity::open_session(self.conn, driver_id)?)
    }

    fn close_session(
        &mut self,
        session_id: SessionId,
        end_time: OffsetDateTime,
    ) -> Result<(), StoreError> {
        Ok(mutations::activity::close_session(
            self.conn, session_id, end_time,
        )?)
    }
}
