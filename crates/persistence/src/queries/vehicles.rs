// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{
    GeoPoint, RideRequirements, UserId, UserRole, Vehicle, VehicleId, VehicleStatus, VehicleType,
};
use tracing::debug;

use crate::data_models::{flag, to_flag};
use crate::diesel_schema::{users, vehicles};
use crate::error::PersistenceError;

/// Diesel Queryable struct for vehicle rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vehicles)]
struct VehicleRow {
    vehicle_id: i64,
    driver_id: i64,
    vehicle_type: String,
    pet_transport: i32,
    baby_transport: i32,
    status: String,
    location_address: String,
    location_latitude: f64,
    location_longitude: f64,
    current_panic: i32,
}

impl VehicleRow {
    fn into_vehicle(self) -> Result<Vehicle, PersistenceError> {
        let invalid = |e: ride_dispatch_domain::DomainError| {
            PersistenceError::InvalidRecord(format!("vehicle {}: {e}", self.vehicle_id))
        };
        let vehicle_type: VehicleType = self.vehicle_type.parse().map_err(invalid)?;
        let status: VehicleStatus = self.status.parse().map_err(invalid)?;
        Ok(Vehicle {
            vehicle_id: VehicleId(self.vehicle_id),
            driver_id: UserId(self.driver_id),
            vehicle_type,
            pet_transport: flag(self.pet_transport),
            baby_transport: flag(self.baby_transport),
            status,
            current_location: GeoPoint {
                address: self.location_address,
                latitude: self.location_latitude,
                longitude: self.location_longitude,
            },
            current_panic: flag(self.current_panic),
        })
    }
}

/// Retrieves vehicles that can serve `requirements` and whose driver is
/// dispatchable (active, enabled, no pending deactivation).
///
/// Capabilities the ride does not request are not filtered on. Results are
/// ordered by vehicle id.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be converted.
pub fn active_vehicles_matching(
    conn: &mut SqliteConnection,
    requirements: &RideRequirements,
) -> Result<Vec<Vehicle>, PersistenceError> {
    debug!(
        vehicle_type = requirements.vehicle_type.as_str(),
        pet_transport = requirements.pet_transport,
        baby_transport = requirements.baby_transport,
        "Querying candidate vehicles"
    );

    let mut query = vehicles::table
        .inner_join(users::table)
        .filter(users::role.eq(UserRole::Driver.as_str()))
        .filter(users::active.eq(1))
        .filter(users::enabled.eq(1))
        .filter(users::inactive_requested.eq(0))
        .filter(vehicles::vehicle_type.eq(requirements.vehicle_type.as_str()))
        .select(VehicleRow::as_select())
        .order(vehicles::vehicle_id.asc())
        .into_boxed();

    if requirements.pet_transport {
        query = query.filter(vehicles::pet_transport.eq(to_flag(true)));
    }
    if requirements.baby_transport {
        query = query.filter(vehicles::baby_transport.eq(to_flag(true)));
    }

    let rows: Vec<VehicleRow> = query.load(conn)?;
    rows.into_iter().map(VehicleRow::into_vehicle).collect()
}

/// Retrieves the vehicle owned by a driver.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
pub fn vehicle_for_driver(
    conn: &mut SqliteConnection,
    driver_id: UserId,
) -> Result<Option<Vehicle>, PersistenceError> {
    vehicles::table
        .filter(vehicles::driver_id.eq(driver_id.value()))
        .select(VehicleRow::as_select())
        .first(conn)
        .optional()?
        .map(VehicleRow::into_vehicle)
        .transpose()
}

/// Retrieves a vehicle by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
pub fn find_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: VehicleId,
) -> Result<Option<Vehicle>, PersistenceError> {
    vehicles::table
        .filter(vehicles::vehicle_id.eq(vehicle_id.value()))
        .select(VehicleRow::as_select())
        .first(conn)
        .optional()?
        .map(VehicleRow::into_vehicle)
        .transpose()
}
