// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{GeoPoint, Vehicle, VehicleId, VehicleStatus};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewVehicle, to_flag};
use crate::diesel_schema::vehicles;
use crate::error::PersistenceError;

/// Registers a vehicle for a driver. New vehicles start `FREE`.
///
/// # Errors
///
/// Returns `PersistenceError::ConstraintViolation` if the driver does not
/// exist or already owns a vehicle.
pub fn create_vehicle(
    conn: &mut SqliteConnection,
    vehicle: &NewVehicle,
) -> Result<VehicleId, PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values((
            vehicles::driver_id.eq(vehicle.driver_id.value()),
            vehicles::vehicle_type.eq(vehicle.vehicle_type.as_str()),
            vehicles::pet_transport.eq(to_flag(vehicle.pet_transport)),
            vehicles::baby_transport.eq(to_flag(vehicle.baby_transport)),
            vehicles::status.eq(VehicleStatus::Free.as_str()),
            vehicles::location_address.eq(&vehicle.location.address),
            vehicles::location_latitude.eq(vehicle.location.latitude),
            vehicles::location_longitude.eq(vehicle.location.longitude),
            vehicles::current_panic.eq(0),
        ))
        .execute(conn)?;

    let vehicle_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        vehicle_id,
        driver_id = vehicle.driver_id.value(),
        "Registered vehicle"
    );
    Ok(VehicleId(vehicle_id))
}

/// Overwrites a vehicle's status, location and panic flag.
///
/// Capabilities and ownership are not touched.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the vehicle does not exist.
pub fn update_vehicle(conn: &mut SqliteConnection, vehicle: &Vehicle) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(vehicles::table)
        .filter(vehicles::vehicle_id.eq(vehicle.vehicle_id.value()))
        .set((
            vehicles::status.eq(vehicle.status.as_str()),
            vehicles::location_address.eq(&vehicle.current_location.address),
            vehicles::location_latitude.eq(vehicle.current_location.latitude),
            vehicles::location_longitude.eq(vehicle.current_location.longitude),
            vehicles::current_panic.eq(to_flag(vehicle.current_panic)),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "vehicle {}",
            vehicle.vehicle_id
        )));
    }
    Ok(())
}

/// Records the latest position reported by the positioning feed.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the vehicle does not exist.
pub fn update_vehicle_location(
    conn: &mut SqliteConnection,
    vehicle_id: VehicleId,
    location: &GeoPoint,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(vehicles::table)
        .filter(vehicles::vehicle_id.eq(vehicle_id.value()))
        .set((
            vehicles::location_address.eq(&location.address),
            vehicles::location_latitude.eq(location.latitude),
            vehicles::location_longitude.eq(location.longitude),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("vehicle {vehicle_id}")));
    }
    Ok(())
}

/// Raises or clears a vehicle's panic flag.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the vehicle does not exist.
pub fn set_vehicle_panic(
    conn: &mut SqliteConnection,
    vehicle_id: VehicleId,
    panic: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(vehicles::table)
        .filter(vehicles::vehicle_id.eq(vehicle_id.value()))
        .set(vehicles::current_panic.eq(to_flag(panic)))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("vehicle {vehicle_id}")));
    }
    Ok(())
}
