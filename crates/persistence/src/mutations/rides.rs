// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride mutations.
//!
//! The passenger set lives in `ride_passengers` and is rewritten together with
//! the ride row.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{RateSnapshot, Ride, RideId, UserId};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::to_flag;
use crate::diesel_schema::{ride_passengers, rides};
use crate::error::PersistenceError;
use crate::timestamps::{to_nanos, to_nanos_opt};

/// Every ride column except the id, used for both insert and update.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = rides)]
#[diesel(treat_none_as_null = true)]
struct RideRecord {
    status: &'static str,
    driver_id: Option<i64>,
    vehicle_id: Option<i64>,
    created_by: Option<i64>,
    invited_emails_json: String,
    start_address: String,
    start_latitude: f64,
    start_longitude: f64,
    end_address: String,
    end_latitude: f64,
    end_longitude: f64,
    stops_json: String,
    vehicle_type: &'static str,
    baby_transport: i32,
    pet_transport: i32,
    rate_base_fare: Option<f64>,
    rate_price_per_km: Option<f64>,
    distance: f64,
    distance_traveled: Option<f64>,
    estimated_cost: f64,
    total_cost: Option<f64>,
    estimated_duration_minutes: i32,
    requested_at: i64,
    scheduled_time: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    paid: i32,
    passengers_exited: i32,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
}

impl RideRecord {
    fn from_ride(ride: &Ride) -> Result<Self, PersistenceError> {
        let rates: Option<RateSnapshot> = ride.rates();
        let estimated_duration_minutes: i32 = i32::try_from(ride.estimated_duration_minutes)
            .map_err(|e| {
                PersistenceError::InvalidRecord(format!("estimated duration out of range: {e}"))
            })?;

        Ok(Self {
            status: ride.status.as_str(),
            driver_id: ride.driver_id.map(|id| id.value()),
            vehicle_id: ride.vehicle_id.map(|id| id.value()),
            created_by: ride.created_by.map(|id| id.value()),
            invited_emails_json: serde_json::to_string(&ride.invited_emails)?,
            start_address: ride.start_location.address.clone(),
            start_latitude: ride.start_location.latitude,
            start_longitude: ride.start_location.longitude,
            end_address: ride.end_location.address.clone(),
            end_latitude: ride.end_location.latitude,
            end_longitude: ride.end_location.longitude,
            stops_json: serde_json::to_string(&ride.stops)?,
            vehicle_type: ride.requirements.vehicle_type.as_str(),
            baby_transport: to_flag(ride.requirements.baby_transport),
            pet_transport: to_flag(ride.requirements.pet_transport),
            rate_base_fare: rates.map(|r| r.base_fare),
            rate_price_per_km: rates.map(|r| r.price_per_km),
            distance: ride.distance,
            distance_traveled: ride.distance_traveled,
            estimated_cost: ride.estimated_cost,
            total_cost: ride.total_cost,
            estimated_duration_minutes,
            requested_at: to_nanos(ride.requested_at)?,
            scheduled_time: to_nanos_opt(ride.scheduled_time)?,
            start_time: to_nanos_opt(ride.start_time)?,
            end_time: to_nanos_opt(ride.end_time)?,
            paid: to_flag(ride.paid),
            passengers_exited: to_flag(ride.passengers_exited),
            rejection_reason: ride.rejection_reason.clone(),
            cancellation_reason: ride.cancellation_reason.clone(),
        })
    }
}

fn write_passengers(
    conn: &mut SqliteConnection,
    ride_id: RideId,
    passengers: impl IntoIterator<Item = UserId>,
) -> Result<(), PersistenceError> {
    diesel::delete(ride_passengers::table.filter(ride_passengers::ride_id.eq(ride_id.value())))
        .execute(conn)?;
    for passenger in passengers {
        diesel::insert_into(ride_passengers::table)
            .values((
                ride_passengers::ride_id.eq(ride_id.value()),
                ride_passengers::passenger_id.eq(passenger.value()),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts a new ride and its passengers, returning the assigned id.
///
/// The id already present on `ride`, if any, is ignored.
///
/// # Errors
///
/// Returns an error if the ride cannot be serialized or a constraint
/// rejects the insert.
pub fn insert_ride(conn: &mut SqliteConnection, ride: &Ride) -> Result<RideId, PersistenceError> {
    let record: RideRecord = RideRecord::from_ride(ride)?;
    diesel::insert_into(rides::table)
        .values(&record)
        .execute(conn)?;

    let ride_id: RideId = RideId(get_last_insert_rowid(conn)?);
    write_passengers(conn, ride_id, ride.passengers.iter().copied())?;

    info!(
        ride_id = ride_id.value(),
        status = ride.status.as_str(),
        driver_id = ride.driver_id.map(|id| id.value()),
        "Inserted ride"
    );
    Ok(ride_id)
}

/// Overwrites every column of a persisted ride and its passenger set.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidRecord` if the ride has no id and
/// `PersistenceError::NotFound` if no row has that id.
pub fn update_ride(conn: &mut SqliteConnection, ride: &Ride) -> Result<(), PersistenceError> {
    let ride_id: RideId = ride.ride_id.ok_or_else(|| {
        PersistenceError::InvalidRecord(String::from("cannot update a ride without an id"))
    })?;
    let record: RideRecord = RideRecord::from_ride(ride)?;

    let updated: usize = diesel::update(rides::table.filter(rides::ride_id.eq(ride_id.value())))
        .set(&record)
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("ride {ride_id}")));
    }

    write_passengers(conn, ride_id, ride.passengers.iter().copied())?;
    debug!(
        ride_id = ride_id.value(),
        status = ride.status.as_str(),
        "Updated ride"
    );
    Ok(())
}
