// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ride queries.
//!
//! A ride row is rehydrated through `Ride::new` so the rate snapshot is
//! restored through its write-once setter.

use std::collections::BTreeSet;

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{
    GeoPoint, RateSnapshot, Ride, RideId, RideRequirements, RideStatus, UserId,
    ValidatedRideRequest, VehicleId, VehicleType,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::flag;
use crate::diesel_schema::{ride_passengers, rides};
use crate::error::PersistenceError;
use crate::timestamps::{from_nanos, from_nanos_opt};

/// Diesel Queryable struct for ride rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = rides)]
struct RideRow {
    ride_id: i64,
    status: String,
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
    vehicle_type: String,
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

impl RideRow {
    fn into_ride(self, passengers: BTreeSet<UserId>) -> Result<Ride, PersistenceError> {
        let ride_id: i64 = self.ride_id;
        let invalid = |what: &str, detail: String| {
            PersistenceError::InvalidRecord(format!("ride {ride_id}: {what}: {detail}"))
        };

        let status: RideStatus = self
            .status
            .parse()
            .map_err(|e| invalid("status", format!("{e}")))?;
        let vehicle_type: VehicleType = self
            .vehicle_type
            .parse()
            .map_err(|e| invalid("vehicle type", format!("{e}")))?;
        let stops: Vec<GeoPoint> = serde_json::from_str(&self.stops_json)
            .map_err(|e| invalid("stops", e.to_string()))?;
        let invited_emails: Vec<String> = serde_json::from_str(&self.invited_emails_json)
            .map_err(|e| invalid("invited emails", e.to_string()))?;
        let estimated_duration_minutes: u32 = u32::try_from(self.estimated_duration_minutes)
            .map_err(|e| invalid("estimated duration", e.to_string()))?;
        let requested_at: OffsetDateTime = from_nanos(self.requested_at)?;

        let request = ValidatedRideRequest {
            start: GeoPoint {
                address: self.start_address,
                latitude: self.start_latitude,
                longitude: self.start_longitude,
            },
            destination: GeoPoint {
                address: self.end_address,
                latitude: self.end_latitude,
                longitude: self.end_longitude,
            },
            stops,
            requirements: RideRequirements {
                vehicle_type,
                baby_transport: flag(self.baby_transport),
                pet_transport: flag(self.pet_transport),
            },
            scheduled_time: from_nanos_opt(self.scheduled_time)?,
            passenger_emails: Vec::new(),
        };

        let creator: UserId = self.created_by.map_or(UserId(0), UserId);
        let mut ride: Ride = Ride::new(&request, creator, requested_at);
        ride.ride_id = Some(RideId(ride_id));
        ride.status = status;
        ride.driver_id = self.driver_id.map(UserId);
        ride.vehicle_id = self.vehicle_id.map(VehicleId);
        ride.created_by = self.created_by.map(UserId);
        ride.passengers = passengers;
        ride.invited_emails = invited_emails;
        ride.distance = self.distance;
        ride.distance_traveled = self.distance_traveled;
        ride.estimated_cost = self.estimated_cost;
        ride.total_cost = self.total_cost;
        ride.estimated_duration_minutes = estimated_duration_minutes;
        ride.start_time = from_nanos_opt(self.start_time)?;
        ride.end_time = from_nanos_opt(self.end_time)?;
        ride.paid = flag(self.paid);
        ride.passengers_exited = flag(self.passengers_exited);
        ride.rejection_reason = self.rejection_reason;
        ride.cancellation_reason = self.cancellation_reason;

        match (self.rate_base_fare, self.rate_price_per_km) {
            (Some(base_fare), Some(price_per_km)) => ride
                .snapshot_rates(RateSnapshot::new(base_fare, price_per_km))
                .map_err(|e| invalid("rates", e.to_string()))?,
            (None, None) => {}
            _ => {
                return Err(invalid(
                    "rates",
                    String::from("base fare and per-km price must be stored together"),
                ));
            }
        }

        Ok(ride)
    }
}

/// Retrieves the passenger set of a ride.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn passengers_for_ride(
    conn: &mut SqliteConnection,
    ride_id: RideId,
) -> Result<BTreeSet<UserId>, PersistenceError> {
    let ids: Vec<i64> = ride_passengers::table
        .filter(ride_passengers::ride_id.eq(ride_id.value()))
        .select(ride_passengers::passenger_id)
        .load(conn)?;
    Ok(ids.into_iter().map(UserId).collect())
}

fn hydrate(conn: &mut SqliteConnection, row: RideRow) -> Result<Ride, PersistenceError> {
    let passengers: BTreeSet<UserId> = passengers_for_ride(conn, RideId(row.ride_id))?;
    row.into_ride(passengers)
}

/// Retrieves a ride by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be converted.
pub fn find_ride(
    conn: &mut SqliteConnection,
    ride_id: RideId,
) -> Result<Option<Ride>, PersistenceError> {
    debug!(ride_id = ride_id.value(), "Loading ride");
    let row: Option<RideRow> = rides::table
        .filter(rides::ride_id.eq(ride_id.value()))
        .select(RideRow::as_select())
        .first(conn)
        .optional()?;
    row.map(|row| hydrate(conn, row)).transpose()
}

fn status_strings(statuses: &[RideStatus]) -> Vec<&'static str> {
    statuses.iter().map(RideStatus::as_str).collect()
}

/// Retrieves a driver's rides in any of `statuses`, ordered by anchor time
/// (start, else scheduled, else requested) and then by id.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be converted.
pub fn rides_for_driver(
    conn: &mut SqliteConnection,
    driver_id: UserId,
    statuses: &[RideStatus],
) -> Result<Vec<Ride>, PersistenceError> {
    let rows: Vec<RideRow> = rides::table
        .filter(rides::driver_id.eq(driver_id.value()))
        .filter(rides::status.eq_any(status_strings(statuses)))
        .select(RideRow::as_select())
        .load(conn)?;

    let mut found: Vec<Ride> = rows
        .into_iter()
        .map(|row| hydrate(conn, row))
        .collect::<Result<_, _>>()?;
    found.sort_by_key(|ride| (ride.anchor_time(), ride.ride_id));
    Ok(found)
}

/// Returns true if the driver has any ride in one of `statuses`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn driver_has_ride_in(
    conn: &mut SqliteConnection,
    driver_id: UserId,
    statuses: &[RideStatus],
) -> Result<bool, PersistenceError> {
    let count: i64 = rides::table
        .filter(rides::driver_id.eq(driver_id.value()))
        .filter(rides::status.eq_any(status_strings(statuses)))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
