// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the ride dispatch service.
//!
//! This crate implements the dispatch store ports on top of Diesel and
//! `SQLite`. Migrations are embedded and applied when a database is opened,
//! and foreign key enforcement is verified before the adapter is handed out.
//!
//! ## Units of work
//!
//! Every dispatch or lifecycle operation runs inside
//! [`Persistence::transaction`], which opens a `BEGIN IMMEDIATE` transaction
//! and hands the closure a [`SqliteStore`]. Returning an error rolls back
//! everything the closure wrote.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives each caller its own shared-cache
//! in-memory database, so tests are isolated without touching the disk.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::{Connection, SqliteConnection};
use ride_dispatch_domain::{
    ActivitySession, Driver, GeoPoint, Ride, RideId, SessionId, UserId, UserRole, Vehicle,
    VehicleId,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;
mod timestamps;

#[cfg(test)]
mod tests;

pub use data_models::{NewVehicle, UserData};
pub use error::PersistenceError;
pub use store::SqliteStore;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Carries either the closure's own error or a failure of the transaction
/// itself (begin, commit, rollback).
enum TxError<E> {
    Diesel(diesel::result::Error),
    Inner(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

/// Persistence adapter owning a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Runs `operation` as one atomic unit of work.
    ///
    /// The transaction is opened with `BEGIN IMMEDIATE`, so the write lock is
    /// held from the first read. If `operation` returns an error, every write
    /// it made is rolled back and the error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `PersistenceError` converted into `E`
    /// if the transaction cannot be opened or committed.
    pub fn transaction<T, E, F>(&mut self, operation: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteStore<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        let result: Result<T, TxError<E>> = self.conn.immediate_transaction(|conn| {
            let mut store: SqliteStore<'_> = SqliteStore::new(conn);
            operation(&mut store).map_err(TxError::Inner)
        });

        result.map_err(|err| match err {
            TxError::Inner(inner) => inner,
            TxError::Diesel(db_err) => E::from(PersistenceError::from(db_err)),
        })
    }

    // ========================================================================
    // Seeding helpers
    // ========================================================================

    /// Registers a passenger account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the insert fails.
    pub fn create_passenger(
        &mut self,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserId, PersistenceError> {
        mutations::users::create_user(
            &mut self.conn,
            UserRole::Passenger,
            Some(email),
            name,
            false,
        )
    }

    /// Registers a driver account.
    ///
    /// # Arguments
    ///
    /// * `email` - The contact email
    /// * `name` - The display name, if any
    /// * `active` - Whether the driver starts on duty
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the insert fails.
    pub fn create_driver(
        &mut self,
        email: &str,
        name: Option<&str>,
        active: bool,
    ) -> Result<UserId, PersistenceError> {
        mutations::users::create_user(&mut self.conn, UserRole::Driver, Some(email), name, active)
    }

    /// Registers an administrator account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the insert fails.
    pub fn create_admin(
        &mut self,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserId, PersistenceError> {
        mutations::users::create_user(&mut self.conn, UserRole::Admin, Some(email), name, false)
    }

    /// Registers a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unknown or already owns a vehicle.
    pub fn create_vehicle(&mut self, vehicle: &NewVehicle) -> Result<VehicleId, PersistenceError> {
        mutations::vehicles::create_vehicle(&mut self.conn, vehicle)
    }

    /// Opens an activity session for a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver already has an open session.
    pub fn start_activity_session(
        &mut self,
        driver_id: UserId,
        start_time: OffsetDateTime,
    ) -> Result<SessionId, PersistenceError> {
        mutations::activity::start_session(&mut self.conn, driver_id, start_time)
    }

    /// Closes an activity session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or already closed.
    pub fn close_activity_session(
        &mut self,
        session_id: SessionId,
        end_time: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::activity::close_session(&mut self.conn, session_id, end_time)
    }

    /// Records a vehicle position from the positioning feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle is unknown.
    pub fn update_vehicle_location(
        &mut self,
        vehicle_id: VehicleId,
        location: &GeoPoint,
    ) -> Result<(), PersistenceError> {
        mutations::vehicles::update_vehicle_location(&mut self.conn, vehicle_id, location)
    }

    /// Raises or clears a vehicle's panic flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle is unknown.
    pub fn set_vehicle_panic(
        &mut self,
        vehicle_id: VehicleId,
        panic: bool,
    ) -> Result<(), PersistenceError> {
        mutations::vehicles::set_vehicle_panic(&mut self.conn, vehicle_id, panic)
    }

    /// Persists a driver's availability flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unknown.
    pub fn update_driver(&mut self, driver: &Driver) -> Result<(), PersistenceError> {
        mutations::users::update_driver(&mut self.conn, driver)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Retrieves any user account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_user(&mut self, user_id: UserId) -> Result<Option<UserData>, PersistenceError> {
        queries::users::find_user(&mut self.conn, user_id)
    }

    /// Retrieves a driver account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_driver(&mut self, user_id: UserId) -> Result<Option<Driver>, PersistenceError> {
        queries::users::find_driver(&mut self.conn, user_id)
    }

    /// Retrieves a ride.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_ride(&mut self, ride_id: RideId) -> Result<Option<Ride>, PersistenceError> {
        queries::rides::find_ride(&mut self.conn, ride_id)
    }

    /// Retrieves a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_vehicle(
        &mut self,
        vehicle_id: VehicleId,
    ) -> Result<Option<Vehicle>, PersistenceError> {
        queries::vehicles::find_vehicle(&mut self.conn, vehicle_id)
    }

    /// Retrieves the vehicle owned by a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn vehicle_for_driver(
        &mut self,
        driver_id: UserId,
    ) -> Result<Option<Vehicle>, PersistenceError> {
        queries::vehicles::vehicle_for_driver(&mut self.conn, driver_id)
    }

    /// Retrieves the driver's open activity session.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn open_activity_session(
        &mut self,
        driver_id: UserId,
    ) -> Result<Option<ActivitySession>, PersistenceError> {
        queries::activity::open_session(&mut self.conn, driver_id)
    }
}
