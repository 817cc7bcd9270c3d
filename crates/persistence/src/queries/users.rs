// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{Driver, Passenger, UserId, UserRole};
use tracing::debug;

use crate::data_models::{UserData, flag};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    role: String,
    email: Option<String>,
    name: Option<String>,
    active: i32,
    inactive_requested: i32,
    enabled: i32,
}

impl UserRow {
    fn into_user_data(self) -> Result<UserData, PersistenceError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e| PersistenceError::InvalidRecord(format!("user {}: {e}", self.user_id)))?;
        Ok(UserData {
            user_id: UserId(self.user_id),
            role,
            email: self.email,
            name: self.name,
            active: flag(self.active),
            inactive_requested: flag(self.inactive_requested),
            enabled: flag(self.enabled),
        })
    }
}

fn find_row(
    conn: &mut SqliteConnection,
    user_id: UserId,
    role: Option<UserRole>,
) -> Result<Option<UserRow>, PersistenceError> {
    let mut query = users::table
        .filter(users::user_id.eq(user_id.value()))
        .select(UserRow::as_select())
        .into_boxed();
    if let Some(role) = role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    Ok(query.first(conn).optional()?)
}

/// Retrieves any user account by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn find_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id = user_id.value(), "Looking up user");
    find_row(conn, user_id, None)?
        .map(UserRow::into_user_data)
        .transpose()
}

/// Retrieves a driver account.
///
/// Returns `Ok(None)` if the id is unknown or belongs to another role.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_driver(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<Driver>, PersistenceError> {
    let row: Option<UserRow> = find_row(conn, user_id, Some(UserRole::Driver))?;
    Ok(row.map(|row| Driver {
        user_id: UserId(row.user_id),
        email: row.email,
        name: row.name,
        active: flag(row.active),
        inactive_requested: flag(row.inactive_requested),
        enabled: flag(row.enabled),
    }))
}

/// Retrieves a passenger account.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_passenger(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<Passenger>, PersistenceError> {
    let row: Option<UserRow> = find_row(conn, user_id, Some(UserRole::Passenger))?;
    Ok(row.map(|row| Passenger {
        user_id: UserId(row.user_id),
        email: row.email,
        name: row.name,
    }))
}

/// Retrieves a passenger account by its stored (normalized) email.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_passenger_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Passenger>, PersistenceError> {
    let row: Option<UserRow> = users::table
        .filter(users::email.eq(email))
        .filter(users::role.eq(UserRole::Passenger.as_str()))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(|row| Passenger {
        user_id: UserId(row.user_id),
        email: row.email,
        name: row.name,
    }))
}
