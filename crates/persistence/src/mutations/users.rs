// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{Driver, UserId, UserRole, normalize_email};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::to_flag;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Creates a user account.
///
/// The email is normalized (trimmed, lowercased) before storage so that
/// lookups by email are case-insensitive. Accounts start enabled.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `role` - The account role
/// * `email` - The contact email, if any
/// * `name` - The display name, if any
/// * `active` - Whether a driver starts on duty
///
/// # Errors
///
/// Returns an error if the insert fails, including
/// `PersistenceError::ConstraintViolation` for a duplicate email.
pub fn create_user(
    conn: &mut SqliteConnection,
    role: UserRole,
    email: Option<&str>,
    name: Option<&str>,
    active: bool,
) -> Result<UserId, PersistenceError> {
    let normalized: Option<String> = email.and_then(normalize_email);

    diesel::insert_into(users::table)
        .values((
            users::role.eq(role.as_str()),
            users::email.eq(normalized.as_deref()),
            users::name.eq(name),
            users::active.eq(to_flag(active)),
            users::inactive_requested.eq(0),
            users::enabled.eq(1),
        ))
        .execute(conn)?;

    let user_id: i64 = get_last_insert_rowid(conn)?;
    info!(user_id, role = role.as_str(), "Created user");
    Ok(UserId(user_id))
}

/// Persists a driver's availability flags.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no driver row was updated.
pub fn update_driver(conn: &mut SqliteConnection, driver: &Driver) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table)
        .filter(users::user_id.eq(driver.user_id.value()))
        .filter(users::role.eq(UserRole::Driver.as_str()))
        .set((
            users::active.eq(to_flag(driver.active)),
            users::inactive_requested.eq(to_flag(driver.inactive_requested)),
            users::enabled.eq(to_flag(driver.enabled)),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "driver {}",
            driver.user_id
        )));
    }
    Ok(())
}
