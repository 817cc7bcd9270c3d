// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver activity session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{SessionId, UserId};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::activity_sessions;
use crate::error::PersistenceError;
use crate::timestamps::to_nanos;

/// Opens an activity session for a driver.
///
/// # Errors
///
/// Returns `PersistenceError::ConstraintViolation` if the driver already has
/// an open session or does not exist.
pub fn start_session(
    conn: &mut SqliteConnection,
    driver_id: UserId,
    start_time: OffsetDateTime,
) -> Result<SessionId, PersistenceError> {
    diesel::insert_into(activity_sessions::table)
        .values((
            activity_sessions::driver_id.eq(driver_id.value()),
            activity_sessions::start_time.eq(to_nanos(start_time)?),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;
    info!(session_id, driver_id = driver_id.value(), "Opened activity session");
    Ok(SessionId(session_id))
}

/// Closes a session by setting its end time.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no open session has this id.
pub fn close_session(
    conn: &mut SqliteConnection,
    session_id: SessionId,
    end_time: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(activity_sessions::table)
        .filter(activity_sessions::session_id.eq(session_id.value()))
        .filter(activity_sessions::end_time.is_null())
        .set(activity_sessions::end_time.eq(Some(to_nanos(end_time)?)))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "open activity session {session_id}"
        )));
    }
    debug!(session_id = session_id.value(), "Closed activity session");
    Ok(())
}
