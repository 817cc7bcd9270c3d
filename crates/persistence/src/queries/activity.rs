// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver activity session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_dispatch_domain::{ActivitySession, SessionId, UserId};
use time::OffsetDateTime;

use crate::diesel_schema::activity_sessions;
use crate::error::PersistenceError;
use crate::timestamps::{from_nanos, from_nanos_opt, to_nanos};

/// Diesel Queryable struct for activity session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = activity_sessions)]
struct SessionRow {
    session_id: i64,
    driver_id: i64,
    start_time: i64,
    end_time: Option<i64>,
}

impl SessionRow {
    fn into_session(self) -> Result<ActivitySession, PersistenceError> {
        Ok(ActivitySession {
            session_id: Some(SessionId(self.session_id)),
            driver_id: UserId(self.driver_id),
            start_time: from_nanos(self.start_time)?,
            end_time: from_nanos_opt(self.end_time)?,
        })
    }
}

/// Retrieves the driver's sessions that started at or after `since`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn sessions_since(
    conn: &mut SqliteConnection,
    driver_id: UserId,
    since: OffsetDateTime,
) -> Result<Vec<ActivitySession>, PersistenceError> {
    let rows: Vec<SessionRow> = activity_sessions::table
        .filter(activity_sessions::driver_id.eq(driver_id.value()))
        .filter(activity_sessions::start_time.ge(to_nanos(since)?))
        .order((
            activity_sessions::start_time.asc(),
            activity_sessions::session_id.asc(),
        ))
        .select(SessionRow::as_select())
        .load(conn)?;
    rows.into_iter().map(SessionRow::into_session).collect()
}

/// Retrieves the driver's open session, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn open_session(
    conn: &mut SqliteConnection,
    driver_id: UserId,
) -> Result<Option<ActivitySession>, PersistenceError> {
    activity_sessions::table
        .filter(activity_sessions::driver_id.eq(driver_id.value()))
        .filter(activity_sessions::end_time.is_null())
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(SessionRow::into_session)
        .transpose()
}
