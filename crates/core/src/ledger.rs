// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{ActivitySession, UserId};
use time::{Duration, OffsetDateTime};

use crate::config::DispatchConfig;
use crate::error::CoreError;
use crate::ports::ActivityRepository;

/// Sums a driver's on-duty time over sessions starting at or after `since`.
///
/// Open sessions count up to `now`.
///
/// # Arguments
///
/// * `store` - The activity session store
/// * `driver_id` - The driver to aggregate
/// * `since` - Start of the window; earlier sessions are ignored entirely
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn hours_worked_since<S: ActivityRepository + ?Sized>(
    store: &mut S,
    driver_id: UserId,
    since: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<Duration, CoreError> {
    let sessions: Vec<ActivitySession> = store.sessions_since(driver_id, since)?;
    Ok(sessions
        .iter()
        .filter(|session| session.start_time >= since)
        .map(|session| session.duration_until(now))
        .fold(Duration::ZERO, |total, d| total + d))
}

/// Returns true if the driver has reached the labor cap for the trailing window.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn labor_limit_reached<S: ActivityRepository + ?Sized>(
    store: &mut S,
    driver_id: UserId,
    config: &DispatchConfig,
    now: OffsetDateTime,
) -> Result<bool, CoreError> {
    let worked: Duration = hours_worked_since(store, driver_id, now - config.labor_lookback, now)?;
    Ok(worked >= config.labor_limit)
}
