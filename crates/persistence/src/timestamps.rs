// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Instants are stored as signed Unix nanoseconds.

use time::OffsetDateTime;

use crate::error::PersistenceError;

/// Converts an instant to its stored representation.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidRecord` if the instant is outside the
/// range an `i64` of nanoseconds can hold.
pub fn to_nanos(instant: OffsetDateTime) -> Result<i64, PersistenceError> {
    i64::try_from(instant.unix_timestamp_nanos()).map_err(|_| {
        PersistenceError::InvalidRecord(format!("timestamp {instant} is out of range"))
    })
}

/// Converts an optional instant to its stored representation.
///
/// # Errors
///
/// See [`to_nanos`].
pub fn to_nanos_opt(instant: Option<OffsetDateTime>) -> Result<Option<i64>, PersistenceError> {
    instant.map(to_nanos).transpose()
}

/// Converts a stored timestamp back into a UTC instant.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidRecord` if the value is not a valid instant.
pub fn from_nanos(nanos: i64) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| PersistenceError::InvalidRecord(format!("invalid timestamp {nanos}: {e}")))
}

/// Converts an optional stored timestamp back into a UTC instant.
///
/// # Errors
///
/// See [`from_nanos`].
pub fn from_nanos_opt(nanos: Option<i64>) -> Result<Option<OffsetDateTime>, PersistenceError> {
    nanos.map(from_nanos).transpose()
}
