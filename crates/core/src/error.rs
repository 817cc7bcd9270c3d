// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{DomainError, VehicleType};

/// Errors reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store failed to execute the operation.
    Backend(String),
    /// A stored record could not be turned back into a domain value.
    InvalidRecord(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "Store backend error: {msg}"),
            Self::InvalidRecord(msg) => write!(f, "Invalid stored record: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors that can occur during dispatch and lifecycle operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A domain rule was violated by the caller's input.
    DomainViolation(DomainError),
    /// The referenced entity does not exist.
    NotFound(String),
    /// The operation is not legal for the current state or for this caller.
    Conflict(String),
    /// No authenticated caller was supplied.
    Unauthenticated,
    /// The live pricing source has no rates for this vehicle type.
    PricingUnavailable(VehicleType),
    /// The store failed.
    Store(StoreError),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Unauthenticated => write!(f, "No authenticated caller"),
            Self::PricingUnavailable(vehicle_type) => {
                write!(f, "No pricing configured for vehicle type {vehicle_type}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
