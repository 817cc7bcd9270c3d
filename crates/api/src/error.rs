// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use ride_dispatch::CoreError;
use ride_dispatch_domain::{DomainError, UserId};

/// Caller identification errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no caller identity.
    MissingIdentity,
    /// The supplied identity is not a known account.
    UnknownUser(UserId),
    /// The account exists but has been disabled.
    AccountDisabled(UserId),
    /// The account store could not be read.
    Backend(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "No caller identity supplied"),
            Self::UnknownUser(user_id) => write!(f, "Unknown user {user_id}"),
            Self::AccountDisabled(user_id) => write!(f, "Account {user_id} is disabled"),
            Self::Backend(msg) => write!(f, "Account lookup failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The caller could not be authenticated.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The operation is illegal for the ride's current state or for this caller.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound { message } => write!(f, "Not found: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Backend(message) => Self::Internal { message },
            other => Self::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}

/// Failure reported by a delivery collaborator (notification, email,
/// token issuer, broadcast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError(pub String);

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Delivery failed: {}", self.0)
    }
}

impl std::error::Error for DeliveryError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingField { field } => ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("'{field}' is required"),
        },
        DomainError::InvalidLocation { field, reason } => ApiError::InvalidInput {
            field,
            message: reason,
        },
        DomainError::InvalidScheduledTime { reason } => ApiError::InvalidInput {
            field: String::from("scheduled_time"),
            message: reason,
        },
        DomainError::InvalidDistance(value) => ApiError::InvalidInput {
            field: String::from("km"),
            message: format!("distance must be a finite, non-negative number, got {value}"),
        },
        DomainError::InvalidVehicleType(value) => ApiError::InvalidInput {
            field: String::from("requirements.vehicle_type"),
            message: format!("unknown vehicle type '{value}'"),
        },
        DomainError::InvalidUserRole(value) => ApiError::InvalidInput {
            field: String::from("role"),
            message: format!("unknown role '{value}'"),
        },
        err @ (DomainError::InvalidStatusTransition { .. } | DomainError::RateSnapshotAlreadySet) => {
            ApiError::Conflict {
                message: err.to_string(),
            }
        }
        err @ (DomainError::InvalidVehicleStatus(_) | DomainError::InvalidRideStatus(_)) => {
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::NotFound(what) => ApiError::ResourceNotFound { message: what },
        CoreError::Conflict(message) => ApiError::Conflict { message },
        CoreError::Unauthenticated => ApiError::AuthenticationFailed {
            reason: String::from("no authenticated caller"),
        },
        err @ CoreError::PricingUnavailable(_) => ApiError::Internal {
            message: err.to_string(),
        },
        CoreError::Store(store_err) => ApiError::Internal {
            message: store_err.to_string(),
        },
    }
}
