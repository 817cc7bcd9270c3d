// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identification.
//!
//! The transport layer extracts a user id from the request; this module turns
//! it into an [`AuthenticatedActor`] by loading the account. Authorization is
//! decided per operation by the dispatch core, which receives the resulting
//! [`Actor`].

use ride_dispatch_domain::{UserId, UserRole};
use ride_dispatch_events::Actor;
use ride_dispatch_persistence::{Persistence, UserData};
use tracing::{debug, warn};

use crate::error::AuthError;

/// A caller whose account has been loaded and found usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub user_id: UserId,
    pub role: UserRole,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthenticatedActor {
    /// Returns the identity handed to core operations.
    #[must_use]
    pub const fn to_actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

/// Resolves caller identities against the account store.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Loads the account behind a caller-supplied user id.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `user_id` - The id extracted from the request, if any
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if the request carried no identity
    /// * `Ok(Some(actor))` if the account exists and is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - The account is disabled
    /// - The account store cannot be read
    pub fn authenticate(
        persistence: &mut Persistence,
        user_id: Option<UserId>,
    ) -> Result<Option<AuthenticatedActor>, AuthError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let user: UserData = persistence
            .find_user(user_id)
            .map_err(|err| AuthError::Backend(err.to_string()))?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "Rejected unknown caller");
                AuthError::UnknownUser(user_id)
            })?;

        if !user.enabled {
            warn!(user_id = %user_id, "Rejected disabled account");
            return Err(AuthError::AccountDisabled(user_id));
        }

        debug!(user_id = %user_id, role = user.role.as_str(), "Caller authenticated");
        Ok(Some(AuthenticatedActor {
            user_id: user.user_id,
            role: user.role,
            email: user.email,
            name: user.name,
        }))
    }

    /// Like [`Self::authenticate`] but rejects requests without an identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingIdentity` if `user_id` is `None`, otherwise
    /// the errors of [`Self::authenticate`].
    pub fn require(
        persistence: &mut Persistence,
        user_id: Option<UserId>,
    ) -> Result<AuthenticatedActor, AuthError> {
        Self::authenticate(persistence, user_id)?.ok_or(AuthError::MissingIdentity)
    }
}
