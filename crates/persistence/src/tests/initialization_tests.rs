// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{UserId, UserRole};

use super::helpers::{persistence, seed_passenger};
use crate::PersistenceError;

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = persistence();
    let mut second = persistence();

    let passenger = seed_passenger(&mut first, "rider@rides.test");

    assert!(first.find_user(passenger).unwrap().is_some());
    assert!(second.find_user(passenger).unwrap().is_none());
}

#[test]
fn test_emails_are_normalized_and_unique() {
    let mut persistence = persistence();
    let passenger = seed_passenger(&mut persistence, "  Rider@Rides.Test ");

    let user = persistence.find_user(passenger).unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("rider@rides.test"));
    assert_eq!(user.role, UserRole::Passenger);
    assert!(user.enabled);

    let duplicate = persistence.create_passenger("RIDER@rides.test", None);
    assert!(matches!(
        duplicate,
        Err(PersistenceError::ConstraintViolation(_))
    ));
}

#[test]
fn test_role_specific_lookups_ignore_other_roles() {
    let mut persistence = persistence();
    let admin = persistence.create_admin("ops@rides.test", Some("Ops")).unwrap();

    assert!(persistence.find_driver(admin).unwrap().is_none());
    assert_eq!(
        persistence.find_user(admin).unwrap().unwrap().role,
        UserRole::Admin
    );
    assert!(persistence.find_user(UserId(4242)).unwrap().is_none());
}
