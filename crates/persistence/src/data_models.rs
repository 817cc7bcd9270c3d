// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_dispatch_domain::{GeoPoint, UserId, UserRole, VehicleType};
use serde::{Deserialize, Serialize};

/// A user account row with its role resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: UserId,
    pub role: UserRole,
    pub email: Option<String>,
    pub name: Option<String>,
    pub active: bool,
    pub inactive_requested: bool,
    pub enabled: bool,
}

/// Fields required to register a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub driver_id: UserId,
    pub vehicle_type: VehicleType,
    pub pet_transport: bool,
    pub baby_transport: bool,
    pub location: GeoPoint,
}

impl NewVehicle {
    /// Creates a vehicle registration without optional capabilities.
    #[must_use]
    pub const fn new(driver_id: UserId, vehicle_type: VehicleType, location: GeoPoint) -> Self {
        Self {
            driver_id,
            vehicle_type,
            pet_transport: false,
            baby_transport: false,
            location,
        }
    }

    /// Marks the vehicle as accepting pets.
    #[must_use]
    pub const fn with_pet_transport(mut self) -> Self {
        self.pet_transport = true;
        self
    }

    /// Marks the vehicle as carrying a baby seat.
    #[must_use]
    pub const fn with_baby_transport(mut self) -> Self {
        self.baby_transport = true;
        self
    }
}

/// Converts a stored 0/1 flag.
pub(crate) const fn flag(value: i32) -> bool {
    value != 0
}

/// Converts a boolean into its stored 0/1 flag.
pub(crate) fn to_flag(value: bool) -> i32 {
    i32::from(value)
}
