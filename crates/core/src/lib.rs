// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Dispatch engine and ride lifecycle manager.
//!
//! Operations are plain functions over a store implementing the repository
//! ports, a pricing source and a [`DispatchConfig`]. They take the current
//! time explicitly and return the persisted ride together with the events to
//! deliver once the caller has committed the unit of work.

mod config;
mod dispatch;
mod error;
mod ledger;
mod lifecycle;
mod ports;
mod pricing;
mod review;
mod transition;

#[cfg(test)]
mod tests;

pub use config::{
    DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_LABOR_LIMIT_HOURS, DEFAULT_LABOR_LOOKBACK_HOURS,
    DEFAULT_MAX_SCHEDULE_HORIZON_HOURS, DEFAULT_NEAR_TERM_WINDOW_MINUTES, DispatchConfig,
};
pub use dispatch::{
    REASON_NO_AVAILABLE_DRIVER, REASON_NO_CAPABLE_VEHICLE, create_ride, estimate_ride,
};
pub use error::{CoreError, StoreError};
pub use ledger::{hours_worked_since, labor_limit_reached};
pub use lifecycle::{
    EndRideRequest, InactivationOutcome, StopRideRequest, accept_ride, cancel_ride, end_ride,
    get_ride, record_distance, request_driver_inactivation, start_ride, stop_ride,
};
pub use ports::{
    ActivityRepository, DispatchStore, RideRepository, UserRepository, VehicleRepository,
};
pub use pricing::{PriceTable, PricingSource, estimate_cost, live_rates, settle_cost};
pub use review::{FALLBACK_RECIPIENT_NAME, review_request_for};
pub use transition::{RideEstimate, RideTransition};
