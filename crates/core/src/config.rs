// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;

/// Default near-term availability window in minutes.
pub const DEFAULT_NEAR_TERM_WINDOW_MINUTES: i64 = 10;
/// Default on-duty cap within the labor lookback.
pub const DEFAULT_LABOR_LIMIT_HOURS: i64 = 8;
/// Default trailing window the labor cap applies to.
pub const DEFAULT_LABOR_LOOKBACK_HOURS: i64 = 24;
/// Default maximum lead time for a scheduled ride.
pub const DEFAULT_MAX_SCHEDULE_HORIZON_HOURS: i64 = 5;
/// Default speed used to turn route distance into an estimated duration.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Behavioural parameters of the dispatch engine and lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// A busy driver whose current ride ends within this window is still a candidate.
    pub near_term_window: Duration,
    /// On-duty time at or above this within `labor_lookback` excludes a driver.
    pub labor_limit: Duration,
    pub labor_lookback: Duration,
    pub max_schedule_horizon: Duration,
    pub average_speed_kmh: f64,
    /// Review emails are never sent to addresses in these domains.
    pub review_excluded_domains: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            near_term_window: Duration::minutes(DEFAULT_NEAR_TERM_WINDOW_MINUTES),
            labor_limit: Duration::hours(DEFAULT_LABOR_LIMIT_HOURS),
            labor_lookback: Duration::hours(DEFAULT_LABOR_LOOKBACK_HOURS),
            max_schedule_horizon: Duration::hours(DEFAULT_MAX_SCHEDULE_HORIZON_HOURS),
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            review_excluded_domains: vec![String::from("example.com"), String::from("test.local")],
        }
    }
}

impl DispatchConfig {
    /// Returns a copy of this configuration with a different near-term window.
    ///
    /// Negative windows are treated as zero.
    #[must_use]
    pub const fn with_near_term_window_minutes(mut self, minutes: i64) -> Self {
        self.near_term_window = Duration::minutes(if minutes < 0 { 0 } else { minutes });
        self
    }

    /// Returns true if `email` belongs to a domain excluded from review requests.
    ///
    /// The comparison is case-insensitive and matches the exact domain only.
    #[must_use]
    pub fn is_excluded_email(&self, email: &str) -> bool {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        self.review_excluded_domains
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(domain.trim()))
    }
}
