//! Support window arithmetic
//!
//! A year is `365.25` days. Ages are measured in fractional days, so a
//! version published exactly `window * 365.25` days ago is still inside the
//! window.

use crate::error::ConfigError;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Days per year used by all age computations
pub const DAYS_PER_YEAR: f64 = 365.25;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The maximum age a depended-upon version may have
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupportWindow {
    years: f64,
}

impl SupportWindow {
    /// Default SPEC-0 window
    pub const DEFAULT_YEARS: f64 = 2.0;

    /// Create a window of the given number of years
    pub fn new(years: f64) -> Result<Self, ConfigError> {
        if !years.is_finite() || years <= 0.0 {
            return Err(ConfigError::InvalidWindow {
                value: years.to_string(),
            });
        }
        Ok(Self { years })
    }

    /// Window length in years
    pub fn years(&self) -> f64 {
        self.years
    }

    /// Age of a publication in years
    pub fn age_in_years(published_at: NaiveDateTime, now: NaiveDateTime) -> f64 {
        let millis = (now - published_at).num_milliseconds() as f64;
        millis / MILLIS_PER_DAY / DAYS_PER_YEAR
    }

    /// Strictly older than the window
    pub fn is_outdated(&self, published_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        Self::age_in_years(published_at, now) > self.years
    }

    /// Earliest publication time still inside the window
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        let millis = (self.years * DAYS_PER_YEAR * MILLIS_PER_DAY).round() as i64;
        now - Duration::milliseconds(millis)
    }

    /// Published within `[now - window, now]`
    pub fn contains(&self, published_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        published_at >= self.cutoff(now) && published_at <= now
    }
}

impl Default for SupportWindow {
    fn default() -> Self {
        Self {
            years: Self::DEFAULT_YEARS,
        }
    }
}
