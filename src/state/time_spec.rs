//! User-entered countdown target

use serde::{Deserialize, Serialize};

/// One of the three input fields of a [`TimeSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    Hours,
    Minutes,
    Seconds,
}

/// Countdown target as entered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeSpec {
    /// Create a time spec from already-parsed values
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Build a time spec from raw form input, coercing anything non-numeric to zero
    pub fn from_fields(hours: &str, minutes: &str, seconds: &str) -> Self {
        Self {
            hours: coerce_field(hours),
            minutes: coerce_field(minutes),
            seconds: coerce_field(seconds),
        }
    }

    /// Total countdown length in seconds, saturating at `u64::MAX`
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// A time spec is usable as a countdown target only if some field is non-zero
    pub fn is_valid(&self) -> bool {
        self.hours > 0 || self.minutes > 0 || self.seconds > 0
    }

    /// Return a copy with one field replaced by coerced raw input
    pub fn with_field(mut self, field: TimeField, raw: &str) -> Self {
        let value = coerce_field(raw);
        match field {
            TimeField::Hours => self.hours = value,
            TimeField::Minutes => self.minutes = value,
            TimeField::Seconds => self.seconds = value,
        }
        self
    }
}

/// Parse a single input field; malformed or negative input becomes zero
pub fn coerce_field(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}
