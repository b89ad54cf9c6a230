//! Sample interval handling.
//!
//! Seconds are the canonical unit. SEG-Y headers and older tooling report the
//! interval in milliseconds (commonly 4 ms); convert those with
//! [`SampleInterval::from_millis`] at the boundary.

use crate::{SeismicError, SeismicResult};
use serde::{Deserialize, Serialize};

/// Time between two consecutive samples of a trace, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SampleInterval(f64);

impl SampleInterval {
    /// The usual 4 ms interval.
    pub const FOUR_MS: SampleInterval = SampleInterval(0.004);

    /// Create from a value in seconds.
    pub fn from_seconds(seconds: f64) -> SeismicResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(SeismicError::invalid_parameter(
                "sample_interval",
                format!("must be a positive number of seconds, got {}", seconds),
            ));
        }
        Ok(Self(seconds))
    }

    /// Create from a value in milliseconds.
    pub fn from_millis(millis: f64) -> SeismicResult<Self> {
        if !millis.is_finite() || millis <= 0.0 {
            return Err(SeismicError::invalid_parameter(
                "sample_rate_ms",
                format!("must be a positive number of milliseconds, got {}", millis),
            ));
        }
        Ok(Self(millis / 1000.0))
    }

    /// Interval in seconds.
    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Interval in milliseconds.
    pub fn millis(&self) -> f64 {
        self.0 * 1000.0
    }

    /// Sampling frequency in Hz.
    pub fn sampling_frequency(&self) -> f64 {
        1.0 / self.0
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f64 {
        0.5 / self.0
    }
}

impl Default for SampleInterval {
    fn default() -> Self {
        Self::FOUR_MS
    }
}

impl TryFrom<f64> for SampleInterval {
    type Error = SeismicError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        Self::from_seconds(seconds)
    }
}

impl From<SampleInterval> for f64 {
    fn from(interval: SampleInterval) -> Self {
        interval.0
    }
}

impl std::fmt::Display for SampleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ms", self.millis())
    }
}
