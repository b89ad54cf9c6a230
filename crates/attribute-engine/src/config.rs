//! Configuration for the attribute engine.

use seismic_common::SampleInterval;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the attribute engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample interval used when neither the input nor the request states one.
    pub default_sample_interval: SampleInterval,

    /// Compute the kernel on the whole cube before cutting a section when the
    /// kernel's stencil spans the sliced axis. When false, sections are cut
    /// first (fast preview, edge effects across the sliced axis).
    pub exact_sections: bool,

    /// Samples of mirrored padding added to each trace before the Hilbert
    /// transform, trimmed again afterwards.
    pub hilbert_padding: usize,

    /// Run batch section computations on the rayon pool.
    pub parallel_batches: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_sample_interval: SampleInterval::FOUR_MS,
            exact_sections: true,
            hilbert_padding: 12,
            parallel_batches: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SEISMIC_SAMPLE_INTERVAL_MS") {
            match val
                .parse::<f64>()
                .ok()
                .and_then(|ms| SampleInterval::from_millis(ms).ok())
            {
                Some(interval) => config.default_sample_interval = interval,
                None => warn!(value = %val, "Ignoring invalid SEISMIC_SAMPLE_INTERVAL_MS"),
            }
        }

        if let Ok(val) = std::env::var("SEISMIC_EXACT_SECTIONS") {
            match parse_bool(&val) {
                Some(flag) => config.exact_sections = flag,
                None => warn!(value = %val, "Ignoring invalid SEISMIC_EXACT_SECTIONS"),
            }
        }

        if let Ok(val) = std::env::var("SEISMIC_HILBERT_PADDING") {
            match val.parse() {
                Ok(padding) => config.hilbert_padding = padding,
                Err(_) => warn!(value = %val, "Ignoring invalid SEISMIC_HILBERT_PADDING"),
            }
        }

        if let Ok(val) = std::env::var("SEISMIC_PARALLEL_BATCHES") {
            match parse_bool(&val) {
                Some(flag) => config.parallel_batches = flag,
                None => warn!(value = %val, "Ignoring invalid SEISMIC_PARALLEL_BATCHES"),
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let seconds = self.default_sample_interval.seconds();
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err("default_sample_interval must be > 0".to_string());
        }

        if self.hilbert_padding > 1000 {
            return Err("hilbert_padding must be <= 1000 samples".to_string());
        }

        Ok(())
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
