//! Butterworth IIR filters as cascades of second-order sections.
//!
//! Sections are designed from the analog prototype by the bilinear transform
//! with pre-warped cutoffs. [`SosFilter::filtfilt`] runs the cascade forward
//! and backward over an odd extension of the trace, so the result has zero
//! phase and the squared magnitude of one pass.

use rustfft::num_complex::Complex;
use seismic_common::{SampleInterval, SeismicError, SeismicResult};
use std::f64::consts::PI;

/// One second-order section, `a0 = 1`, run in transposed direct form II.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl Biquad {
    /// Gain at zero frequency.
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Magnitude response at `normalized` = frequency / sampling frequency.
    pub fn magnitude(&self, normalized: f64) -> f64 {
        let z1 = Complex::from_polar(1.0, -2.0 * PI * normalized);
        let z2 = z1 * z1;
        let num = self.b[0] + z1 * self.b[1] + z2 * self.b[2];
        let den = 1.0 + z1 * self.a[0] + z2 * self.a[1];
        (num / den).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Lowpass,
    Highpass,
}

/// A cascade of second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Butterworth low-pass of even `order` with -3 dB point at `cutoff` Hz.
    pub fn lowpass(order: usize, cutoff: f64, interval: SampleInterval) -> SeismicResult<Self> {
        Self::butterworth(order, cutoff, interval, Response::Lowpass, "frequency")
    }

    /// Butterworth high-pass of even `order` with -3 dB point at `cutoff` Hz.
    pub fn highpass(order: usize, cutoff: f64, interval: SampleInterval) -> SeismicResult<Self> {
        Self::butterworth(order, cutoff, interval, Response::Highpass, "frequency")
    }

    /// Band-pass between `low` and `high` Hz: a high-pass at `low` followed
    /// by a low-pass at `high`, each of `order`.
    pub fn bandpass(order: usize, low: f64, high: f64, interval: SampleInterval) -> SeismicResult<Self> {
        if low >= high {
            return Err(SeismicError::invalid_parameter(
                "frequencies",
                format!("low corner {} must be below high corner {}", low, high),
            ));
        }
        let mut filter = Self::butterworth(order, low, interval, Response::Highpass, "frequencies")?;
        let lowpass = Self::butterworth(order, high, interval, Response::Lowpass, "frequencies")?;
        filter.sections.extend(lowpass.sections);
        Ok(filter)
    }

    fn butterworth(
        order: usize,
        cutoff: f64,
        interval: SampleInterval,
        response: Response,
        param: &str,
    ) -> SeismicResult<Self> {
        if order == 0 || order % 2 != 0 {
            return Err(SeismicError::invalid_parameter(
                "order",
                format!("must be a positive even number, got {}", order),
            ));
        }
        check_cutoff(cutoff, interval, param)?;

        let k = (PI * cutoff * interval.seconds()).tan();
        let k2 = k * k;
        let sections = (0..order / 2)
            .map(|s| {
                // 1/Q of the analog pole pair.
                let q_inv = 2.0 * (PI * (2 * s + 1) as f64 / (2 * order) as f64).sin();
                let norm = 1.0 / (1.0 + k * q_inv + k2);
                let a = [2.0 * (k2 - 1.0) * norm, (1.0 - k * q_inv + k2) * norm];
                let b = match response {
                    Response::Lowpass => [k2 * norm, 2.0 * k2 * norm, k2 * norm],
                    Response::Highpass => [norm, -2.0 * norm, norm],
                };
                Biquad { b, a }
            })
            .collect();
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Magnitude of one pass at `frequency` Hz.
    pub fn magnitude(&self, frequency: f64, interval: SampleInterval) -> f64 {
        let normalized = frequency * interval.seconds();
        self.sections.iter().map(|s| s.magnitude(normalized)).product()
    }

    /// One causal pass in place. The state starts at the steady state for a
    /// constant input equal to the first sample.
    fn run(&self, x: &mut [f64]) {
        let Some(&first) = x.first() else {
            return;
        };
        let mut level = first;
        for s in &self.sections {
            let settled = level * s.dc_gain();
            let mut z1 = settled - s.b[0] * level;
            let mut z2 = s.b[2] * level - s.a[1] * settled;
            for v in x.iter_mut() {
                let input = *v;
                let y = s.b[0] * input + z1;
                z1 = s.b[1] * input - s.a[0] * y + z2;
                z2 = s.b[2] * input - s.a[1] * y;
                *v = y;
            }
            level = settled;
        }
    }

    /// Zero-phase filtering: forward and backward passes over the trace
    /// extended by an odd reflection about its end samples.
    pub fn filtfilt(&self, x: &[f64]) -> Vec<f64> {
        let n = x.len();
        if n == 0 {
            return Vec::new();
        }
        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);

        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * x[0] - x[i]));
        ext.extend_from_slice(x);
        ext.extend((1..=pad).map(|i| 2.0 * x[n - 1] - x[n - 1 - i]));

        self.run(&mut ext);
        ext.reverse();
        self.run(&mut ext);
        ext.reverse();

        ext.drain(..pad);
        ext.truncate(n);
        ext
    }
}

/// A cutoff must be positive and below Nyquist.
pub fn check_cutoff(cutoff: f64, interval: SampleInterval, param: &str) -> SeismicResult<()> {
    if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= interval.nyquist() {
        return Err(SeismicError::invalid_parameter(
            param,
            format!(
                "cutoff {} Hz must lie in (0, {}) for a {} ms interval",
                cutoff,
                interval.nyquist(),
                interval.millis()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_MS: SampleInterval = SampleInterval::FOUR_MS;

    fn sine(frequency: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|k| (2.0 * PI * frequency * k as f64 * FOUR_MS.seconds()).sin())
            .collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_half_power_at_cutoff() {
        let lowpass = SosFilter::lowpass(6, 30.0, FOUR_MS).unwrap();
        assert_eq!(lowpass.sections().len(), 3);
        assert!((lowpass.magnitude(30.0, FOUR_MS) - 0.5f64.sqrt()).abs() < 1e-9);
        assert!((lowpass.magnitude(0.0, FOUR_MS) - 1.0).abs() < 1e-9);
        assert!(lowpass.magnitude(124.0, FOUR_MS) < 1e-6);

        let highpass = SosFilter::highpass(6, 30.0, FOUR_MS).unwrap();
        assert!((highpass.magnitude(30.0, FOUR_MS) - 0.5f64.sqrt()).abs() < 1e-9);
        assert!(highpass.magnitude(0.0, FOUR_MS) < 1e-12);
        assert!((highpass.magnitude(124.0, FOUR_MS) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_filtfilt_keeps_constant() {
        let lowpass = SosFilter::lowpass(6, 20.0, FOUR_MS).unwrap();
        let out = lowpass.filtfilt(&[2.5; 50]);
        assert!(out.iter().all(|v| (v - 2.5).abs() < 1e-9));

        let highpass = SosFilter::highpass(6, 20.0, FOUR_MS).unwrap();
        let out = highpass.filtfilt(&[2.5; 50]);
        assert!(out.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_filtfilt_has_zero_phase() {
        let x = sine(10.0, 250);
        let out = SosFilter::lowpass(6, 40.0, FOUR_MS).unwrap().filtfilt(&x);
        assert_eq!(out.len(), x.len());
        // Away from the ends the pass band comes through unshifted.
        for k in 50..200 {
            assert!((out[k] - x[k]).abs() < 0.02, "sample {}: {} vs {}", k, out[k], x[k]);
        }
    }

    #[test]
    fn test_filtfilt_short_traces() {
        let filter = SosFilter::lowpass(6, 20.0, FOUR_MS).unwrap();
        assert!(filter.filtfilt(&[]).is_empty());
        assert_eq!(filter.filtfilt(&[3.0]).len(), 1);
        assert_eq!(filter.filtfilt(&[1.0, -1.0, 1.0]).len(), 3);
    }

    #[test]
    fn test_bandpass_attenuates_both_sides() {
        let filter = SosFilter::bandpass(6, 15.0, 45.0, FOUR_MS).unwrap();
        assert_eq!(filter.sections().len(), 6);
        let inside = rms(&filter.filtfilt(&sine(30.0, 500))[100..400]);
        let below = rms(&filter.filtfilt(&sine(3.0, 500))[100..400]);
        let above = rms(&filter.filtfilt(&sine(90.0, 500))[100..400]);
        assert!(inside > 0.6, "pass band rms {}", inside);
        assert!(below < 0.01 && above < 0.01, "stop band rms {} {}", below, above);
    }

    #[test]
    fn test_rejects_bad_cutoffs() {
        for cutoff in [0.0, -5.0, 125.0, 200.0, f64::NAN] {
            let err = SosFilter::lowpass(6, cutoff, FOUR_MS).unwrap_err();
            assert_eq!(err.kind(), "InvalidParameter");
        }
        assert!(SosFilter::lowpass(5, 20.0, FOUR_MS).is_err());
        assert!(SosFilter::bandpass(6, 40.0, 20.0, FOUR_MS).is_err());
        assert!(SosFilter::bandpass(6, 20.0, 130.0, FOUR_MS).is_err());
    }
}
