//! Frequency filtering of traces.
//!
//! Two kinds of kernel live here. Single-scale continuous wavelet transforms
//! convolve each trace ('same' length, zero padded) with a zero-phase wavelet
//! sampled over [`WAVELET_LENGTH`] seconds centred on zero. The low-, high-
//! and band-pass kernels run an order [`BUTTERWORTH_ORDER`] Butterworth
//! filter forward and backward along each trace.

use super::{sanitize, KernelContext};
use crate::filters::convolve_same;
use crate::iir::{check_cutoff, SosFilter};
use ndarray::{Array3, ArrayView3, Axis, Zip};
use seismic_common::{SampleInterval, SeismicError, SeismicResult};
use std::f64::consts::PI;
use tracing::trace;

/// Duration of the sampled wavelet in seconds.
pub const WAVELET_LENGTH: f64 = 0.512;

/// Order of the pass filters.
pub const BUTTERWORTH_ORDER: usize = 6;

/// Parameters of `cwt_ricker`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RickerParams {
    /// Peak frequency in Hz.
    pub frequency: f64,
    /// Sample interval override; the input's interval is used when `None`.
    pub sample_interval: Option<SampleInterval>,
}

impl RickerParams {
    pub fn validate(&self) -> SeismicResult<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(SeismicError::invalid_parameter(
                "frequency",
                format!("must be a positive number of Hz, got {}", self.frequency),
            ));
        }
        Ok(())
    }
}

/// Parameters of `cwt_ormsby`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrmsbyParams {
    /// Corner frequencies `f1 < f2 < f3 < f4` in Hz.
    pub frequencies: [f64; 4],
    pub sample_interval: Option<SampleInterval>,
}

impl OrmsbyParams {
    pub fn validate(&self) -> SeismicResult<()> {
        let f = self.frequencies;
        let positive = f.iter().all(|v| v.is_finite() && *v > 0.0);
        let ascending = f.windows(2).all(|w| w[0] < w[1]);
        if !positive || !ascending {
            return Err(SeismicError::invalid_parameter(
                "frequencies",
                format!("need four strictly ascending positive corners, got {:?}", f),
            ));
        }
        Ok(())
    }
}

/// Parameters of `lowpass` and `highpass`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffParams {
    /// Cutoff (-3 dB) frequency in Hz.
    pub frequency: f64,
    pub sample_interval: Option<SampleInterval>,
}

impl CutoffParams {
    /// The cutoff is checked against Nyquist here when the interval is
    /// known, otherwise when the kernel runs.
    pub fn validate(&self) -> SeismicResult<()> {
        match self.sample_interval {
            Some(interval) => check_cutoff(self.frequency, interval, "frequency"),
            None if !self.frequency.is_finite() || self.frequency <= 0.0 => {
                Err(SeismicError::invalid_parameter(
                    "frequency",
                    format!("must be a positive number of Hz, got {}", self.frequency),
                ))
            }
            None => Ok(()),
        }
    }
}

/// Parameters of `bandpass`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    /// Low and high cutoff frequencies in Hz.
    pub frequencies: [f64; 2],
    pub sample_interval: Option<SampleInterval>,
}

impl BandParams {
    pub fn validate(&self) -> SeismicResult<()> {
        let [low, high] = self.frequencies;
        let positive = [low, high].iter().all(|v| v.is_finite() && *v > 0.0);
        if !positive || low >= high {
            return Err(SeismicError::invalid_parameter(
                "frequencies",
                format!("need two ascending positive cutoffs, got {:?}", self.frequencies),
            ));
        }
        if let Some(interval) = self.sample_interval {
            check_cutoff(high, interval, "frequencies")?;
        }
        Ok(())
    }
}

/// Sample times of the wavelet: `-L/2, -L/2 + dt, ...` while below `L/2`.
///
/// Only the taps within `reach` samples of the centre tap are produced. A
/// 'same' convolution with a trace of `reach + 1` samples never reads the
/// others, so the result is unchanged while the tap count stays bounded by
/// the trace length.
fn wavelet_times(interval: SampleInterval, reach: usize) -> Vec<f64> {
    let dt = interval.seconds();
    let count = (WAVELET_LENGTH / dt - 1e-9).ceil().max(1.0) as usize;
    let centre = (count - 1) / 2;
    let first = centre.saturating_sub(reach);
    let last = (count - 1).min(centre.saturating_add(reach));
    (first..=last)
        .map(|n| -WAVELET_LENGTH / 2.0 + n as f64 * dt)
        .collect()
}

fn ricker(frequency: f64, times: Vec<f64>) -> Vec<f64> {
    times
        .into_iter()
        .map(|t| {
            let a = (PI * frequency * t).powi(2);
            (1.0 - 2.0 * a) * (-a).exp()
        })
        .collect()
}

fn ormsby(frequencies: [f64; 4], times: Vec<f64>) -> Vec<f64> {
    let [f1, f2, f3, f4] = frequencies;
    let term = |f: f64, lo: f64, hi: f64, t: f64| {
        (PI * f).powi(2) / (PI * hi - PI * lo) * sinc(f * t).powi(2)
    };
    times
        .into_iter()
        .map(|t| {
            (term(f4, f3, f4, t) - term(f3, f3, f4, t))
                - (term(f2, f1, f2, t) - term(f1, f1, f2, t))
        })
        .collect()
}

/// Ricker (Mexican hat) wavelet with peak frequency `frequency`.
pub fn ricker_wavelet(frequency: f64, interval: SampleInterval) -> Vec<f64> {
    ricker(frequency, wavelet_times(interval, usize::MAX))
}

/// Ormsby (trapezoidal band-pass) wavelet with corners `f1..f4`.
pub fn ormsby_wavelet(frequencies: [f64; 4], interval: SampleInterval) -> Vec<f64> {
    ormsby(frequencies, wavelet_times(interval, usize::MAX))
}

/// Normalised sinc, `sin(pi x) / (pi x)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Apply `filter` to every trace, in `f64`.
fn map_traces<F>(input: ArrayView3<'_, f32>, mut filter: F) -> Array3<f32>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let mut output = Array3::<f32>::zeros(input.raw_dim());
    let mut trace_buf = Vec::with_capacity(input.len_of(Axis(2)));
    Zip::from(output.lanes_mut(Axis(2)))
        .and(input.lanes(Axis(2)))
        .for_each(|mut out, lane| {
            trace_buf.clear();
            trace_buf.extend(lane.iter().map(|v| *v as f64));
            let filtered = filter(trace_buf.as_slice());
            out.iter_mut().zip(filtered).for_each(|(o, v)| *o = v as f32);
        });
    sanitize(output)
}

fn reach(input: &ArrayView3<'_, f32>) -> usize {
    input.len_of(Axis(2)).saturating_sub(1)
}

/// Ricker wavelet transform (`cwt_ricker`).
pub fn cwt_ricker(input: ArrayView3<'_, f32>, params: &RickerParams, ctx: &KernelContext) -> Array3<f32> {
    let interval = params.sample_interval.unwrap_or(ctx.sample_interval);
    let wavelet = ricker(params.frequency, wavelet_times(interval, reach(&input)));
    trace!(taps = wavelet.len(), frequency = params.frequency, "Ricker wavelet");
    map_traces(input, |trace| convolve_same(trace, &wavelet))
}

/// Ormsby wavelet transform (`cwt_ormsby`).
pub fn cwt_ormsby(input: ArrayView3<'_, f32>, params: &OrmsbyParams, ctx: &KernelContext) -> Array3<f32> {
    let interval = params.sample_interval.unwrap_or(ctx.sample_interval);
    let wavelet = ormsby(params.frequencies, wavelet_times(interval, reach(&input)));
    trace!(taps = wavelet.len(), "Ormsby wavelet");
    map_traces(input, |trace| convolve_same(trace, &wavelet))
}

fn zero_phase(input: ArrayView3<'_, f32>, filter: &SosFilter) -> Array3<f32> {
    trace!(sections = filter.sections().len(), "Zero-phase IIR filter");
    map_traces(input, |trace| filter.filtfilt(trace))
}

/// Butterworth low-pass (`lowpass`).
pub fn lowpass(input: ArrayView3<'_, f32>, params: &CutoffParams, ctx: &KernelContext) -> SeismicResult<Array3<f32>> {
    let interval = params.sample_interval.unwrap_or(ctx.sample_interval);
    let filter = SosFilter::lowpass(BUTTERWORTH_ORDER, params.frequency, interval)?;
    Ok(zero_phase(input, &filter))
}

/// Butterworth high-pass (`highpass`).
pub fn highpass(input: ArrayView3<'_, f32>, params: &CutoffParams, ctx: &KernelContext) -> SeismicResult<Array3<f32>> {
    let interval = params.sample_interval.unwrap_or(ctx.sample_interval);
    let filter = SosFilter::highpass(BUTTERWORTH_ORDER, params.frequency, interval)?;
    Ok(zero_phase(input, &filter))
}

/// Butterworth band-pass (`bandpass`).
pub fn bandpass(input: ArrayView3<'_, f32>, params: &BandParams, ctx: &KernelContext) -> SeismicResult<Array3<f32>> {
    let interval = params.sample_interval.unwrap_or(ctx.sample_interval);
    let [low, high] = params.frequencies;
    let filter = SosFilter::bandpass(BUTTERWORTH_ORDER, low, high, interval)?;
    Ok(zero_phase(input, &filter))
}
