//! Amplitude attributes: derivatives, windowed energy, gain and rescaling.

use super::{safe_ratio, sanitize, KernelContext};
use crate::filters::{
    correlate1d, first_derivative, gaussian_gradient_magnitude, second_derivative,
    uniform_filter, validate_sigmas, Window,
};
use crate::hilbert::analytic_trace;
use ndarray::{Array3, ArrayView3, Axis, Zip};
use seismic_common::{CubeAxis, SeismicError, SeismicResult};
use tracing::trace;

/// Number of histogram bin edges used by [`histogram_equalization`].
const HISTOGRAM_EDGES: usize = 256;

/// Parameters of `fder` and `sder`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeParams {
    /// Axis to differentiate along.
    pub axis: CubeAxis,
}

impl Default for DerivativeParams {
    fn default() -> Self {
        Self {
            axis: CubeAxis::Sample,
        }
    }
}

/// Parameters of windowed kernels (`rms`, `reflin`, `agc`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    pub window: Window,
}

impl WindowParams {
    /// The `1x1x9` trace window.
    pub fn trace_window() -> Self {
        Self {
            window: Window::TRACE,
        }
    }
}

/// Parameters of `gradmag`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientParams {
    /// Gaussian standard deviation along each axis, in samples.
    pub sigmas: [f64; 3],
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            sigmas: [1.0, 1.0, 1.0],
        }
    }
}

impl GradientParams {
    pub fn validate(&self) -> SeismicResult<()> {
        validate_sigmas(self.sigmas)
    }
}

/// Parameters of `timegain`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainParams {
    /// Exponent applied to the sample position.
    pub gain: f64,
}

impl Default for GainParams {
    fn default() -> Self {
        Self { gain: 1.5 }
    }
}

impl GainParams {
    pub fn validate(&self) -> SeismicResult<()> {
        if !self.gain.is_finite() {
            return Err(SeismicError::invalid_parameter(
                "gain",
                format!("must be finite, got {}", self.gain),
            ));
        }
        Ok(())
    }
}

/// Parameters of `phaserot`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationParams {
    /// Phase rotation in degrees.
    pub rotation: f64,
}

impl RotationParams {
    pub fn validate(&self) -> SeismicResult<()> {
        if !self.rotation.is_finite() {
            return Err(SeismicError::invalid_parameter(
                "rotation",
                format!("must be finite, got {}", self.rotation),
            ));
        }
        Ok(())
    }
}

/// Parameters of `clip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipParams {
    pub min: f32,
    pub max: f32,
}

impl ClipParams {
    pub fn validate(&self) -> SeismicResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SeismicError::invalid_parameter(
                "min/max",
                format!("need finite min <= max, got [{}, {}]", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Smoothed first derivative.
pub fn first_derivative_attribute(input: ArrayView3<'_, f32>, params: &DerivativeParams) -> Array3<f32> {
    sanitize(first_derivative(input, params.axis))
}

/// Smoothed second derivative.
pub fn second_derivative_attribute(input: ArrayView3<'_, f32>, params: &DerivativeParams) -> Array3<f32> {
    sanitize(second_derivative(input, params.axis))
}

/// Root mean square amplitude over a window.
pub fn rms(input: ArrayView3<'_, f32>, params: &WindowParams) -> Array3<f32> {
    let squared = input.mapv(|v| v * v);
    let mean = uniform_filter(squared.view(), params.window);
    sanitize(mean.mapv_into(|v| v.max(0.0).sqrt()))
}

/// Gaussian gradient magnitude.
pub fn gradient_magnitude(input: ArrayView3<'_, f32>, params: &GradientParams) -> SeismicResult<Array3<f32>> {
    Ok(sanitize(gaussian_gradient_magnitude(input, params.sigmas)?))
}

/// Reflection intensity: trapezoidal integral of each trace over a centred
/// window of `window[2]` samples.
pub fn reflection_intensity(input: ArrayView3<'_, f32>, params: &WindowParams) -> Array3<f32> {
    let len = params.window.len_of(CubeAxis::Sample);
    let mut weights = vec![1.0; len];
    if len == 1 {
        weights[0] = 0.0;
    } else {
        weights[0] = 0.5;
        weights[len - 1] = 0.5;
    }
    sanitize(correlate1d(input, &weights, CubeAxis::Sample.index()))
}

/// Exponential time gain: sample `k` (1-based) is scaled by `(1 + k)^gain`.
pub fn time_gain(input: ArrayView3<'_, f32>, params: &GainParams) -> Array3<f32> {
    let mut output = input.to_owned();
    for (k, mut plane) in output.axis_iter_mut(Axis(2)).enumerate() {
        let factor = ((k + 2) as f64).powf(params.gain) as f32;
        plane.mapv_inplace(|v| v * factor);
    }
    sanitize(output)
}

/// Automatic gain control: `x * (1.5 - rms / max(rms))`.
pub fn trace_agc(input: ArrayView3<'_, f32>, params: &WindowParams) -> Array3<f32> {
    let energy = rms(input, params);
    let max_rms = energy.iter().copied().fold(0.0f32, f32::max);
    trace!(max_rms, "AGC normalisation");

    let mut output = Array3::<f32>::zeros(input.raw_dim());
    Zip::from(&mut output)
        .and(&input)
        .and(&energy)
        .for_each(|o, &x, &r| *o = x * (1.5 - safe_ratio(r, max_rms)));
    if max_rms <= 0.0 {
        output.fill(0.0);
    }
    sanitize(output)
}

/// Constant phase rotation of the analytic trace by `rotation` degrees.
pub fn phase_rotation(
    input: ArrayView3<'_, f32>,
    params: &RotationParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let phi = params.rotation.to_radians();
    let (sin, cos) = (phi.sin() as f32, phi.cos() as f32);
    let analytic = analytic_trace(input, ctx.hilbert_padding);
    sanitize(analytic.mapv(|a| a.re * cos - a.im * sin))
}

/// Clamp amplitudes into `[min, max]`.
pub fn rescale_amplitude(input: ArrayView3<'_, f32>, params: &ClipParams) -> Array3<f32> {
    sanitize(input.mapv(|v| v.clamp(params.min, params.max)))
}

/// Histogram equalisation over the whole cube.
///
/// Amplitudes are mapped through the cumulative histogram (255 equal bins
/// between the cube minimum and maximum), giving values in `(0, 1]`.
/// A constant cube maps to zeros.
pub fn histogram_equalization(input: ArrayView3<'_, f32>) -> Array3<f32> {
    let (min, max) = input
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !(max > min) {
        return Array3::zeros(input.raw_dim());
    }

    let bins = HISTOGRAM_EDGES - 1;
    let (lo, span) = (min as f64, (max - min) as f64);
    let step = span / bins as f64;

    let mut counts = vec![0u64; bins];
    for &v in input.iter().filter(|v| v.is_finite()) {
        let b = (((v as f64 - lo) / span) * bins as f64) as usize;
        counts[b.min(bins - 1)] += 1;
    }
    let total: u64 = counts.iter().sum();
    let mut running = 0u64;
    let cdf: Vec<f64> = counts
        .iter()
        .map(|c| {
            running += c;
            running as f64 / total as f64
        })
        .collect();

    let first_centre = lo + 0.5 * step;
    sanitize(input.mapv(|v| {
        if !v.is_finite() {
            return 0.0;
        }
        let pos = (v as f64 - first_centre) / step;
        if pos <= 0.0 {
            return cdf[0] as f32;
        }
        let b = pos.floor() as usize;
        if b >= bins - 1 {
            return cdf[bins - 1] as f32;
        }
        let frac = pos - b as f64;
        (cdf[b] + frac * (cdf[b + 1] - cdf[b])) as f32
    }))
}
