//! Complex trace attributes derived from the analytic trace.
//!
//! The analytic trace `a = x + iH(x)` is built along the sample axis. Its
//! modulus is the envelope, its argument the instantaneous phase, and the
//! time derivative of the unwrapped phase the instantaneous frequency.
//! Response attributes split each trace into envelope lobes (segments between
//! strict envelope troughs) and broadcast the value found at the lobe's
//! envelope peak over the whole lobe.

use super::{safe_ratio, sanitize, KernelContext};
use crate::filters::first_derivative;
use crate::hilbert::{analytic_trace, unwrap_phase};
use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut1, Axis, Zip};
use rustfft::num_complex::Complex;
use seismic_common::{CubeAxis, SampleInterval};
use std::f32::consts::PI;

/// Sweetness divides by the instantaneous frequency clamped to at least this
/// many Hz.
pub const SWEETNESS_MIN_FREQUENCY: f32 = 5.0;

/// Parameters shared by the complex trace attributes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexParams {
    /// Sample interval override; the input's interval is used when `None`.
    pub sample_interval: Option<SampleInterval>,
}

impl ComplexParams {
    fn interval(&self, ctx: &KernelContext) -> SampleInterval {
        self.sample_interval.unwrap_or(ctx.sample_interval)
    }
}

fn analytic(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<Complex<f32>> {
    analytic_trace(input, ctx.hilbert_padding)
}

fn envelope_of(analytic: &Array3<Complex<f32>>) -> Array3<f32> {
    analytic.mapv(|a| a.norm())
}

fn phase_of(analytic: &Array3<Complex<f32>>) -> Array3<f32> {
    analytic.mapv(|a| a.arg())
}

fn time_derivative(input: &Array3<f32>) -> Array3<f32> {
    first_derivative(input.view(), CubeAxis::Sample)
}

fn relative_change(envelope: &Array3<f32>) -> Array3<f32> {
    let derivative = time_derivative(envelope);
    let mut rac = Array3::<f32>::zeros(envelope.raw_dim());
    Zip::from(&mut rac)
        .and(&derivative)
        .and(envelope)
        .for_each(|r, &d, &e| *r = safe_ratio(d, e).clamp(-1.0, 1.0));
    rac
}

fn frequency_from_phase(phase: &Array3<f32>, interval: SampleInterval) -> Array3<f32> {
    let mut unwrapped = phase.clone();
    let mut buffer = Vec::with_capacity(phase.len_of(Axis(2)));
    for mut lane in unwrapped.lanes_mut(Axis(2)) {
        buffer.clear();
        buffer.extend(lane.iter().map(|v| *v as f64));
        unwrap_phase(&mut buffer);
        lane.iter_mut().zip(&buffer).for_each(|(v, b)| *v = *b as f32);
    }

    let fs = interval.sampling_frequency() as f32;
    time_derivative(&unwrapped).mapv_into(|d| (d / (2.0 * PI) * fs).abs())
}

fn frequency_of(input: ArrayView3<'_, f32>, interval: SampleInterval, ctx: &KernelContext) -> Array3<f32> {
    frequency_from_phase(&phase_of(&analytic(input, ctx)), interval)
}

/// Envelope (reflection strength).
pub fn envelope(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    sanitize(envelope_of(&analytic(input, ctx)))
}

/// Instantaneous phase in degrees, in `(-180, 180]`.
pub fn instantaneous_phase(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    sanitize(phase_of(&analytic(input, ctx)).mapv_into(f32::to_degrees))
}

/// Cosine of the instantaneous phase.
pub fn cosine_phase(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    sanitize(phase_of(&analytic(input, ctx)).mapv_into(f32::cos))
}

/// Relative amplitude change: time derivative of the envelope over the
/// envelope, clipped to `[-1, 1]`.
pub fn relative_amplitude_change(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    sanitize(relative_change(&envelope_of(&analytic(input, ctx))))
}

/// Amplitude acceleration: time derivative of the relative amplitude change.
pub fn amplitude_acceleration(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    let rac = relative_change(&envelope_of(&analytic(input, ctx)));
    sanitize(time_derivative(&rac))
}

/// Instantaneous frequency in Hz.
pub fn instantaneous_frequency(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    sanitize(frequency_of(input, params.interval(ctx), ctx))
}

/// Instantaneous bandwidth: `|relative amplitude change| / 2pi`.
pub fn instantaneous_bandwidth(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    let rac = relative_change(&envelope_of(&analytic(input, ctx)));
    sanitize(rac.mapv_into(|r| r.abs() / (2.0 * PI)))
}

/// Dominant frequency: `hypot(instantaneous frequency, bandwidth)`.
pub fn dominant_frequency(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let analytic = analytic(input, ctx);
    let mut frequency = frequency_from_phase(&phase_of(&analytic), params.interval(ctx));
    let rac = relative_change(&envelope_of(&analytic));
    Zip::from(&mut frequency)
        .and(&rac)
        .for_each(|f, &r| *f = f.hypot(r.abs() / (2.0 * PI)));
    sanitize(frequency)
}

/// Frequency change: time derivative of the instantaneous frequency.
pub fn frequency_change(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let frequency = frequency_of(input, params.interval(ctx), ctx);
    sanitize(time_derivative(&frequency))
}

/// Sweetness: envelope over the instantaneous frequency (at least 5 Hz).
pub fn sweetness(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let analytic = analytic(input, ctx);
    let frequency = frequency_from_phase(&phase_of(&analytic), params.interval(ctx));
    let mut result = envelope_of(&analytic);
    Zip::from(&mut result)
        .and(&frequency)
        .for_each(|e, &f| *e /= f.max(SWEETNESS_MIN_FREQUENCY));
    sanitize(result)
}

/// Quality factor: `pi * instantaneous frequency / relative amplitude change`.
pub fn quality_factor(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let analytic = analytic(input, ctx);
    let mut result = frequency_from_phase(&phase_of(&analytic), params.interval(ctx));
    let rac = relative_change(&envelope_of(&analytic));
    Zip::from(&mut result)
        .and(&rac)
        .for_each(|q, &r| *q = safe_ratio(PI * *q, r));
    sanitize(result)
}

/// Instantaneous phase (degrees) at the envelope peak of each lobe.
pub fn response_phase(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    let analytic = analytic(input, ctx);
    let envelope = envelope_of(&analytic);
    let phase = phase_of(&analytic).mapv_into(f32::to_degrees);
    sanitize(per_lobe(&envelope, &phase, |_, value| value))
}

/// Instantaneous frequency at the envelope peak of each lobe.
pub fn response_frequency(
    input: ArrayView3<'_, f32>,
    params: &ComplexParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let analytic = analytic(input, ctx);
    let envelope = envelope_of(&analytic);
    let frequency = frequency_from_phase(&phase_of(&analytic), params.interval(ctx));
    sanitize(per_lobe(&envelope, &frequency, |_, value| value))
}

/// Trace amplitude at the envelope peak of each lobe.
pub fn response_amplitude(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    let envelope = envelope_of(&analytic(input, ctx));
    sanitize(per_lobe(&envelope, &input.to_owned(), |_, value| value))
}

/// Envelope peak of each lobe, signed by the trace amplitude at the peak.
pub fn apparent_polarity(input: ArrayView3<'_, f32>, ctx: &KernelContext) -> Array3<f32> {
    let envelope = envelope_of(&analytic(input, ctx));
    sanitize(per_lobe(&envelope, &input.to_owned(), |peak, value| {
        if value == 0.0 {
            0.0
        } else {
            peak * value.signum()
        }
    }))
}

/// For every envelope lobe of every trace, evaluate `pick(envelope peak,
/// source at the peak)` and write it over the lobe.
fn per_lobe<F>(envelope: &Array3<f32>, source: &Array3<f32>, pick: F) -> Array3<f32>
where
    F: Fn(f32, f32) -> f32,
{
    let mut output = Array3::<f32>::zeros(envelope.raw_dim());
    Zip::from(output.lanes_mut(Axis(2)))
        .and(envelope.lanes(Axis(2)))
        .and(source.lanes(Axis(2)))
        .for_each(|out, env, src| fill_lobes(out, env, src, &pick));
    output
}

fn fill_lobes<F>(mut out: ArrayViewMut1<'_, f32>, env: ArrayView1<'_, f32>, src: ArrayView1<'_, f32>, pick: &F)
where
    F: Fn(f32, f32) -> f32,
{
    let n = env.len();
    let mut start = 0;
    for end in 1..=n {
        let boundary = end == n || (end + 1 < n && env[end] < env[end - 1] && env[end] < env[end + 1]);
        if !boundary {
            continue;
        }

        let mut peak = start;
        for k in start..end {
            if env[k] > env[peak] {
                peak = k;
            }
        }
        let value = pick(env[peak], src[peak]);
        for k in start..end {
            out[k] = value;
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use test_utils::create_sine_cube;

    fn ctx() -> KernelContext {
        KernelContext::default()
    }

    #[test]
    fn test_envelope_of_sinusoid() {
        let cube = create_sine_cube(1, 1, 100, 25.0, 0.004);
        let env = envelope(cube.view(), &ctx());
        for k in 20..80 {
            assert!((env[[0, 0, k]] - 1.0).abs() < 0.1, "k={} env={}", k, env[[0, 0, k]]);
        }
    }

    #[test]
    fn test_instantaneous_frequency_of_sinusoid() {
        let cube = create_sine_cube(3, 3, 120, 25.0, 0.004);
        let freq = instantaneous_frequency(cube.view(), &ComplexParams::default(), &ctx());
        for k in 20..100 {
            assert!((freq[[1, 1, k]] - 25.0).abs() < 1.5, "k={} f={}", k, freq[[1, 1, k]]);
        }
    }

    #[test]
    fn test_sample_interval_override_scales_frequency() {
        let cube = create_sine_cube(1, 1, 120, 25.0, 0.004);
        let params = ComplexParams {
            sample_interval: Some(SampleInterval::from_millis(2.0).unwrap()),
        };
        let freq = instantaneous_frequency(cube.view(), &params, &ctx());
        assert!((freq[[0, 0, 60]] - 50.0).abs() < 3.0);
    }

    #[test]
    fn test_cosine_phase_bounded() {
        let cube = create_sine_cube(1, 2, 64, 30.0, 0.004);
        let cos = cosine_phase(cube.view(), &ctx());
        assert!(cos.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_relative_change_clipped() {
        let mut cube = Array3::<f32>::zeros((1, 1, 40));
        cube[[0, 0, 20]] = 1.0;
        let rac = relative_amplitude_change(cube.view(), &ctx());
        assert!(rac.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_fill_lobes_uses_peak_of_each_segment() {
        // Troughs at index 3 (strictly below both neighbours).
        let env = Array1::from(vec![1.0f32, 3.0, 2.0, 0.5, 4.0, 5.0, 1.0]);
        let src = Array1::from(vec![10.0f32, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
        let mut out = Array1::<f32>::zeros(7);
        fill_lobes(out.view_mut(), env.view(), src.view(), &|_, v| v);
        assert_eq!(out.to_vec(), vec![20.0, 20.0, 20.0, 60.0, 60.0, 60.0, 60.0]);
    }

    #[test]
    fn test_apparent_polarity_sign() {
        let env = Array3::from_shape_vec((1, 1, 3), vec![1.0f32, 2.0, 1.0]).unwrap();
        let src = Array3::from_shape_vec((1, 1, 3), vec![0.5f32, -1.5, 0.5]).unwrap();
        let out = per_lobe(&env, &src, |peak, value| peak * value.signum());
        assert!(out.iter().all(|v| *v == -2.0));
    }

    #[test]
    fn test_zero_input_gives_zero() {
        let cube = Array3::<f32>::zeros((2, 2, 16));
        let params = ComplexParams::default();
        assert!(quality_factor(cube.view(), &params, &ctx()).iter().all(|v| *v == 0.0));
        assert!(sweetness(cube.view(), &params, &ctx()).iter().all(|v| *v == 0.0));
        assert!(apparent_polarity(cube.view(), &ctx()).iter().all(|v| *v == 0.0));
    }
}
