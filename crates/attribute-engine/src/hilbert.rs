//! Analytic trace via the FFT-based Hilbert transform.

use crate::filters::reflect_index;
use ndarray::{Array3, ArrayView3, Axis, Zip};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use tracing::trace;

/// Analytic trace of every trace (lane along the sample axis) of a cube.
///
/// Each trace is extended by `padding` mirrored samples on both ends before
/// the transform and trimmed afterwards, which keeps the wrap-around of the
/// FFT away from the live samples. The real part reproduces the input.
pub fn analytic_trace(input: ArrayView3<'_, f32>, padding: usize) -> Array3<Complex<f32>> {
    let mut output = Array3::<Complex<f32>>::zeros(input.raw_dim());
    let n = input.len_of(Axis(2));
    if n == 0 {
        return output;
    }

    let len = n + 2 * padding;
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);
    let h = analytic_multiplier(len);
    let scale = 1.0 / len as f64;
    trace!(traces = input.len() / n, samples = n, padded = len, "Hilbert transform");

    let mut buffer = vec![Complex::new(0.0f64, 0.0); len];
    Zip::from(output.lanes_mut(Axis(2)))
        .and(input.lanes(Axis(2)))
        .for_each(|mut out, lane| {
            for (p, b) in buffer.iter_mut().enumerate() {
                let src = reflect_index(p as isize - padding as isize, n);
                *b = Complex::new(lane[src] as f64, 0.0);
            }
            forward.process(&mut buffer);
            for (b, w) in buffer.iter_mut().zip(&h) {
                *b *= w * scale;
            }
            inverse.process(&mut buffer);
            for (o, b) in out.iter_mut().zip(&buffer[padding..padding + n]) {
                *o = Complex::new(b.re as f32, b.im as f32);
            }
        });
    output
}

/// Spectral weights turning an FFT into that of the analytic signal:
/// 1 at DC (and Nyquist for even lengths), 2 for positive frequencies,
/// 0 for negative ones.
fn analytic_multiplier(len: usize) -> Vec<f64> {
    let mut h = vec![0.0; len];
    if len == 0 {
        return h;
    }
    h[0] = 1.0;
    if len % 2 == 0 {
        h[len / 2] = 1.0;
        h[1..len / 2].iter_mut().for_each(|v| *v = 2.0);
    } else {
        h[1..(len + 1) / 2].iter_mut().for_each(|v| *v = 2.0);
    }
    h
}

/// Unwrap a phase sequence in place by removing jumps larger than pi.
pub fn unwrap_phase(phase: &mut [f64]) {
    let mut correction = 0.0;
    let mut previous = match phase.first() {
        Some(p) => *p,
        None => return,
    };

    for value in phase.iter_mut().skip(1) {
        let raw = *value;
        let delta = raw - previous;
        let mut wrapped = (delta + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped == -PI && delta > 0.0 {
            wrapped = PI;
        }
        if delta.abs() >= PI {
            correction += wrapped - delta;
        }
        previous = raw;
        *value = raw + correction;
    }
}
