//! Test data generators for creating synthetic seismic cubes.
//!
//! These generators create predictable, verifiable cubes whose attributes
//! have known analytic values, so kernels can be checked without field data.
//! All cubes use `(inline, crossline, sample)` axis order.

use ndarray::{Array1, Array3};
use std::f64::consts::PI;

/// Creates a cube whose value encodes its own position.
///
/// Each voxel value is calculated as: `i * 10000 + j * 100 + k`
///
/// This makes it easy to verify slicing and re-embedding by checking that
/// `cube[[i, j, k]] == i * 10000 + j * 100 + k`.
///
/// # Example
///
/// ```
/// use test_utils::create_numbered_cube;
///
/// let cube = create_numbered_cube(2, 3, 4);
/// assert_eq!(cube.dim(), (2, 3, 4));
/// assert_eq!(cube[[1, 2, 3]], 10203.0);
/// ```
pub fn create_numbered_cube(inlines: usize, crosslines: usize, samples: usize) -> Array3<f32> {
    Array3::from_shape_fn((inlines, crosslines, samples), |(i, j, k)| {
        (i * 10000 + j * 100 + k) as f32
    })
}

/// Creates an all-zero cube, the padding case every kernel must survive.
pub fn create_zero_cube(inlines: usize, crosslines: usize, samples: usize) -> Array3<f32> {
    Array3::zeros((inlines, crosslines, samples))
}

/// Creates a cube with a quadratic ramp along the sample axis.
///
/// Every trace is `scale * k^2`, so the exact first derivative is
/// `2 * scale * k` and the exact second derivative is `2 * scale`.
pub fn create_quadratic_ramp(
    inlines: usize,
    crosslines: usize,
    samples: usize,
    scale: f32,
) -> Array3<f32> {
    Array3::from_shape_fn((inlines, crosslines, samples), |(_, _, k)| {
        scale * (k * k) as f32
    })
}

/// Creates a single sinusoidal trace.
///
/// # Arguments
///
/// * `samples` - Trace length
/// * `frequency` - Frequency in Hz
/// * `interval_s` - Sample interval in seconds
pub fn create_sine_trace(samples: usize, frequency: f64, interval_s: f64) -> Array1<f32> {
    Array1::from_shape_fn(samples, |k| {
        (2.0 * PI * frequency * k as f64 * interval_s).sin() as f32
    })
}

/// Creates a cube where every trace is the same sinusoid.
///
/// Useful for spectrum checks and complex-trace attributes: the envelope of
/// a pure sinusoid is its amplitude and its instantaneous frequency is
/// `frequency` away from the trace ends.
pub fn create_sine_cube(
    inlines: usize,
    crosslines: usize,
    samples: usize,
    frequency: f64,
    interval_s: f64,
) -> Array3<f32> {
    let trace = create_sine_trace(samples, frequency, interval_s);
    Array3::from_shape_fn((inlines, crosslines, samples), |(_, _, k)| trace[k])
}

/// Creates a cube holding one Ricker reflector on a dipping plane.
///
/// The reflector sits at sample `t0 + dip_i * i + dip_j * j` (in samples),
/// with a Ricker pulse of `frequency` Hz. Dip attributes should recover a
/// consistent inline and crossline dip away from the cube edges.
pub fn create_dipping_reflector(
    shape: (usize, usize, usize),
    t0: f64,
    dip_i: f64,
    dip_j: f64,
    frequency: f64,
    interval_s: f64,
) -> Array3<f32> {
    Array3::from_shape_fn(shape, |(i, j, k)| {
        let centre = t0 + dip_i * i as f64 + dip_j * j as f64;
        let t = (k as f64 - centre) * interval_s;
        let a = (PI * frequency * t).powi(2);
        ((1.0 - 2.0 * a) * (-a).exp()) as f32
    })
}

/// Creates a cube of deterministic pseudo-random values in `[-1, 1)`.
///
/// Uses a fixed linear congruential generator so tests are repeatable
/// without a random-number dependency.
pub fn create_noise_cube(
    inlines: usize,
    crosslines: usize,
    samples: usize,
    seed: u64,
) -> Array3<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Array3::from_shape_simple_fn((inlines, crosslines, samples), || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) as f32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_numbered_cube() {
        let cube = create_numbered_cube(3, 4, 5);
        assert_eq!(cube.dim(), (3, 4, 5));
        assert_eq!(cube[[0, 0, 0]], 0.0);
        assert_eq!(cube[[2, 3, 4]], 20304.0);
    }

    #[test]
    fn test_quadratic_ramp_values() {
        let cube = create_quadratic_ramp(1, 1, 5, 0.5);
        assert_eq!(cube[[0, 0, 4]], 8.0);
        assert_eq!(cube[[0, 0, 2]], 2.0);
    }

    #[test]
    fn test_sine_trace_starts_at_zero() {
        let trace = create_sine_trace(100, 25.0, 0.004);
        assert_eq!(trace[0], 0.0);
        // Quarter period of 25 Hz at 4 ms is 2.5 samples; sample 10 is a full period.
        assert!(trace[10].abs() < 1e-5);
    }

    #[test]
    fn test_dipping_reflector_peak_moves() {
        let cube = create_dipping_reflector((4, 1, 64), 20.0, 2.0, 0.0, 30.0, 0.004);
        for i in 0..4 {
            let peak = (20 + 2 * i) as usize;
            assert_eq!(cube[[i, 0, peak]], 1.0);
        }
    }

    #[test]
    fn test_noise_cube_is_deterministic() {
        let a = create_noise_cube(3, 3, 8, 7);
        let b = create_noise_cube(3, 3, 8, 7);
        let c = create_noise_cube(3, 3, 8, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
    }
}
