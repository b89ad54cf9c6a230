//! Separable filters on 3D cubes.
//!
//! Every filter here treats out-of-range neighbours with half-sample
//! symmetric reflection (`d c b a | a b c d | d c b a`), so a stencil at the
//! edge of a cube sees the mirrored interior instead of zeros. Accumulation
//! is done in `f64`; outputs are `f32` like the input.

use ndarray::{Array3, ArrayView3, Axis, Zip};
use seismic_common::{CubeAxis, SeismicError, SeismicResult};

/// Weights of the smoothed first derivative along the derivative axis.
pub const FIRST_DERIVATIVE: [f64; 3] = [-0.5, 0.0, 0.5];

/// Cross-axis smoothing paired with [`FIRST_DERIVATIVE`].
pub const FIRST_DERIVATIVE_SMOOTHING: [f64; 3] = [0.178947, 0.642105, 0.178947];

/// Weights of the smoothed second derivative along the derivative axis.
pub const SECOND_DERIVATIVE: [f64; 5] = [0.232905, 0.002668, -0.471147, 0.002668, 0.232905];

/// Cross-axis smoothing paired with [`SECOND_DERIVATIVE`].
pub const SECOND_DERIVATIVE_SMOOTHING: [f64; 5] = [0.030320, 0.249724, 0.439911, 0.249724, 0.030320];

/// Gaussian kernels are cut off at this many standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Operator window in `(inline, crossline, sample)` samples.
///
/// Every dimension is odd and positive so the window has a centre sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window([usize; 3]);

impl Window {
    /// `3x3x3`, the default of dip, curvature and smoothing kernels.
    pub const CUBE: Window = Window([3, 3, 3]);

    /// `1x1x9`, the default of trace-windowed amplitude kernels.
    pub const TRACE: Window = Window([1, 1, 9]);

    /// `3x3x9`, the default of edge-detection kernels.
    pub const EDGE: Window = Window([3, 3, 9]);

    /// Create a window, rejecting even or zero dimensions.
    pub fn new(dims: [usize; 3]) -> SeismicResult<Self> {
        if let Some(bad) = dims.iter().find(|d| **d == 0 || **d % 2 == 0) {
            return Err(SeismicError::invalid_parameter(
                "kernel",
                format!(
                    "window {:?} must have odd, positive dimensions (got {})",
                    dims, bad
                ),
            ));
        }
        Ok(Self(dims))
    }

    /// Window dimensions.
    pub fn dims(&self) -> [usize; 3] {
        self.0
    }

    /// Window length along one axis.
    pub fn len_of(&self, axis: CubeAxis) -> usize {
        self.0[axis.index()]
    }

    /// Half-widths along each axis.
    pub fn half(&self) -> [usize; 3] {
        [self.0[0] / 2, self.0[1] / 2, self.0[2] / 2]
    }

    /// The inline and crossline extent of this window, one sample deep.
    pub fn lateral(&self) -> Window {
        Window([self.0[0], self.0[1], 1])
    }

    /// The sample extent of this window, one trace wide.
    pub fn vertical(&self) -> Window {
        Window([1, 1, self.0[2]])
    }

    /// Number of samples covered by the window.
    pub fn volume(&self) -> usize {
        self.0.iter().product()
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Map a possibly out-of-range index into `0..n` by half-sample reflection.
///
/// `n` must be positive.
#[inline]
pub fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

/// Correlate every lane along `axis` with `weights`.
///
/// The weights are centred on `weights.len() / 2`:
/// `out[i] = sum_j weights[j] * x[i + j - len / 2]`.
pub fn correlate1d(input: ArrayView3<'_, f32>, weights: &[f64], axis: usize) -> Array3<f32> {
    let mut output = Array3::<f32>::zeros(input.raw_dim());
    let n = input.len_of(Axis(axis));
    if n == 0 || weights.is_empty() {
        return output;
    }

    let half = (weights.len() / 2) as isize;
    let mut buffer = vec![0.0f64; n];
    Zip::from(output.lanes_mut(Axis(axis)))
        .and(input.lanes(Axis(axis)))
        .for_each(|mut out, lane| {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v as f64;
            }
            for (i, o) in out.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (j, w) in weights.iter().enumerate() {
                    let idx = reflect_index(i as isize + j as isize - half, n);
                    acc += w * buffer[idx];
                }
                *o = acc as f32;
            }
        });
    output
}

/// Apply one set of weights along `axis` and another along the two remaining
/// axes, in axis order.
fn separable(
    input: ArrayView3<'_, f32>,
    axis: CubeAxis,
    along: &[f64],
    across: &[f64],
) -> Array3<f32> {
    let mut result = correlate1d(input, along, axis.index());
    for other in axis.others() {
        result = correlate1d(result.view(), across, other.index());
    }
    result
}

/// Smoothed central first derivative along `axis`.
pub fn first_derivative(input: ArrayView3<'_, f32>, axis: CubeAxis) -> Array3<f32> {
    separable(input, axis, &FIRST_DERIVATIVE, &FIRST_DERIVATIVE_SMOOTHING)
}

/// Smoothed second derivative along `axis`.
pub fn second_derivative(input: ArrayView3<'_, f32>, axis: CubeAxis) -> Array3<f32> {
    separable(input, axis, &SECOND_DERIVATIVE, &SECOND_DERIVATIVE_SMOOTHING)
}

/// Moving average over `window`.
pub fn uniform_filter(input: ArrayView3<'_, f32>, window: Window) -> Array3<f32> {
    let mut result = input.to_owned();
    for axis in CubeAxis::ALL {
        let size = window.len_of(axis);
        if size > 1 {
            let weights = vec![1.0 / size as f64; size];
            result = correlate1d(result.view(), &weights, axis.index());
        }
    }
    result
}

/// Moving sum over `window` (the unnormalised box filter).
pub fn box_sum(input: ArrayView3<'_, f32>, window: Window) -> Array3<f32> {
    let mut result = input.to_owned();
    for axis in CubeAxis::ALL {
        let size = window.len_of(axis);
        if size > 1 {
            let weights = vec![1.0; size];
            result = correlate1d(result.view(), &weights, axis.index());
        }
    }
    result
}

/// Median over `window`.
///
/// Brute force per voxel; windows are small.
pub fn median_filter(input: ArrayView3<'_, f32>, window: Window) -> Array3<f32> {
    let (ni, nj, nk) = input.dim();
    let [hi, hj, hk] = window.half();
    let mut values = Vec::with_capacity(window.volume());

    Array3::from_shape_fn((ni, nj, nk), |(i, j, k)| {
        values.clear();
        for di in 0..window.dims()[0] {
            let ii = reflect_index(i as isize + di as isize - hi as isize, ni);
            for dj in 0..window.dims()[1] {
                let jj = reflect_index(j as isize + dj as isize - hj as isize, nj);
                for dk in 0..window.dims()[2] {
                    let kk = reflect_index(k as isize + dk as isize - hk as isize, nk);
                    values.push(input[[ii, jj, kk]]);
                }
            }
        }
        let mid = values.len() / 2;
        let (_, median, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        *median
    })
}

/// Check Gaussian standard deviations are finite and positive.
pub fn validate_sigmas(sigmas: [f64; 3]) -> SeismicResult<()> {
    if sigmas.iter().any(|s| !s.is_finite() || *s <= 0.0) {
        return Err(SeismicError::invalid_parameter(
            "sigmas",
            format!("every sigma must be finite and > 0, got {:?}", sigmas),
        ));
    }
    Ok(())
}

/// Sampled Gaussian (`order` 0) or Gaussian-derivative (`order` 1) weights,
/// truncated at [`GAUSSIAN_TRUNCATE`] standard deviations.
///
/// The derivative weights are laid out for [`correlate1d`], so correlating a
/// ramp with them yields its positive slope.
pub fn gaussian_weights(sigma: f64, order: u8) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let variance = sigma * sigma;
    let phi: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / variance).exp())
        .collect();
    let total: f64 = phi.iter().sum();

    (-radius..=radius)
        .zip(phi)
        .map(|(x, p)| {
            let p = p / total;
            match order {
                0 => p,
                _ => x as f64 / variance * p,
            }
        })
        .collect()
}

/// Gaussian smoothing with one standard deviation per axis.
pub fn gaussian_filter(input: ArrayView3<'_, f32>, sigmas: [f64; 3]) -> SeismicResult<Array3<f32>> {
    validate_sigmas(sigmas)?;
    let mut result = input.to_owned();
    for axis in CubeAxis::ALL {
        let weights = gaussian_weights(sigmas[axis.index()], 0);
        result = correlate1d(result.view(), &weights, axis.index());
    }
    Ok(result)
}

/// Magnitude of the gradient computed with Gaussian-derivative filters.
pub fn gaussian_gradient_magnitude(
    input: ArrayView3<'_, f32>,
    sigmas: [f64; 3],
) -> SeismicResult<Array3<f32>> {
    validate_sigmas(sigmas)?;
    let mut sum_sq = Array3::<f32>::zeros(input.raw_dim());

    for axis in CubeAxis::ALL {
        let mut derivative = input.to_owned();
        for smooth in CubeAxis::ALL {
            let order = u8::from(smooth == axis);
            let weights = gaussian_weights(sigmas[smooth.index()], order);
            derivative = correlate1d(derivative.view(), &weights, smooth.index());
        }
        Zip::from(&mut sum_sq)
            .and(&derivative)
            .for_each(|s, d| *s += d * d);
    }

    Ok(sum_sq.mapv_into(f32::sqrt))
}

/// Discrete linear convolution returning the centre `signal.len()` samples
/// (zero padding outside the signal).
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let m = kernel.len();
    if n == 0 || m == 0 {
        return vec![0.0; n];
    }

    let offset = (m - 1) / 2;
    (0..n)
        .map(|out| {
            let full = out + offset;
            let lo = (full + 1).saturating_sub(m);
            let hi = full.min(n - 1);
            (lo..=hi).map(|j| signal[j] * kernel[full - j]).sum()
        })
        .collect()
}

/// Replace NaN and infinities with the `0.0` sentinel.
#[inline]
pub fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn trace(values: &[f32]) -> Array3<f32> {
        Array3::from_shape_vec((1, 1, values.len()), values.to_vec()).unwrap()
    }

    #[test]
    fn test_reflect_index() {
        // d c b a | a b c d | d c b a
        let n = 4;
        let mapped: Vec<usize> = (-4..8).map(|i| reflect_index(i, n)).collect();
        assert_eq!(mapped, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(reflect_index(-3, 1), 0);
        assert_eq!(reflect_index(5, 1), 0);
    }

    #[test]
    fn test_window_validation() {
        assert!(Window::new([1, 1, 9]).is_ok());
        assert!(Window::new([3, 2, 3]).is_err());
        assert!(Window::new([0, 1, 1]).is_err());
        assert_eq!(Window::new([3, 3, 9]).unwrap().half(), [1, 1, 4]);
    }

    #[test]
    fn test_correlate1d_reflect_boundary() {
        let input = trace(&[1.0, 2.0, 3.0]);
        let out = correlate1d(input.view(), &FIRST_DERIVATIVE, 2);
        // Edges see the mirrored sample: [1,1,2,3,3]
        assert_eq!(out.as_slice().unwrap(), &[0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_first_derivative_of_ramp() {
        let input = Array3::from_shape_fn((3, 3, 8), |(_, _, k)| 2.0 * k as f32);
        let out = first_derivative(input.view(), CubeAxis::Sample);
        for k in 1..7 {
            assert!((out[[1, 1, k]] - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_first_derivative_other_axis() {
        let input = Array3::from_shape_fn((6, 2, 2), |(i, _, _)| i as f32);
        let out = first_derivative(input.view(), CubeAxis::Inline);
        assert!((out[[2, 0, 0]] - 1.0).abs() < 1e-4);
        assert!((out[[3, 1, 1]] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_uniform_filter_mean() {
        let input = trace(&[0.0, 3.0, 6.0, 9.0]);
        let out = uniform_filter(input.view(), Window::new([1, 1, 3]).unwrap());
        assert!((out[[0, 0, 1]] - 3.0).abs() < 1e-6);
        assert!((out[[0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_median_filter_removes_spike() {
        let input = trace(&[1.0, 1.0, 50.0, 1.0, 1.0]);
        let out = median_filter(input.view(), Window::new([1, 1, 3]).unwrap());
        assert!(out.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_gaussian_weights_normalised() {
        let w = gaussian_weights(1.0, 0);
        assert_eq!(w.len(), 9);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let d = gaussian_weights(1.0, 1);
        assert!(d[8] > 0.0 && d[0] < 0.0);
    }

    #[test]
    fn test_gaussian_gradient_magnitude_of_ramp() {
        let input = Array3::from_shape_fn((9, 9, 9), |(i, _, _)| 3.0 * i as f32);
        let out = gaussian_gradient_magnitude(input.view(), [1.0, 1.0, 1.0]).unwrap();
        assert!((out[[4, 4, 4]] - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        let input = Array3::<f32>::zeros((2, 2, 2));
        assert!(gaussian_filter(input.view(), [1.0, 0.0, 1.0]).is_err());
        assert!(gaussian_gradient_magnitude(input.view(), [1.0, 1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_convolve_same() {
        let out = convolve_same(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        // full: [0, 1, 2.5, 4, 1.5]; centre three
        assert_eq!(out, vec![1.0, 2.5, 4.0]);

        let even = convolve_same(&[1.0, 0.0, 0.0, 0.0], &[1.0, 2.0, 3.0, 4.0]);
        // full: [1,2,3,4,0,0,0]; offset 1
        assert_eq!(even, vec![2.0, 3.0, 4.0, 0.0]);
    }
}
