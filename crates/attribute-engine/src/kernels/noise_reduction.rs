//! Smoothing filters used to suppress noise before interpretation.

use super::sanitize;
use crate::filters::{gaussian_filter, median_filter, uniform_filter, validate_sigmas, Window};
use ndarray::{Array3, ArrayView3};
use seismic_common::SeismicResult;

/// Parameters of `gaussian`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    /// Standard deviation along each axis, in samples.
    pub sigmas: [f64; 3],
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            sigmas: [1.0, 1.0, 1.0],
        }
    }
}

impl GaussianParams {
    pub fn validate(&self) -> SeismicResult<()> {
        validate_sigmas(self.sigmas)
    }
}

/// Parameters of `median` and `convolution`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub window: Window,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            window: Window::CUBE,
        }
    }
}

/// Gaussian smoothing.
pub fn gaussian(input: ArrayView3<'_, f32>, params: &GaussianParams) -> SeismicResult<Array3<f32>> {
    Ok(sanitize(gaussian_filter(input, params.sigmas)?))
}

/// Median filter over a window.
pub fn median(input: ArrayView3<'_, f32>, params: &SmoothingParams) -> Array3<f32> {
    sanitize(median_filter(input, params.window))
}

/// Mean (box) filter over a window.
pub fn convolution(input: ArrayView3<'_, f32>, params: &SmoothingParams) -> Array3<f32> {
    sanitize(uniform_filter(input, params.window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_noise_cube;

    #[test]
    fn test_constant_cube_is_unchanged() {
        let cube = Array3::<f32>::from_elem((4, 4, 6), 2.5);
        let g = gaussian(cube.view(), &GaussianParams::default()).unwrap();
        let m = median(cube.view(), &SmoothingParams::default());
        let c = convolution(cube.view(), &SmoothingParams::default());
        for out in [g, m, c] {
            assert!(out.iter().all(|v| (v - 2.5).abs() < 1e-5));
        }
    }

    #[test]
    fn test_median_removes_spike() {
        let mut cube = Array3::<f32>::zeros((3, 3, 3));
        cube[[1, 1, 1]] = 100.0;
        let out = median(cube.view(), &SmoothingParams::default());
        assert_eq!(out[[1, 1, 1]], 0.0);
    }

    #[test]
    fn test_smoothing_reduces_variance() {
        let cube = create_noise_cube(6, 6, 16, 9);
        let variance = |a: &Array3<f32>| {
            let mean = a.iter().sum::<f32>() / a.len() as f32;
            a.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / a.len() as f32
        };
        let smoothed = convolution(cube.view(), &SmoothingParams::default());
        assert!(variance(&smoothed) < variance(&cube));
    }

    #[test]
    fn test_invalid_sigma() {
        let params = GaussianParams {
            sigmas: [1.0, 0.0, 1.0],
        };
        assert!(params.validate().is_err());
    }
}
