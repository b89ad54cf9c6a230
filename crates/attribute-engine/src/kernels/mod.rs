//! Attribute kernels grouped by family.
//!
//! Every kernel takes an `(inline, crossline, sample)` cube view and returns
//! freshly allocated named outputs of the same shape. A 2D section goes
//! through the same code as a cube whose sliced axis has length 1.

pub mod amplitude;
pub mod complex_trace;
pub mod dip_azimuth;
pub mod edge_detection;
pub mod frequency;
pub mod noise_reduction;

use crate::filters::{finite_or_zero, Window};
use ndarray::Array3;
use seismic_common::{CubeAxis, SampleInterval};

/// Named outputs of one kernel, in a fixed order.
pub type KernelOutputs = Vec<(&'static str, Array3<f32>)>;

/// Settings shared by all kernels of one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelContext {
    /// Sample interval of the input, when the kernel needs one.
    pub sample_interval: SampleInterval,
    /// Mirrored samples added around each trace for the Hilbert transform.
    pub hilbert_padding: usize,
}

impl Default for KernelContext {
    fn default() -> Self {
        Self {
            sample_interval: SampleInterval::FOUR_MS,
            hilbert_padding: 12,
        }
    }
}

/// Cube axes a kernel's output depends on beyond the output voxel itself.
///
/// A section can be cut before the kernel runs only if the footprint does
/// not span the sliced axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint([bool; 3]);

impl Footprint {
    /// Pointwise kernels.
    pub const NONE: Footprint = Footprint([false, false, false]);
    /// Trace-wise kernels.
    pub const SAMPLES: Footprint = Footprint([false, false, true]);
    /// Kernels with 3D stencils or cube-wide statistics.
    pub const ALL: Footprint = Footprint([true, true, true]);

    /// Axes spanned by a window wider than one sample.
    pub fn of_window(window: Window) -> Self {
        let dims = window.dims();
        Footprint([dims[0] > 1, dims[1] > 1, dims[2] > 1])
    }

    /// Union of two footprints.
    pub fn union(self, other: Footprint) -> Self {
        Footprint([
            self.0[0] || other.0[0],
            self.0[1] || other.0[1],
            self.0[2] || other.0[2],
        ])
    }

    /// Whether the footprint reaches along `axis`.
    pub fn spans(&self, axis: CubeAxis) -> bool {
        self.0[axis.index()]
    }
}

/// Map non-finite values to the `0.0` sentinel in place.
pub(crate) fn sanitize(mut array: Array3<f32>) -> Array3<f32> {
    array.mapv_inplace(finite_or_zero);
    array
}

/// Elementwise `numerator / denominator`, with `0.0` where the quotient is
/// not finite.
pub(crate) fn safe_ratio(numerator: f32, denominator: f32) -> f32 {
    finite_or_zero(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_of_window() {
        let fp = Footprint::of_window(Window::new([1, 1, 9]).unwrap());
        assert_eq!(fp, Footprint::SAMPLES);
        assert!(!fp.spans(CubeAxis::Inline));

        let fp = Footprint::of_window(Window::new([3, 1, 1]).unwrap());
        assert!(fp.spans(CubeAxis::Inline));
        assert_eq!(fp.union(Footprint::SAMPLES), Footprint([true, false, true]));
    }

    #[test]
    fn test_safe_ratio() {
        assert_eq!(safe_ratio(1.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
        assert_eq!(safe_ratio(3.0, 2.0), 1.5);
    }
}
