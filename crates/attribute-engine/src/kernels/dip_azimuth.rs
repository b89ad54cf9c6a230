//! Dip and azimuth attributes.
//!
//! Dips are expressed in samples per trace scaled by `dip_factor`, either
//! straight from gradient ratios or from the principal eigenvector of the
//! gradient structure tensor (GST). The GST is the box-averaged outer product
//! of the smoothed gradient with itself.

use super::{safe_ratio, sanitize, KernelOutputs};
use crate::filters::{first_derivative, median_filter, uniform_filter, Window};
use nalgebra::{Matrix3, Vector3};
use ndarray::{Array3, ArrayView3, Zip};
use seismic_common::{CubeAxis, SeismicError, SeismicResult};
use tracing::trace;

/// Default scale applied to dips.
pub const DEFAULT_DIP_FACTOR: f64 = 10.0;

/// Tensors with a trace at or below this value have no defined orientation.
const FLAT_TENSOR: f64 = 1e-30;

/// Parameters of `dipgrad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipParams {
    /// Median smoothing applied to the dips. `None` disables it.
    pub smoothing: Option<Window>,
    pub dip_factor: f64,
}

impl Default for DipParams {
    fn default() -> Self {
        Self {
            smoothing: Some(Window::CUBE),
            dip_factor: DEFAULT_DIP_FACTOR,
        }
    }
}

impl DipParams {
    pub fn validate(&self) -> SeismicResult<()> {
        validate_dip_factor(self.dip_factor)
    }
}

/// Parameters of the structure tensor attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorParams {
    /// Averaging window of the tensor products.
    pub window: Window,
    pub dip_factor: f64,
}

impl Default for TensorParams {
    fn default() -> Self {
        Self {
            window: Window::CUBE,
            dip_factor: DEFAULT_DIP_FACTOR,
        }
    }
}

impl TensorParams {
    pub fn validate(&self) -> SeismicResult<()> {
        validate_dip_factor(self.dip_factor)
    }
}

pub(crate) fn validate_dip_factor(dip_factor: f64) -> SeismicResult<()> {
    if !dip_factor.is_finite() || dip_factor == 0.0 {
        return Err(SeismicError::invalid_parameter(
            "dip_factor",
            format!("must be finite and non-zero, got {}", dip_factor),
        ));
    }
    Ok(())
}

/// Smoothed gradients along inline, crossline and sample.
fn gradients(input: ArrayView3<'_, f32>) -> [Array3<f32>; 3] {
    CubeAxis::ALL.map(|axis| first_derivative(input, axis))
}

/// Inline and crossline dips from gradient ratios, `-g_axis / g_sample`.
pub(crate) fn gradient_dip_fields(
    input: ArrayView3<'_, f32>,
    smoothing: Option<Window>,
    dip_factor: f64,
) -> (Array3<f32>, Array3<f32>) {
    let [gi, gj, gk] = gradients(input);
    let factor = dip_factor as f32;
    let dip = |g: &Array3<f32>| {
        let mut out = Array3::<f32>::zeros(gk.raw_dim());
        Zip::from(&mut out)
            .and(g)
            .and(&gk)
            .for_each(|o, &a, &b| *o = safe_ratio(-a, b) * factor);
        match smoothing {
            Some(window) => median_filter(out.view(), window),
            None => out,
        }
    };
    (dip(&gi), dip(&gj))
}

/// Box-averaged gradient structure tensor.
#[derive(Debug, Clone)]
pub struct StructureTensor {
    pub gi2: Array3<f32>,
    pub gj2: Array3<f32>,
    pub gk2: Array3<f32>,
    pub gigj: Array3<f32>,
    pub gigk: Array3<f32>,
    pub gjgk: Array3<f32>,
}

impl StructureTensor {
    /// Build the tensor of `input`, averaging every product over `window`.
    pub fn compute(input: ArrayView3<'_, f32>, window: Window) -> Self {
        let [gi, gj, gk] = gradients(input);
        let product = |a: &Array3<f32>, b: &Array3<f32>| {
            let mut p = a * b;
            p.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
            uniform_filter(p.view(), window)
        };
        trace!(window = %window, "Computed structure tensor");
        Self {
            gi2: product(&gi, &gi),
            gj2: product(&gj, &gj),
            gk2: product(&gk, &gk),
            gigj: product(&gi, &gj),
            gigk: product(&gi, &gk),
            gjgk: product(&gj, &gk),
        }
    }

    /// The tensor at one voxel.
    pub fn at(&self, index: (usize, usize, usize)) -> Matrix3<f64> {
        let v = |a: &Array3<f32>| a[index] as f64;
        Matrix3::new(
            v(&self.gi2), v(&self.gigj), v(&self.gigk),
            v(&self.gigj), v(&self.gj2), v(&self.gjgk),
            v(&self.gigk), v(&self.gjgk), v(&self.gk2),
        )
    }

    /// Evaluate `f` on the tensor of every voxel.
    pub fn map<F>(&self, f: F) -> Array3<f32>
    where
        F: Fn(Matrix3<f64>) -> f32,
    {
        sanitize(Array3::from_shape_fn(self.gi2.raw_dim(), |index| f(self.at(index))))
    }

    fn into_outputs(self) -> KernelOutputs {
        vec![
            ("gi2", self.gi2),
            ("gj2", self.gj2),
            ("gk2", self.gk2),
            ("gigj", self.gigj),
            ("gigk", self.gigk),
            ("gjgk", self.gjgk),
        ]
    }
}

/// Unit eigenvector of the largest eigenvalue, pointing down the sample axis.
/// `None` for a flat tensor.
pub(crate) fn principal_direction(tensor: Matrix3<f64>) -> Option<Vector3<f64>> {
    if !(tensor.trace() > FLAT_TENSOR) {
        return None;
    }
    let eigen = tensor.symmetric_eigen();
    let v = eigen.eigenvectors.column(eigen.eigenvalues.imax()).into_owned();
    let norm = v.norm();
    if !(norm > 0.0) || !norm.is_finite() {
        return None;
    }
    let v = v / norm;
    Some(if v[2] < 0.0 { -v } else { v })
}

/// Eigenvalues sorted from largest to smallest.
pub(crate) fn sorted_eigenvalues(tensor: Matrix3<f64>) -> [f64; 3] {
    let e = tensor.symmetric_eigenvalues();
    let mut values = [e[0], e[1], e[2]];
    values.sort_by(|a, b| b.total_cmp(a));
    values
}

/// Gradient dips (`dipgrad`): outputs `il_dip`, `xl_dip`.
pub fn gradient_dips(input: ArrayView3<'_, f32>, params: &DipParams) -> KernelOutputs {
    let (il, xl) = gradient_dip_fields(input, params.smoothing, params.dip_factor);
    vec![("il_dip", sanitize(il)), ("xl_dip", sanitize(xl))]
}

/// Structure tensor components (`gst`).
pub fn structure_tensor(input: ArrayView3<'_, f32>, params: &TensorParams) -> KernelOutputs {
    StructureTensor::compute(input, params.window).into_outputs()
}

/// Inline and crossline dips of the principal GST direction (`gstdip2d`).
pub fn gst_dips_2d(input: ArrayView3<'_, f32>, params: &TensorParams) -> KernelOutputs {
    let tensor = StructureTensor::compute(input, params.window);
    let df = params.dip_factor;
    let dip = |component: usize| {
        tensor.map(|t| match principal_direction(t) {
            Some(v) => (-v[component] / v[2] * df) as f32,
            None => 0.0,
        })
    };
    vec![("il_dip", dip(0)), ("xl_dip", dip(1))]
}

/// True dip in degrees from vertical of the principal GST direction
/// (`gstdip3d`), in `[0, 90]`.
pub fn gst_dip_3d(input: ArrayView3<'_, f32>, params: &TensorParams) -> KernelOutputs {
    let tensor = StructureTensor::compute(input, params.window);
    let dip = tensor.map(|t| match principal_direction(t) {
        Some(v) => v[2].clamp(-1.0, 1.0).acos().to_degrees() as f32,
        None => 0.0,
    });
    vec![("dip", dip)]
}

/// Azimuth in degrees of the principal GST direction (`gstazm3d`), in
/// `[0, 360)`.
pub fn gst_azimuth_3d(input: ArrayView3<'_, f32>, params: &TensorParams) -> KernelOutputs {
    let tensor = StructureTensor::compute(input, params.window);
    let azimuth = tensor.map(|t| match principal_direction(t) {
        Some(v) => {
            let deg = v[0].atan2(v[1]).to_degrees();
            let deg = if deg < 0.0 { deg + 360.0 } else { deg };
            (deg % 360.0) as f32
        }
        None => 0.0,
    });
    vec![("azimuth", azimuth)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_dipping_reflector;

    fn output<'a>(outputs: &'a KernelOutputs, name: &str) -> &'a Array3<f32> {
        &outputs.iter().find(|(n, _)| *n == name).unwrap().1
    }

    #[test]
    fn test_gradient_dips_of_dipping_reflector() {
        // Reflector moves down half a sample per inline.
        let cube = create_dipping_reflector((9, 5, 64), 30.0, 0.5, 0.0, 15.0, 0.004);
        let params = DipParams {
            smoothing: None,
            ..Default::default()
        };
        let outputs = gradient_dips(cube.view(), &params);
        let il = output(&outputs, "il_dip");
        let xl = output(&outputs, "xl_dip");
        // Three samples below the reflector at inline 4.
        assert!((il[[4, 2, 35]] - 5.0).abs() < 1.0, "il_dip {}", il[[4, 2, 35]]);
        assert!(xl.iter().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn test_gst_dips_of_dipping_reflector() {
        let cube = create_dipping_reflector((9, 5, 64), 30.0, 0.5, 0.0, 15.0, 0.004);
        let outputs = gst_dips_2d(cube.view(), &TensorParams::default());
        let il = output(&outputs, "il_dip")[[4, 2, 33]];
        assert!((il - 5.0).abs() < 1.0, "il_dip {}", il);

        let dip = output(&gst_dip_3d(cube.view(), &TensorParams::default()), "dip")[[4, 2, 33]];
        assert!((dip - 26.57).abs() < 4.0, "dip {}", dip);

        let azm = output(&gst_azimuth_3d(cube.view(), &TensorParams::default()), "azimuth")
            [[4, 2, 33]];
        assert!((azm - 270.0).abs() < 5.0, "azimuth {}", azm);
    }

    #[test]
    fn test_flat_reflector_has_no_dip() {
        let cube = create_dipping_reflector((5, 5, 48), 24.0, 0.0, 0.0, 20.0, 0.004);
        let dip = gst_dip_3d(cube.view(), &TensorParams::default());
        assert!(output(&dip, "dip")[[2, 2, 25]].abs() < 1.0);
    }

    #[test]
    fn test_zero_cube() {
        let cube = Array3::<f32>::zeros((3, 3, 8));
        for outputs in [
            gradient_dips(cube.view(), &DipParams::default()),
            structure_tensor(cube.view(), &TensorParams::default()),
            gst_dips_2d(cube.view(), &TensorParams::default()),
            gst_dip_3d(cube.view(), &TensorParams::default()),
            gst_azimuth_3d(cube.view(), &TensorParams::default()),
        ] {
            for (_, out) in &outputs {
                assert_eq!(out.dim(), (3, 3, 8));
                assert!(out.iter().all(|v| *v == 0.0));
            }
        }
    }

    #[test]
    fn test_structure_tensor_outputs() {
        let cube = Array3::<f32>::zeros((2, 2, 4));
        let names: Vec<_> = structure_tensor(cube.view(), &TensorParams::default())
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["gi2", "gj2", "gk2", "gigj", "gigk", "gjgk"]);
    }

    #[test]
    fn test_dip_factor_validation() {
        let params = DipParams {
            dip_factor: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert!(TensorParams::default().validate().is_ok());
    }

    #[test]
    fn test_sorted_eigenvalues() {
        let values = sorted_eigenvalues(Matrix3::from_diagonal(&Vector3::new(1.0, 3.0, 2.0)));
        assert_eq!(values, [3.0, 2.0, 1.0]);
    }
}
