//! Edge detection attributes: coherence measures and curvature.

use super::dip_azimuth::{
    gradient_dip_fields, sorted_eigenvalues, validate_dip_factor, StructureTensor,
    DEFAULT_DIP_FACTOR,
};
use super::{safe_ratio, sanitize, KernelContext, KernelOutputs};
use crate::filters::{box_sum, first_derivative, reflect_index, uniform_filter, Window};
use crate::hilbert::analytic_trace;
use nalgebra::DMatrix;
use ndarray::{Array3, ArrayView3, Zip};
use seismic_common::{CubeAxis, SeismicResult};
use tracing::trace;

/// Parameters of the windowed coherence attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeParams {
    pub window: Window,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            window: Window::EDGE,
        }
    }
}

/// Parameters of `curv`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvatureParams {
    /// Smoothing window of the dips and their derivatives.
    pub window: Window,
    pub dip_factor: f64,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            window: Window::CUBE,
            dip_factor: DEFAULT_DIP_FACTOR,
        }
    }
}

impl CurvatureParams {
    pub fn validate(&self) -> SeismicResult<()> {
        validate_dip_factor(self.dip_factor)
    }
}

/// Semblance: energy of the laterally stacked trace over the total energy in
/// the window, in `[0, 1]`.
pub fn semblance(input: ArrayView3<'_, f32>, params: &EdgeParams) -> Array3<f32> {
    let window = params.window;
    let traces = (window.len_of(CubeAxis::Inline) * window.len_of(CubeAxis::Crossline)) as f32;

    let stacked = box_sum(input, window.lateral()).mapv_into(|v| v * v);
    let numerator = box_sum(stacked.view(), window.vertical());
    let squared = input.mapv(|v| v * v);
    let denominator = box_sum(squared.view(), window);

    let mut out = Array3::<f32>::zeros(input.raw_dim());
    Zip::from(&mut out)
        .and(&numerator)
        .and(&denominator)
        .for_each(|o, &n, &d| *o = safe_ratio(n, d * traces));
    out
}

/// GST discontinuity: line-likeness damped by plane-likeness of the
/// structure tensor eigenvalues.
pub fn gst_discontinuity(input: ArrayView3<'_, f32>, params: &EdgeParams) -> Array3<f32> {
    let tensor = StructureTensor::compute(input, params.window);
    tensor.map(|t| {
        let [e1, e2, e3] = sorted_eigenvalues(t);
        let cline = (e2 - e3) / (e2 + e3);
        let cplane = (e1 - e2) / (e1 + e2);
        (cline * (1.0 - cplane)) as f32
    })
}

/// Chaos: `2 * e2 / (e1 + e3)` of the structure tensor eigenvalues.
pub fn chaos(input: ArrayView3<'_, f32>, params: &EdgeParams) -> Array3<f32> {
    let tensor = StructureTensor::compute(input, params.window);
    tensor.map(|t| {
        let [e1, e2, e3] = sorted_eigenvalues(t);
        (2.0 * e2 / (e1 + e3)) as f32
    })
}

/// Eigenstructure coherence of the analytic traces in a window.
///
/// Each trace in the window contributes one row (real part followed by
/// imaginary part). The output is the largest eigenvalue of the row
/// covariance over the sum of all eigenvalues, in `[0, 1]`.
pub fn eigen_coherence(
    input: ArrayView3<'_, f32>,
    params: &EdgeParams,
    ctx: &KernelContext,
) -> Array3<f32> {
    let analytic = analytic_trace(input, ctx.hilbert_padding);
    let [ki, kj, kk] = params.window.dims();
    let [hi, hj, hk] = params.window.half();
    let (ni, nj, nk) = analytic.dim();
    trace!(window = %params.window, "Eigenstructure coherence");

    let mut rows = DMatrix::<f64>::zeros(ki * kj, 2 * kk);
    let out = Array3::from_shape_fn((ni, nj, nk), |(i, j, k)| {
        for di in 0..ki {
            let ii = reflect_index(i as isize + di as isize - hi as isize, ni);
            for dj in 0..kj {
                let jj = reflect_index(j as isize + dj as isize - hj as isize, nj);
                let row = di * kj + dj;
                for dk in 0..kk {
                    let kk_ = reflect_index(k as isize + dk as isize - hk as isize, nk);
                    let a = analytic[[ii, jj, kk_]];
                    rows[(row, dk)] = a.re as f64;
                    rows[(row, kk + dk)] = a.im as f64;
                }
            }
        }
        let covariance = &rows * rows.transpose();
        let total = covariance.trace();
        if !(total > 0.0) {
            return 0.0;
        }
        let largest = covariance.symmetric_eigenvalues().max();
        (largest / total).abs() as f32
    });
    sanitize(out)
}

/// Curvature from the gradient dip field.
///
/// The dips define a surface normal `(u, v, 1)`; curvatures follow from the
/// second fundamental form of that surface. Outputs `mean`, `gaussian`,
/// `max`, `min`, `most_positive` and `most_negative`.
pub fn curvature(input: ArrayView3<'_, f32>, params: &CurvatureParams) -> KernelOutputs {
    let window = params.window;
    let df = params.dip_factor as f32;
    let (il, xl) = gradient_dip_fields(input, Some(window), params.dip_factor);
    let u = il.mapv_into(|d| -d / df);
    let v = xl.mapv_into(|d| -d / df);

    let smoothed = |field: &Array3<f32>, axis: CubeAxis| {
        uniform_filter(first_derivative(field.view(), axis).view(), window)
    };
    let ux = smoothed(&u, CubeAxis::Inline);
    let uy = smoothed(&u, CubeAxis::Crossline);
    let uz = smoothed(&u, CubeAxis::Sample);
    let vx = smoothed(&v, CubeAxis::Inline);
    let vy = smoothed(&v, CubeAxis::Crossline);
    let vz = smoothed(&v, CubeAxis::Sample);

    let shape = input.raw_dim();
    let mut mean = Array3::<f32>::zeros(shape);
    let mut gauss = Array3::<f32>::zeros(shape);
    let mut kmax = Array3::<f32>::zeros(shape);
    let mut kmin = Array3::<f32>::zeros(shape);

    for (index, m) in mean.indexed_iter_mut() {
        let c = surface_curvature(
            u[index] as f64,
            v[index] as f64,
            [ux[index], uy[index], uz[index]].map(f64::from),
            [vx[index], vy[index], vz[index]].map(f64::from),
        );
        *m = c.mean as f32;
        gauss[index] = c.gaussian as f32;
        kmax[index] = c.max as f32;
        kmin[index] = c.min as f32;
    }

    let mean = sanitize(mean);
    let gauss = sanitize(gauss);
    let kmax = sanitize(kmax);
    let kmin = sanitize(kmin);
    let mut positive = Array3::<f32>::zeros(shape);
    let mut negative = Array3::<f32>::zeros(shape);
    Zip::from(&mut positive)
        .and(&mut negative)
        .and(&kmax)
        .and(&kmin)
        .for_each(|p, n, &a, &b| {
            *p = a.max(b);
            *n = a.min(b);
        });

    vec![
        ("mean", mean),
        ("gaussian", gauss),
        ("max", kmax),
        ("min", kmin),
        ("most_positive", positive),
        ("most_negative", negative),
    ]
}

struct Curvatures {
    mean: f64,
    gaussian: f64,
    max: f64,
    min: f64,
}

/// Curvatures of a surface with normal `(u, v, 1)` and normal derivatives
/// `du = [ux, uy, uz]`, `dv = [vx, vy, vz]`. The `w` component is constant.
fn surface_curvature(u: f64, v: f64, du: [f64; 3], dv: [f64; 3]) -> Curvatures {
    let w = 1.0;
    let [ux, uy, uz] = du;
    let [vx, vy, vz] = dv;
    let (wx, wy, wz) = (0.0, 0.0, 0.0);
    let (e, g) = (1.0, 1.0);

    let s = (u * u + v * v + w * w).sqrt();
    let uv = (u * u + v * v).sqrt();
    let vw = (v * v + w * w).sqrt();

    let f = -(u * w) / (uv * vw);
    let d = -(-u * v * vx + u * u * vy + v * v * ux - u * v * uy) / (uv * uv * s);
    let di = -(v * w * (uy + vx) - 2.0 * u * w * vy - v * v * (uz + wx) + u * v * (vz + wy))
        / (2.0 * uv * vw * s);
    let dii = -(-v * w * wy + v * v * wz + w * w * vy - v * w * vz) / (vw * vw * s);

    let metric = e * g - f * f;
    let mean = (e * dii - 2.0 * f * di + g * d) / (2.0 * metric);
    let gaussian = (d * dii - di * di) / metric;
    let root = (mean * mean - gaussian).sqrt();

    Curvatures {
        mean,
        gaussian,
        max: mean + root,
        min: mean - root,
    }
}
