//! One-sided amplitude spectra of traces, sections and cubes.

use ndarray::{ArrayViewD, Axis};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use seismic_common::{SampleInterval, SeismicError, SeismicResult, Slice};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Averaged amplitude spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Bin frequencies in Hz, from 0 up to Nyquist.
    pub frequencies: Vec<f64>,
    /// Mean of `|X_k| / N` over all traces.
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Frequency and magnitude of the strongest bin.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.magnitudes
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, m)| (self.frequencies[k], *m))
    }

    /// Frequency resolution (bin spacing) in Hz.
    pub fn resolution(&self) -> f64 {
        match self.frequencies.get(1) {
            Some(f) => *f,
            None => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Options for [`spectrum_with_options`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumOptions {
    /// Centred moving average over this many bins (odd). `None` disables it.
    pub smoothing_window: Option<usize>,
}

/// Amplitude spectrum of 1D, 2D or 3D data.
///
/// Traces run along the last axis. Multi-trace input is reduced by averaging
/// the per-trace magnitude spectra.
pub fn spectrum(data: ArrayViewD<'_, f32>, interval: SampleInterval) -> SeismicResult<Spectrum> {
    spectrum_with_options(data, interval, &SpectrumOptions::default())
}

/// Amplitude spectrum with optional smoothing.
pub fn spectrum_with_options(
    data: ArrayViewD<'_, f32>,
    interval: SampleInterval,
    options: &SpectrumOptions,
) -> SeismicResult<Spectrum> {
    let ndim = data.ndim();
    if ndim == 0 || ndim > 3 {
        return Err(SeismicError::shape_mismatch(
            "1D, 2D or 3D data",
            format!("{}D array", ndim),
        ));
    }
    if data.shape().contains(&0) {
        return Err(SeismicError::shape_mismatch(
            "non-empty data",
            format!("shape {:?}", data.shape()),
        ));
    }
    if let Some(window) = options.smoothing_window {
        if window == 0 || window % 2 == 0 {
            return Err(SeismicError::invalid_parameter(
                "smoothing_window",
                format!("must be odd and positive, got {}", window),
            ));
        }
    }

    let n = data.len_of(Axis(ndim - 1));
    let bins = n / 2 + 1;
    let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
    let mut buffer = vec![Complex::new(0.0f64, 0.0); n];
    let mut magnitudes = vec![0.0f64; bins];
    let mut traces = 0usize;

    for lane in data.lanes(Axis(ndim - 1)) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = Complex::new(*v as f64, 0.0);
        }
        fft.process(&mut buffer);
        for (m, x) in magnitudes.iter_mut().zip(&buffer) {
            *m += x.norm() / n as f64;
        }
        traces += 1;
    }

    magnitudes.iter_mut().for_each(|m| *m /= traces as f64);
    if let Some(window) = options.smoothing_window {
        magnitudes = moving_average(&magnitudes, window);
    }

    let df = 1.0 / (n as f64 * interval.seconds());
    let frequencies = (0..bins).map(|k| k as f64 * df).collect();
    debug!(traces, samples = n, bins, "Computed amplitude spectrum");

    Ok(Spectrum {
        frequencies,
        magnitudes,
    })
}

/// Amplitude spectrum of an inline or crossline section.
pub fn spectrum_of_slice(slice: &Slice, interval: SampleInterval) -> SeismicResult<Spectrum> {
    if !slice.axis.keeps_traces() {
        return Err(SeismicError::shape_mismatch(
            "inline or crossline section with a sample axis",
            "timeslice",
        ));
    }
    spectrum(slice.data.view().into_dyn(), interval)
}

/// Centred moving average; the window shrinks at the ends.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(values.len() - 1);
            let span = &values[lo..=hi];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3};
    use test_utils::{create_sine_cube, create_sine_trace};

    #[test]
    fn test_frequency_axis() {
        let trace = Array1::<f32>::zeros(100);
        let spec = spectrum(trace.view().into_dyn(), SampleInterval::FOUR_MS).unwrap();
        assert_eq!(spec.len(), 51);
        assert!((spec.resolution() - 2.5).abs() < 1e-9);
        assert!((spec.frequencies[50] - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_sinusoid_peak() {
        let trace = create_sine_trace(200, 30.0, 0.004);
        let spec = spectrum(trace.view().into_dyn(), SampleInterval::FOUR_MS).unwrap();
        let (freq, mag) = spec.peak().unwrap();
        assert!((freq - 30.0).abs() <= spec.resolution());
        // A unit sinusoid splits its energy between +f and -f.
        assert!((mag - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_cube_spectrum_averages_traces() {
        let cube = create_sine_cube(3, 2, 200, 30.0, 0.004);
        let one = spectrum(
            cube.slice(ndarray::s![0, 0, ..]).into_dyn(),
            SampleInterval::FOUR_MS,
        )
        .unwrap();
        let all = spectrum(cube.view().into_dyn(), SampleInterval::FOUR_MS).unwrap();
        for (a, b) in one.magnitudes.iter().zip(&all.magnitudes) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_bad_rank() {
        let scalar = ndarray::arr0(1.0f32);
        let err = spectrum(scalar.view().into_dyn(), SampleInterval::FOUR_MS).unwrap_err();
        assert!(matches!(err, SeismicError::ShapeMismatch { .. }));

        let empty = Array2::<f32>::zeros((3, 0));
        assert!(spectrum(empty.view().into_dyn(), SampleInterval::FOUR_MS).is_err());
    }

    #[test]
    fn test_timeslice_has_no_spectrum() {
        let cube = Array3::<f32>::zeros((2, 2, 3));
        let ts = crate::slicer::slice_at(cube.view(), seismic_common::SliceAxis::Timeslice, 1)
            .unwrap();
        let err = spectrum_of_slice(&ts, SampleInterval::FOUR_MS).unwrap_err();
        assert!(matches!(err, SeismicError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_smoothing() {
        assert_eq!(moving_average(&[0.0, 3.0, 0.0], 3), vec![1.5, 1.0, 1.5]);

        let trace = Array1::<f32>::ones(16);
        let options = SpectrumOptions {
            smoothing_window: Some(4),
        };
        assert!(spectrum_with_options(trace.view().into_dyn(), SampleInterval::FOUR_MS, &options)
            .is_err());
    }
}
