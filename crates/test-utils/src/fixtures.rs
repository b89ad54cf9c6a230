//! Common test fixtures for seismic attribute tests.
//!
//! This module provides pre-defined survey geometries that represent common
//! scenarios: a small field-style survey with real inline/crossline numbers,
//! and the tiny cubes used for exact-value checks.

use ndarray::Array3;
use seismic_common::{AxisIndex, SampleInterval, SeismicCube};

/// Common survey geometries for testing.
pub mod survey {
    /// Survey geometry: first inline, first crossline, first sample time (ms)
    /// and the step along each axis.
    #[derive(Debug, Clone, Copy)]
    pub struct SurveySpec {
        pub inline_origin: f64,
        pub inline_step: f64,
        pub crossline_origin: f64,
        pub crossline_step: f64,
        pub time_origin_ms: f64,
        pub sample_interval_ms: f64,
    }

    /// North-sea style numbering (inlines from 100, crosslines from 300, 4 ms).
    pub const NORTH_SEA: SurveySpec = SurveySpec {
        inline_origin: 100.0,
        inline_step: 1.0,
        crossline_origin: 300.0,
        crossline_step: 1.0,
        time_origin_ms: 0.0,
        sample_interval_ms: 4.0,
    };

    /// Decimated survey with every other line and 2 ms sampling.
    pub const DECIMATED: SurveySpec = SurveySpec {
        inline_origin: 1000.0,
        inline_step: 2.0,
        crossline_origin: 2000.0,
        crossline_step: 2.0,
        time_origin_ms: 400.0,
        sample_interval_ms: 2.0,
    };

    /// Plain array indices on every axis.
    pub const INDEXED: SurveySpec = SurveySpec {
        inline_origin: 0.0,
        inline_step: 1.0,
        crossline_origin: 0.0,
        crossline_step: 1.0,
        time_origin_ms: 0.0,
        sample_interval_ms: 1.0,
    };
}

/// Common cube shapes for testing.
pub mod shapes {
    /// The 2x2x3 cube of the timeslice scenario.
    pub const TINY: (usize, usize, usize) = (2, 2, 3);

    /// Small enough for brute-force kernels, large enough for 3x3x9 windows.
    pub const SMALL: (usize, usize, usize) = (5, 6, 32);

    /// A single trace.
    pub const SINGLE_TRACE: (usize, usize, usize) = (1, 1, 64);

    /// Benchmark-sized cube.
    pub const BENCH: (usize, usize, usize) = (16, 16, 128);
}

/// Build the axis index of a survey for a cube shape.
///
/// Sample times are in milliseconds, as a SEG-Y reader reports them.
pub fn survey_axes(spec: survey::SurveySpec, shape: (usize, usize, usize)) -> AxisIndex {
    AxisIndex::regular(
        [shape.0, shape.1, shape.2],
        [spec.inline_origin, spec.crossline_origin, spec.time_origin_ms],
        [spec.inline_step, spec.crossline_step, spec.sample_interval_ms],
    )
    .expect("survey fixtures have non-empty monotonic axes")
}

/// Bundle a data array with a survey geometry into a cube.
pub fn survey_cube(spec: survey::SurveySpec, data: Array3<f32>) -> SeismicCube {
    let axes = survey_axes(spec, data.dim());
    let interval = SampleInterval::from_millis(spec.sample_interval_ms)
        .expect("survey fixtures have positive sample intervals");
    SeismicCube::new(data, axes, interval).expect("axes built from the data shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismic_common::CubeAxis;

    #[test]
    fn test_survey_axes_numbering() {
        let axes = survey_axes(survey::NORTH_SEA, shapes::SMALL);
        assert_eq!(axes.shape(), [5, 6, 32]);
        assert_eq!(axes.position(CubeAxis::Inline, 104.0).unwrap(), 4);
        assert_eq!(axes.position(CubeAxis::Crossline, 300.0).unwrap(), 0);
        assert_eq!(axes.position(CubeAxis::Sample, 124.0).unwrap(), 31);
    }

    #[test]
    fn test_survey_cube_interval() {
        let cube = survey_cube(survey::DECIMATED, Array3::zeros(shapes::TINY));
        assert!((cube.sample_interval.seconds() - 0.002).abs() < 1e-12);
        assert_eq!(cube.axes.inlines, vec![1000.0, 1002.0]);
    }
}
