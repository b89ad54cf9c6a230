//! Seismic cubes and the 2D sections cut from them.

use crate::{AxisIndex, SampleInterval, SeismicError, SeismicResult, SliceAxis};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut3, Axis};

/// A 3D amplitude cube with its axis index, as delivered by a reader.
///
/// Axis order is always `(inline, crossline, sample)`.
#[derive(Debug, Clone)]
pub struct SeismicCube {
    pub data: Array3<f32>,
    pub axes: AxisIndex,
    pub sample_interval: SampleInterval,
}

impl SeismicCube {
    /// Create a cube, checking the axis index matches the data shape.
    pub fn new(data: Array3<f32>, axes: AxisIndex, sample_interval: SampleInterval) -> SeismicResult<Self> {
        axes.check_shape(data.shape())?;
        Ok(Self {
            data,
            axes,
            sample_interval,
        })
    }

    /// Create a cube indexed by plain array positions on every axis.
    pub fn from_array(data: Array3<f32>, sample_interval: SampleInterval) -> SeismicResult<Self> {
        let (ni, nj, nk) = data.dim();
        let axes = AxisIndex::indices([ni, nj, nk])?;
        Self::new(data, axes, sample_interval)
    }

    /// Borrow the amplitudes.
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Shape as `(inlines, crosslines, samples)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Amplitude at a percentile of the absolute values, for display scaling.
    pub fn abs_percentile(&self, percentile: f64) -> f32 {
        abs_percentile(self.data.iter().copied(), percentile)
    }
}

/// Value at `percentile` (0-100) of the absolute finite values.
///
/// Display code clips at the 99th percentile so a few spikes do not wash out
/// the colour scale. Returns 0 when there are no finite values.
pub fn abs_percentile(values: impl Iterator<Item = f32>, percentile: f64) -> f32 {
    let mut values: Vec<f32> = values.filter(|v| v.is_finite()).map(f32::abs).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let p = percentile.clamp(0.0, 100.0) / 100.0;
    let rank = (p * (values.len() - 1) as f64).round() as usize;
    values[rank.min(values.len() - 1)]
}

/// A 2D section of a cube with one axis held fixed.
///
/// The remaining axes keep cube order: an inline section is
/// `(crossline, sample)`, a crossline section `(inline, sample)` and a
/// timeslice `(inline, crossline)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// The fixed axis.
    pub axis: SliceAxis,
    /// Array index along the fixed axis.
    pub index: usize,
    /// Survey coordinate of the section, when it was cut by coordinate.
    pub coordinate: Option<f64>,
    /// Sample interval of the cube it was cut from, when known.
    pub sample_interval: Option<SampleInterval>,
    pub data: Array2<f32>,
}

impl Slice {
    /// Create a section from a plane of amplitudes.
    pub fn new(axis: SliceAxis, index: usize, coordinate: Option<f64>, data: Array2<f32>) -> Self {
        Self {
            axis,
            index,
            coordinate,
            sample_interval: None,
            data,
        }
    }

    /// Attach the sample interval of the source cube.
    pub fn with_sample_interval(mut self, sample_interval: SampleInterval) -> Self {
        self.sample_interval = Some(sample_interval);
        self
    }

    /// Borrow the plane.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Shape of the plane.
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// View the section as a cube with the fixed axis collapsed to length 1.
    ///
    /// Kernels written for cubes run unchanged on this view; stencils across
    /// the collapsed axis see a single mirrored sample.
    pub fn as_volume(&self) -> ArrayView3<'_, f32> {
        self.data.view().insert_axis(Axis(self.axis.index()))
    }

    /// Shape of the cube this section fits into, given the cube's extent
    /// along the fixed axis.
    pub fn volume_shape(&self, fixed_len: usize) -> [usize; 3] {
        let (a, b) = self.data.dim();
        match self.axis {
            SliceAxis::Inline => [fixed_len, a, b],
            SliceAxis::Crossline => [a, fixed_len, b],
            SliceAxis::Timeslice => [a, b, fixed_len],
        }
    }

    /// Write this plane back into a cube at the section's index.
    pub fn embed_into(&self, mut cube: ArrayViewMut3<'_, f32>) -> SeismicResult<()> {
        let axis = self.axis.index();
        let len = cube.len_of(Axis(axis));
        if self.index >= len {
            return Err(SeismicError::invalid_coordinate(
                self.axis.to_string(),
                format!("index {} outside 0..{}", self.index, len),
            ));
        }

        let expected = self.volume_shape(len);
        if cube.shape() != expected {
            return Err(SeismicError::shape_mismatch(
                format!("cube shape {:?}", expected),
                format!("{:?}", cube.shape()),
            ));
        }

        cube.index_axis_mut(Axis(axis), self.index).assign(&self.data);
        Ok(())
    }
}
