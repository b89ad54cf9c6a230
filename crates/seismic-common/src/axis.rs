//! Cube axes and the axis index mapping survey coordinates to array indices.

use crate::{SeismicError, SeismicResult};
use serde::{Deserialize, Serialize};

/// Relative tolerance used when matching a coordinate against an axis value.
const COORDINATE_TOLERANCE: f64 = 1e-9;

/// One of the three axes of a cube, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeAxis {
    /// Axis 0.
    Inline,
    /// Axis 1.
    Crossline,
    /// Axis 2, time or depth.
    Sample,
}

impl CubeAxis {
    /// All axes in storage order.
    pub const ALL: [CubeAxis; 3] = [CubeAxis::Inline, CubeAxis::Crossline, CubeAxis::Sample];

    /// Array axis number.
    pub fn index(&self) -> usize {
        match self {
            CubeAxis::Inline => 0,
            CubeAxis::Crossline => 1,
            CubeAxis::Sample => 2,
        }
    }

    /// Axis for an array axis number.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The two other axes, in storage order.
    pub fn others(&self) -> [CubeAxis; 2] {
        match self {
            CubeAxis::Inline => [CubeAxis::Crossline, CubeAxis::Sample],
            CubeAxis::Crossline => [CubeAxis::Inline, CubeAxis::Sample],
            CubeAxis::Sample => [CubeAxis::Inline, CubeAxis::Crossline],
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            CubeAxis::Inline => "inline",
            CubeAxis::Crossline => "crossline",
            CubeAxis::Sample => "sample",
        }
    }
}

impl std::fmt::Display for CubeAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Orientation of a 2D section cut from a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    /// Fixed inline; keeps (crossline, sample).
    Inline,
    /// Fixed crossline; keeps (inline, sample).
    Crossline,
    /// Fixed sample; keeps (inline, crossline).
    Timeslice,
}

impl SliceAxis {
    /// The cube axis held fixed by this section.
    pub fn cube_axis(&self) -> CubeAxis {
        match self {
            SliceAxis::Inline => CubeAxis::Inline,
            SliceAxis::Crossline => CubeAxis::Crossline,
            SliceAxis::Timeslice => CubeAxis::Sample,
        }
    }

    /// Array axis number held fixed by this section.
    pub fn index(&self) -> usize {
        self.cube_axis().index()
    }

    /// Whether the section keeps the sample axis (and so whole traces).
    pub fn keeps_traces(&self) -> bool {
        !matches!(self, SliceAxis::Timeslice)
    }

    /// Parse from string (case-insensitive). Accepts the short survey
    /// abbreviations `il`, `xl` and `ts`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "il" | "inline" => Some(Self::Inline),
            "xl" | "crossline" | "xline" => Some(Self::Crossline),
            "ts" | "timeslice" | "time" | "z" => Some(Self::Timeslice),
            _ => None,
        }
    }
}

impl std::fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceAxis::Inline => write!(f, "inline"),
            SliceAxis::Crossline => write!(f, "crossline"),
            SliceAxis::Timeslice => write!(f, "timeslice"),
        }
    }
}

/// Survey coordinates along each cube axis.
///
/// `inlines[i]` is the inline number stored at array index `i`, and likewise
/// for crosslines and sample times. Each sequence is strictly monotonic;
/// deserialization goes through [`AxisIndex::new`] and checks this too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxisIndex")]
pub struct AxisIndex {
    pub inlines: Vec<f64>,
    pub crosslines: Vec<f64>,
    pub samples: Vec<f64>,
}

/// Unchecked wire form of [`AxisIndex`].
#[derive(Deserialize)]
struct RawAxisIndex {
    inlines: Vec<f64>,
    crosslines: Vec<f64>,
    samples: Vec<f64>,
}

impl TryFrom<RawAxisIndex> for AxisIndex {
    type Error = SeismicError;

    fn try_from(raw: RawAxisIndex) -> SeismicResult<Self> {
        AxisIndex::new(raw.inlines, raw.crosslines, raw.samples)
    }
}

impl AxisIndex {
    /// Create an axis index, checking every axis is non-empty and monotonic.
    pub fn new(inlines: Vec<f64>, crosslines: Vec<f64>, samples: Vec<f64>) -> SeismicResult<Self> {
        let index = Self {
            inlines,
            crosslines,
            samples,
        };
        for axis in CubeAxis::ALL {
            check_monotonic(axis, index.values(axis))?;
        }
        Ok(index)
    }

    /// Evenly spaced axes starting at `origins` and stepping by `steps`.
    pub fn regular(shape: [usize; 3], origins: [f64; 3], steps: [f64; 3]) -> SeismicResult<Self> {
        let build = |n: usize, origin: f64, step: f64| -> Vec<f64> {
            (0..n).map(|i| origin + i as f64 * step).collect()
        };
        Self::new(
            build(shape[0], origins[0], steps[0]),
            build(shape[1], origins[1], steps[1]),
            build(shape[2], origins[2], steps[2]),
        )
    }

    /// Plain 0-based array indices on every axis.
    pub fn indices(shape: [usize; 3]) -> SeismicResult<Self> {
        Self::regular(shape, [0.0; 3], [1.0; 3])
    }

    /// Coordinates along one axis.
    pub fn values(&self, axis: CubeAxis) -> &[f64] {
        match axis {
            CubeAxis::Inline => &self.inlines,
            CubeAxis::Crossline => &self.crosslines,
            CubeAxis::Sample => &self.samples,
        }
    }

    /// Number of entries along each axis.
    pub fn shape(&self) -> [usize; 3] {
        [self.inlines.len(), self.crosslines.len(), self.samples.len()]
    }

    /// Check the index agrees with an array shape.
    pub fn check_shape(&self, shape: &[usize]) -> SeismicResult<()> {
        if shape != self.shape() {
            return Err(SeismicError::shape_mismatch(
                format!("cube shape {:?} from axis index", self.shape()),
                format!("{:?}", shape),
            ));
        }
        Ok(())
    }

    /// Resolve a survey coordinate to an array index.
    pub fn position(&self, axis: CubeAxis, coordinate: f64) -> SeismicResult<usize> {
        let values = self.values(axis);
        if !coordinate.is_finite() {
            return Err(SeismicError::invalid_coordinate(
                axis.name(),
                format!("{} is not a finite coordinate", coordinate),
            ));
        }

        let tolerance = COORDINATE_TOLERANCE * coordinate.abs().max(1.0);
        values
            .iter()
            .position(|v| (v - coordinate).abs() <= tolerance)
            .ok_or_else(|| {
                let first = values.first().copied().unwrap_or(f64::NAN);
                let last = values.last().copied().unwrap_or(f64::NAN);
                SeismicError::invalid_coordinate(
                    axis.name(),
                    format!(
                        "{} is not on the axis (range {} to {}, {} entries)",
                        coordinate,
                        first,
                        last,
                        values.len()
                    ),
                )
            })
    }
}

fn check_monotonic(axis: CubeAxis, values: &[f64]) -> SeismicResult<()> {
    if values.is_empty() {
        return Err(SeismicError::invalid_parameter(
            axis.name(),
            "axis index must not be empty",
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SeismicError::invalid_parameter(
            axis.name(),
            "axis index contains non-finite values",
        ));
    }

    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    if !(increasing || decreasing) {
        return Err(SeismicError::invalid_parameter(
            axis.name(),
            "axis index must be strictly monotonic",
        ));
    }
    Ok(())
}
