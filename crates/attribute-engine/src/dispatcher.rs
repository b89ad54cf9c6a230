//! Request dispatch: validate, reduce to a section when asked, compute.

use crate::attribute::Attribute;
use crate::catalog::AttributeKind;
use crate::config::EngineConfig;
use crate::kernels::{KernelContext, KernelOutputs};
use crate::params::AttributeParams;
use crate::slicer::slice_at;
use ndarray::{Array3, ArrayD, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};
use seismic_common::{
    abs_percentile, AxisIndex, SampleInterval, SeismicCube, SeismicError, SeismicResult, Slice,
    SliceAxis,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Data an attribute is computed on.
#[derive(Debug, Clone, Copy)]
pub enum AttributeInput<'a> {
    /// A 3D cube, optionally with its survey axes and sample interval.
    Volume {
        data: ArrayView3<'a, f32>,
        axes: Option<&'a AxisIndex>,
        sample_interval: Option<SampleInterval>,
    },
    /// A section already cut from a cube.
    Section(&'a Slice),
}

impl<'a> AttributeInput<'a> {
    /// Shape of the data the kernel sees, with a section's fixed axis
    /// collapsed to length 1.
    pub fn shape(&self) -> [usize; 3] {
        let dim = match self {
            AttributeInput::Volume { data, .. } => data.dim(),
            AttributeInput::Section(slice) => slice.as_volume().dim(),
        };
        [dim.0, dim.1, dim.2]
    }
}

impl<'a> From<&'a SeismicCube> for AttributeInput<'a> {
    fn from(cube: &'a SeismicCube) -> Self {
        AttributeInput::Volume {
            data: cube.view(),
            axes: Some(&cube.axes),
            sample_interval: Some(cube.sample_interval),
        }
    }
}

impl<'a> From<ArrayView3<'a, f32>> for AttributeInput<'a> {
    fn from(data: ArrayView3<'a, f32>) -> Self {
        AttributeInput::Volume {
            data,
            axes: None,
            sample_interval: None,
        }
    }
}

impl<'a> From<&'a Array3<f32>> for AttributeInput<'a> {
    fn from(data: &'a Array3<f32>) -> Self {
        data.view().into()
    }
}

impl<'a> From<&'a Slice> for AttributeInput<'a> {
    fn from(slice: &'a Slice) -> Self {
        AttributeInput::Section(slice)
    }
}

/// Where along the section axis to cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SectionLocation {
    /// Array index.
    Index(usize),
    /// Survey coordinate, resolved through the input's axis index.
    Coordinate(f64),
}

/// A request to return one section of the attribute instead of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    pub axis: SliceAxis,
    pub location: SectionLocation,
}

impl SectionRequest {
    pub fn at_index(axis: SliceAxis, index: usize) -> Self {
        Self {
            axis,
            location: SectionLocation::Index(index),
        }
    }

    pub fn at_coordinate(axis: SliceAxis, coordinate: f64) -> Self {
        Self {
            axis,
            location: SectionLocation::Coordinate(coordinate),
        }
    }
}

/// An attribute to compute, on the whole input or one section of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeRequest {
    pub attribute: Attribute,
    pub section: Option<SectionRequest>,
}

impl AttributeRequest {
    pub fn volume(attribute: Attribute) -> Self {
        Self {
            attribute,
            section: None,
        }
    }

    pub fn section(attribute: Attribute, section: SectionRequest) -> Self {
        Self {
            attribute,
            section: Some(section),
        }
    }
}

/// How a section request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceMode {
    /// No section requested; the kernel runs on the whole input.
    None,
    /// Cut the section first and run the kernel on it.
    BeforeKernel,
    /// Run the kernel on the whole cube and cut its output.
    AfterKernel,
}

/// Location of a section result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub axis: SliceAxis,
    pub index: usize,
    pub coordinate: Option<f64>,
}

/// Named outputs of one attribute computation.
///
/// Cube results are 3D; section results are 2D with the fixed axis removed.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeResult {
    pub attribute: AttributeKind,
    pub section: Option<SectionInfo>,
    pub outputs: Vec<(&'static str, ArrayD<f32>)>,
}

impl AttributeResult {
    /// Output by name.
    pub fn get(&self, name: &str) -> Option<ArrayViewD<'_, f32>> {
        self.outputs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, array)| array.view())
    }

    /// Output by name as a cube, `None` for section results.
    pub fn cube(&self, name: &str) -> Option<ArrayView3<'_, f32>> {
        self.get(name)?.into_dimensionality::<Ix3>().ok()
    }

    /// Output by name as a section, `None` for cube results.
    pub fn section(&self, name: &str) -> Option<ArrayView2<'_, f32>> {
        self.get(name)?.into_dimensionality::<Ix2>().ok()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|(n, _)| *n).collect()
    }

    /// The only output of a single-output attribute.
    pub fn into_single(mut self) -> Option<ArrayD<f32>> {
        if self.outputs.len() == 1 {
            self.outputs.pop().map(|(_, array)| array)
        } else {
            None
        }
    }

    /// Symmetric colour limits `(-p, p)` where `p` is the `percentile` of
    /// the absolute values of an output.
    pub fn display_limits(&self, name: &str, percentile: f64) -> Option<(f32, f32)> {
        let p = abs_percentile(self.get(name)?.iter().copied(), percentile);
        Some((-p, p))
    }
}

/// Runs attribute requests against one configuration.
///
/// Holds no mutable state and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct AttributeEngine {
    config: EngineConfig,
}

impl AttributeEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: EngineConfig) -> SeismicResult<Self> {
        config
            .validate()
            .map_err(|message| SeismicError::invalid_parameter("config", message))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// How a request for `attribute` cut along `section` would be served.
    pub fn reduce_mode(&self, attribute: &Attribute, section: Option<SliceAxis>) -> ReduceMode {
        match section {
            None => ReduceMode::None,
            Some(axis) => {
                if self.config.exact_sections && attribute.footprint().spans(axis.cube_axis()) {
                    ReduceMode::AfterKernel
                } else {
                    ReduceMode::BeforeKernel
                }
            }
        }
    }

    fn context(&self, sample_interval: Option<SampleInterval>) -> KernelContext {
        let sample_interval = sample_interval.unwrap_or_else(|| {
            debug!(
                interval_ms = self.config.default_sample_interval.millis(),
                "Input has no sample interval, using the configured default"
            );
            self.config.default_sample_interval
        });
        KernelContext {
            sample_interval,
            hilbert_padding: self.config.hilbert_padding,
        }
    }

    /// Compute an attribute.
    ///
    /// # Arguments
    /// - `input`: A cube or a section
    /// - `request`: The attribute and an optional section to return
    pub fn compute<'a>(
        &self,
        input: impl Into<AttributeInput<'a>>,
        request: &AttributeRequest,
    ) -> SeismicResult<AttributeResult> {
        let input = input.into();
        let attribute = request.attribute;
        attribute.validate()?;
        check_not_empty(input.shape())?;

        match input {
            AttributeInput::Section(slice) => {
                if request.section.is_some() {
                    return Err(SeismicError::shape_mismatch(
                        "a cube to cut a section from",
                        format!("{} section", slice.axis),
                    ));
                }
                debug!(attribute = %attribute.kind(), axis = %slice.axis, "Computing on section input");
                let ctx = self.context(slice.sample_interval);
                let outputs = attribute.compute(slice.as_volume(), &ctx)?;
                Ok(AttributeResult {
                    attribute: attribute.kind(),
                    section: Some(SectionInfo {
                        axis: slice.axis,
                        index: slice.index,
                        coordinate: slice.coordinate,
                    }),
                    outputs: collapse(outputs, slice.axis, 0),
                })
            }
            AttributeInput::Volume {
                data,
                axes,
                sample_interval,
            } => {
                if let Some(axes) = axes {
                    axes.check_shape(data.shape())?;
                }
                let ctx = self.context(sample_interval);
                let section = request
                    .section
                    .map(|s| resolve_section(data, axes, &s))
                    .transpose()?;

                let mode = self.reduce_mode(&attribute, section.map(|s| s.axis));
                debug!(attribute = %attribute.kind(), ?mode, shape = ?data.shape(), "Planned attribute computation");

                let outputs = match (mode, section) {
                    (ReduceMode::BeforeKernel, Some(info)) => {
                        let slice = slice_at(data, info.axis, info.index)?;
                        let outputs = attribute.compute(slice.as_volume(), &ctx)?;
                        collapse(outputs, info.axis, 0)
                    }
                    (ReduceMode::AfterKernel, Some(info)) => {
                        let outputs = attribute.compute(data, &ctx)?;
                        collapse(outputs, info.axis, info.index)
                    }
                    _ => attribute
                        .compute(data, &ctx)?
                        .into_iter()
                        .map(|(name, array)| (name, array.into_dyn()))
                        .collect(),
                };
                debug!(attribute = %attribute.kind(), outputs = outputs.len(), "Attribute computed");

                Ok(AttributeResult {
                    attribute: attribute.kind(),
                    section,
                    outputs,
                })
            }
        }
    }

    /// Compute an attribute named by class and type with loose parameters.
    pub fn compute_named<'a>(
        &self,
        input: impl Into<AttributeInput<'a>>,
        class: &str,
        attribute_type: &str,
        params: &AttributeParams,
        section: Option<SectionRequest>,
    ) -> SeismicResult<AttributeResult> {
        let kind = AttributeKind::lookup(class, attribute_type)?;
        let attribute = Attribute::from_params(kind, params)?;
        self.compute(
            input,
            &AttributeRequest {
                attribute,
                section,
            },
        )
    }
}

/// Compute the attribute `class`/`attribute_type` on `input` with the default
/// engine configuration.
pub fn compute_attribute<'a>(
    input: impl Into<AttributeInput<'a>>,
    class: &str,
    attribute_type: &str,
    params: &AttributeParams,
) -> SeismicResult<AttributeResult> {
    AttributeEngine::default().compute_named(input, class, attribute_type, params, None)
}

fn check_not_empty(shape: [usize; 3]) -> SeismicResult<()> {
    if shape.contains(&0) {
        return Err(SeismicError::shape_mismatch(
            "non-empty input",
            format!("shape {:?}", shape),
        ));
    }
    Ok(())
}

fn resolve_section(
    data: ArrayView3<'_, f32>,
    axes: Option<&AxisIndex>,
    request: &SectionRequest,
) -> SeismicResult<SectionInfo> {
    let axis = request.axis;
    let (index, coordinate) = match request.location {
        SectionLocation::Index(index) => (index, None),
        SectionLocation::Coordinate(coordinate) => {
            let axes = axes.ok_or_else(|| {
                SeismicError::invalid_coordinate(
                    axis.to_string(),
                    "coordinate given but the input has no axis index",
                )
            })?;
            (axes.position(axis.cube_axis(), coordinate)?, Some(coordinate))
        }
    };

    let len = data.len_of(Axis(axis.index()));
    if index >= len {
        return Err(SeismicError::invalid_coordinate(
            axis.to_string(),
            format!("index {} outside 0..{}", index, len),
        ));
    }
    Ok(SectionInfo {
        axis,
        index,
        coordinate,
    })
}

/// Take plane `index` along the section axis of every output.
fn collapse(outputs: KernelOutputs, axis: SliceAxis, index: usize) -> Vec<(&'static str, ArrayD<f32>)> {
    outputs
        .into_iter()
        .map(|(name, array)| (name, array.index_axis_move(Axis(axis.index()), index).into_dyn()))
        .collect()
}
